use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, sqlx::Type)]
#[sqlx(type_name = "institution_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstitutionType {
    School,
    College,
    Coaching,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub institution_type: InstitutionType,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_user_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterSchoolRequest {
    pub slug: String,
    pub name: String,
    pub institution_type: Option<InstitutionType>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}
