use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, register_gauge_vec,
                 Counter, CounterVec, Gauge, GaugeVec};
use sqlx::PgPool;
use tracing::{info, warn};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Login attempts by tenant and status",
        &["tenant", "status"]
    ).unwrap();

    pub static ref SIGNUPS_COUNTER: Counter = register_counter!(
        "api_signups_total",
        "School registrations"
    ).unwrap();

    pub static ref PAYMENTS_COUNTER: CounterVec = register_counter_vec!(
        "api_fee_payments_total",
        "Fee payments recorded by tenant",
        &["tenant"]
    ).unwrap();

    // ── Business metrics ────────────────────────────────────────────────────
    pub static ref STUDENTS_GAUGE: GaugeVec = register_gauge_vec!(
        "school_students_active_total",
        "Active students by tenant",
        &["tenant"]
    ).unwrap();

    pub static ref FEES_COLLECTED_GAUGE: GaugeVec = register_gauge_vec!(
        "school_fees_collected_total",
        "Cumulative fee amount collected by tenant",
        &["tenant"]
    ).unwrap();

    pub static ref TENANTS_GAUGE: Gauge = register_gauge!(
        "school_tenants_active_total",
        "Number of active tenants"
    ).unwrap();
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        // Initial collection on startup
        if let Err(e) = collect(&pool).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let tenants: Vec<String> =
        sqlx::query_scalar("SELECT slug FROM public.schools WHERE is_active = TRUE")
            .fetch_all(pool)
            .await?;

    TENANTS_GAUGE.set(tenants.len() as f64);

    for slug in &tenants {
        let schema = crate::db::tenant::schema_name(slug);

        let students: i64 = sqlx::query_scalar(&format!(
            r#"SELECT COUNT(*)::BIGINT FROM "{schema}".students WHERE is_active = TRUE"#
        ))
        .fetch_one(pool)
        .await
        .unwrap_or(0);
        STUDENTS_GAUGE.with_label_values(&[slug]).set(students as f64);

        let collected: f64 = sqlx::query_scalar(&format!(
            r#"SELECT COALESCE(SUM(total_amount_paid), 0)::FLOAT8 FROM "{schema}".fee_payments"#
        ))
        .fetch_one(pool)
        .await
        .unwrap_or(0.0);
        FEES_COLLECTED_GAUGE.with_label_values(&[slug]).set(collected);
    }

    info!("Metrics: collected for {} tenant(s)", tenants.len());
    Ok(())
}
