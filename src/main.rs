use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acadia_api::{
    config::Config, db, middleware::auth::JwtSecret, routes, services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    db::migrate_all_existing_tenants(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    services::metrics::start(pool.clone());

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
    };

    // Build CORS: allow the app base domain and its subdomains (tenant subdomains).
    // In development (localhost), all origins are allowed.
    let base_url = config.app_base_url.clone();
    let cors_origin = {
        let base = base_url.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let o = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            // Always allow localhost / 127.0.0.1 for local development
            if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
                return true;
            }
            // Exact match of app_base_url
            if o == base {
                return true;
            }
            // Subdomain match: extract domain portion from base URL and allow *.domain
            if let Some(idx) = base.find("://") {
                let after_scheme = &base[idx + 3..];
                let domain = after_scheme.split('/').next().unwrap_or(after_scheme);
                let domain_clean = domain.split(':').next().unwrap_or(domain);
                if o.contains(&format!(".{domain_clean}")) {
                    return true;
                }
            }
            false
        })
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-tenant"),
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Tenant registration
        .route("/signup/check-slug", get(routes::signup::check_slug))
        .route("/signup", post(routes::signup::register))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Classes
        .route("/classes", get(routes::classes::list_classes).post(routes::classes::create_class))
        .route("/classes/{id}", put(routes::classes::update_class).delete(routes::classes::delete_class))
        .route("/classes/{id}/fee-summary", get(routes::ledger::class_fee_summary))
        // Students
        .route("/students", get(routes::students::list_students).post(routes::students::create_student))
        .route("/students/{id}", put(routes::students::update_student).delete(routes::students::deactivate_student))
        .route("/students/{id}/ledger", get(routes::ledger::student_ledger))
        .route("/students/{id}/payments", get(routes::payments::list_student_payments))
        .route("/students/{id}/grades", get(routes::grades::list_student_grades))
        // Teachers
        .route("/teachers", get(routes::teachers::list_teachers).post(routes::teachers::create_teacher))
        .route("/teachers/{id}", put(routes::teachers::update_teacher).delete(routes::teachers::delete_teacher))
        // Fee catalog
        .route("/fees/heads", get(routes::fees::list_fee_heads).post(routes::fees::create_fee_head))
        .route("/fees/heads/{id}", delete(routes::fees::delete_fee_head))
        .route("/fees/structures", get(routes::fees::list_fee_structures).post(routes::fees::set_fee_structure))
        // Payments
        .route("/fees/payments", post(routes::payments::record_payment))
        // Attendance
        .route("/attendance", get(routes::attendance::list_attendance).post(routes::attendance::record_attendance))
        // Exams & grades
        .route("/exams", get(routes::grades::list_exams).post(routes::grades::create_exam))
        .route("/grades", post(routes::grades::record_grades))
        // Tenant staff management
        .route("/users", get(routes::users::list_users).post(routes::users::create_user))
        .route("/users/{id}", delete(routes::users::deactivate_user))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("acadia API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
