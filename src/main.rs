use chirpy::{
    auth::repository::PostgresRefreshTokenRepository,
    build_router,
    post::repository::PostgresPostRepository,
    user::repository::PostgresUserRepository,
    AppConfig, AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chirpy server");

    let config = AppConfig::from_env()?;
    let port = config.port;

    // Postgres when DB_URL is set, in-memory otherwise
    let app_state = match config.database_url.clone() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Connected to PostgreSQL and applied migrations");

            AppState::new(
                config,
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPostRepository::new(pool.clone())),
                Arc::new(PostgresRefreshTokenRepository::new(pool)),
            )
        }
        None => AppState::in_memory(config),
    };

    let app = build_router(app_state)
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Server running on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
