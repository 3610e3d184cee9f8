use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turismo::config::Config;
use turismo::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turismo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting turismo API server");
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = turismo::db::create_pool(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Database connection established"
    );

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        turismo::db::run_migrations(&db_pool).await?;
        tracing::info!("Database migrations completed");
    } else {
        tracing::info!("Skipping database migrations");
    }

    let state = Arc::new(AppState {
        db_pool,
        bcrypt_cost: config.bcrypt_cost,
    });

    // Build router with CORS and tracing
    let app = turismo::routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
