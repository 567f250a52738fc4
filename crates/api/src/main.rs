use std::net::SocketAddr;
use std::sync::Arc;

use mailspark_api::config::{ProviderConfig, ServerConfig};
use mailspark_api::router::build_app_router;
use mailspark_api::state::AppState;
use mailspark_cloud::openai::OpenAiClient;
use mailspark_cloud::s3::S3Storage;
use mailspark_cloud::stripe::StripeClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailspark_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    let providers = ProviderConfig::from_env();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mailspark_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    mailspark_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    mailspark_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- External providers ---
    let mut openai = OpenAiClient::new(providers.openai_api_key, providers.openai_model);
    if let Some(base_url) = providers.openai_base_url {
        openai = openai.with_base_url(base_url);
    }
    tracing::info!(model = %openai.model(), "Completion provider configured");

    let mut stripe = StripeClient::new(providers.stripe_secret_key);
    if let Some(base_url) = providers.stripe_base_url {
        stripe = stripe.with_base_url(base_url);
    }

    let storage = S3Storage::from_env(providers.s3_bucket, providers.s3_public_base_url).await;
    tracing::info!("Object storage configured");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        completion: Arc::new(openai),
        billing: Arc::new(stripe),
        storage: Arc::new(storage),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
