use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use renotracker_api::bootstrap::ensure_admin_user;
use renotracker_api::config::{AdminConfig, ServerConfig};
use renotracker_api::router::build_app_router;
use renotracker_api::shutdown::{drain_deadline, shutdown_signal};
use renotracker_api::state::AppState;
use renotracker_storage::{ObjectStore, S3ObjectStore};
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "renotracker_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = renotracker_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    renotracker_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    renotracker_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Admin account ---
    let admin = AdminConfig::from_env();
    let outcome = ensure_admin_user(&pool, &admin)
        .await
        .expect("Failed to bootstrap admin account");
    tracing::info!(?outcome, email = %admin.email, "Admin bootstrap finished");

    // --- Object storage ---
    let storage: Option<Arc<dyn ObjectStore>> = match &config.storage.s3 {
        Some(settings) => {
            let store = S3ObjectStore::connect(settings).await;
            if let Err(e) = store.ensure_bucket().await {
                tracing::warn!(bucket = %settings.bucket, error = %e, "Could not verify storage bucket");
            }
            tracing::info!(endpoint = %settings.endpoint, bucket = %settings.bucket, "Object storage configured");
            let store: Arc<dyn ObjectStore> = Arc::new(store);
            Some(store)
        }
        None => {
            tracing::warn!("MINIO_ACCESS_KEY / MINIO_SECRET_KEY not set; document storage disabled");
            None
        }
    };

    // --- Router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // In-flight requests get `SHUTDOWN_TIMEOUT_SECS` to finish once a
    // shutdown signal arrives.
    let (started_tx, started_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = started_tx.send(());
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.expect("Server error");
            tracing::info!("Graceful shutdown complete");
        }
        () = drain_deadline(started_rx, config.shutdown_timeout()) => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Shutdown grace period elapsed; dropping in-flight requests"
            );
        }
    }
}
