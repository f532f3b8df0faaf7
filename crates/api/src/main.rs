use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hostwatch_api::config::ServerConfig;
use hostwatch_api::router::build_app_router;
use hostwatch_api::state::AppState;
use hostwatch_notify::NotifyConfig;
use hostwatch_pipeline::{JwtRecipientResolver, PgAlertStore, Pipeline, SysinfoSampler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hostwatch_api=debug,hostwatch_pipeline=debug,hostwatch_notify=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let notify_config = NotifyConfig::from_env();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hostwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hostwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    hostwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Pipeline ---
    let dispatcher = notify_config
        .build_dispatcher()
        .expect("Failed to configure notification providers");
    let sampler = Arc::new(SysinfoSampler::new());
    let store = Arc::new(PgAlertStore::new(pool.clone()));

    let mut pipeline = Pipeline::new(sampler.clone(), Arc::new(dispatcher), store)
        .with_country_code(notify_config.default_country_code.clone())
        .with_step_timeout(Duration::from_secs(config.step_timeout_secs));
    match &config.jwt_secret {
        Some(secret) => {
            pipeline = pipeline.with_resolver(Arc::new(JwtRecipientResolver::new(
                pool.clone(),
                secret.clone(),
                notify_config.default_country_code.clone(),
            )));
        }
        None => tracing::warn!("JWT_SECRET not set, session tokens will not resolve recipients"),
    }
    let pipeline = Arc::new(pipeline);

    // --- Scheduled monitor ---
    let monitor_cancel = CancellationToken::new();
    let monitor_handle = config.monitor.enabled.then(|| {
        tokio::spawn(hostwatch_api::background::monitor::run(
            Arc::clone(&pipeline),
            config.monitor.clone(),
            monitor_cancel.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline,
        sampler,
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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    monitor_cancel.cancel();
    if let Some(handle) = monitor_handle {
        let drain = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(drain, handle).await.is_err() {
            tracing::warn!("Monitor loop did not stop within the shutdown timeout");
        }
        tracing::info!("Monitor loop stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
