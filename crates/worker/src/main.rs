//! Lifecycle worker binary.
//!
//! Runs the occurrence generator and the notification dispatcher as
//! long-lived loops. Multiple worker instances can run side by side:
//! generation is idempotent and dispatch claims are exclusive.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classtrack_engine::channel::{NotificationChannel, TelegramChannel};
use classtrack_engine::dispatcher::NotificationDispatcher;
use classtrack_engine::generator::OccurrenceGenerator;
use classtrack_engine::EngineConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classtrack_worker=debug,classtrack_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = classtrack_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    classtrack_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Worker connected to database");

    let channel: Arc<dyn NotificationChannel> = Arc::new(TelegramChannel::from_env());

    let cancel = CancellationToken::new();

    let generator = OccurrenceGenerator::new(pool.clone(), config.clone());
    let generator_cancel = cancel.clone();
    let generator_handle = tokio::spawn(async move {
        generator.run(generator_cancel).await;
    });

    let dispatcher = NotificationDispatcher::new(pool, channel, config);
    let dispatcher_cancel = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_cancel).await;
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    cancel.cancel();

    let _ = generator_handle.await;
    let _ = dispatcher_handle.await;
    tracing::info!("Worker stopped");
}

/// Wait for SIGINT or SIGTERM.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
