use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use intranet::config::Config;
use intranet::email::{LogMailer, Mailer, SystemMailer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!(environment = ?config.environment, "Starting intranet API");

    let pool = intranet::db::connect(&config.database_url, config.environment, 10).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied");

    let mailer: Arc<dyn Mailer> = match config.smtp.as_ref() {
        Some(smtp) => match SystemMailer::new(smtp, &config.base_url) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                Arc::new(LogMailer)
            }
        },
        None => {
            tracing::warn!("System SMTP not configured, codes will only be logged");
            Arc::new(LogMailer)
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let (app, state) = intranet::build_app(pool, config, mailer);

    // Periodically drop stale rate limiter entries
    let limiter_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            limiter_state.login_limiter.cleanup();
            limiter_state.code_limiter.cleanup();
            limiter_state.resend_cooldown.cleanup();
            limiter_state.reset_cooldown.cleanup();
        }
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
