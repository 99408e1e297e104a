use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use intranet::config::CleanupConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match CleanupConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(environment = ?config.environment, "Starting cleanup run");

    let pool = match intranet::db::connect(&config.database_url, config.environment, 2).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = intranet::cleanup::run(&pool, config.unverified_max_age_days).await;
    pool.close().await;

    match result {
        Ok(report) => {
            tracing::info!(
                expired_codes = report.expired_codes_deleted,
                stale_users = report.stale_users_deleted,
                duplicate_codes = report.duplicate_codes_voided,
                "Cleanup finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Cleanup failed, nothing was changed: {e}");
            ExitCode::FAILURE
        }
    }
}
