pub mod dashboards;
pub mod users;
pub mod verification_codes;

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::Environment;

/// Open a pool; production deployments always talk TLS to Postgres.
pub async fn connect(
    database_url: &str,
    environment: Environment,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if environment.is_production() {
        options = options.ssl_mode(PgSslMode::Require);
    }

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}
