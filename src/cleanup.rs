use serde::Serialize;
use sqlx::PgPool;

use crate::db;

/// Upper bound for the unverified-account age, about a century.
pub const MAX_UNVERIFIED_AGE_DAYS: i64 = 36_500;

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("unverified account age must be between 1 and {MAX_UNVERIFIED_AGE_DAYS} days, got {0}")]
    InvalidMaxAge(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Checks the configured age and narrows it to what Postgres `make_interval` takes.
pub fn validate_max_age(days: i64) -> Result<i32, CleanupError> {
    if !(1..=MAX_UNVERIFIED_AGE_DAYS).contains(&days) {
        return Err(CleanupError::InvalidMaxAge(days));
    }
    i32::try_from(days).map_err(|_| CleanupError::InvalidMaxAge(days))
}

/// Row counts touched by one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub expired_codes_deleted: u64,
    pub stale_users_deleted: u64,
    pub duplicate_codes_voided: u64,
}

/// Purge expired verification codes and accounts that stayed unverified for
/// longer than `unverified_max_age_days`, then void duplicate active codes.
///
/// All steps share one transaction: an error anywhere rolls the whole run back.
pub async fn run(pool: &PgPool, unverified_max_age_days: i64) -> Result<CleanupReport, CleanupError> {
    let max_age_days = validate_max_age(unverified_max_age_days)?;
    let mut tx = pool.begin().await?;

    let expired_codes_deleted = db::verification_codes::delete_expired(&mut *tx).await?;
    tracing::info!("{expired_codes_deleted} expired verification codes removed");

    let stale_users_deleted =
        db::users::delete_stale_unverified(&mut *tx, max_age_days).await?;
    tracing::info!(
        "{stale_users_deleted} accounts unverified for more than {max_age_days} days removed"
    );

    let duplicate_codes_voided = db::verification_codes::void_duplicates(&mut *tx).await?;
    if duplicate_codes_voided > 0 {
        tracing::warn!("{duplicate_codes_voided} duplicate verification codes voided");
    }

    tx.commit().await?;

    Ok(CleanupReport {
        expired_codes_deleted,
        stale_users_deleted,
        duplicate_codes_voided,
    })
}
