use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::Mailer;
use crate::rate_limit::{FailureLimiter, ResendCooldown};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub login_limiter: FailureLimiter,
    /// Wrong verification and reset codes, keyed by kind and email.
    pub code_limiter: FailureLimiter,
    pub resend_cooldown: ResendCooldown,
    pub reset_cooldown: ResendCooldown,
}
