use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub environment: Environment,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub cors_origins: Vec<String>,
    pub token_ttl_hours: i64,
    pub resend_cooldown_secs: u64,
    pub max_body_size: usize,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Reads `INTRANET_ENV`, falling back to `NODE_ENV` for existing deployments.
    pub fn from_env() -> Self {
        let raw = std::env::var("INTRANET_ENV")
            .or_else(|_| std::env::var("NODE_ENV"))
            .unwrap_or_default();
        match raw.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;
        let environment = Environment::from_env();

        let host: IpAddr = env_or("INTRANET_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_HOST: {e}"))?;

        let port: u16 = env_or("INTRANET_PORT", "3001")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_PORT: {e}"))?;

        let base_url = env_or("INTRANET_BASE_URL", "http://localhost:8080");

        let cors_origins = env_or(
            "INTRANET_CORS_ORIGINS",
            "http://localhost:3000,http://localhost:5173,http://localhost:8080",
        )
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

        let token_ttl_hours: i64 = env_or("INTRANET_TOKEN_TTL_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_TOKEN_TTL_HOURS: {e}"))?;
        if token_ttl_hours <= 0 {
            return Err("INTRANET_TOKEN_TTL_HOURS must be positive".to_string());
        }

        let resend_cooldown_secs: u64 = env_or("INTRANET_RESEND_COOLDOWN_SECS", "120")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_RESEND_COOLDOWN_SECS: {e}"))?;

        let max_body_size: usize = env_or("INTRANET_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("INTRANET_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("INTRANET_SMTP_HOST").ok(),
            std::env::var("INTRANET_SMTP_PORT").ok(),
            std::env::var("INTRANET_SMTP_USER").ok(),
            std::env::var("INTRANET_SMTP_PASS").ok(),
            std::env::var("INTRANET_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid INTRANET_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            environment,
            host,
            port,
            base_url,
            cors_origins,
            token_ttl_hours,
            resend_cooldown_secs,
            max_body_size,
            log_level,
            smtp,
        })
    }
}

/// Settings for the out-of-band cleanup job.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub database_url: String,
    pub environment: Environment,
    pub unverified_max_age_days: i64,
    pub log_level: String,
}

impl CleanupConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let unverified_max_age_days: i64 = env_or("INTRANET_CLEANUP_UNVERIFIED_DAYS", "7")
            .parse()
            .map_err(|e| format!("Invalid INTRANET_CLEANUP_UNVERIFIED_DAYS: {e}"))?;
        crate::cleanup::validate_max_age(unverified_max_age_days)
            .map_err(|e| format!("Invalid INTRANET_CLEANUP_UNVERIFIED_DAYS: {e}"))?;

        Ok(CleanupConfig {
            database_url,
            environment: Environment::from_env(),
            unverified_max_age_days,
            log_level: env_or("INTRANET_LOG_LEVEL", "info"),
        })
    }
}

/// Settings for the API client library.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        ClientConfig {
            api_base_url: env_or("INTRANET_API_BASE_URL", "http://localhost:3001"),
        }
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
