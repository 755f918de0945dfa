//! Server configuration

use std::time::Duration;

use thiserror::Error;

/// Startup configuration problems. Any of these is fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// `production` enables secure cookies
    pub app_env: String,
    pub jwt_secret: String,
    pub jwt_expire: Duration,
    pub jwt_cookie_expire_days: u32,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("app_env", &self.app_env)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expire", &self.jwt_expire)
            .field("jwt_cookie_expire_days", &self.jwt_cookie_expire_days)
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let jwt_expire_raw = or_default("JWT_EXPIRE", "30d");
        let jwt_expire = parse_duration(&jwt_expire_raw).ok_or(ConfigError::Invalid {
            name: "JWT_EXPIRE",
            value: jwt_expire_raw,
        })?;

        let cookie_raw = or_default("JWT_COOKIE_EXPIRE", "30");
        let jwt_cookie_expire_days = cookie_raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::Invalid {
                name: "JWT_COOKIE_EXPIRE",
                value: cookie_raw.clone(),
            })?;

        let rps_raw = or_default("RATE_LIMIT_RPS", "100");
        let rate_limit_rps = rps_raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|rps| *rps > 0)
            .ok_or(ConfigError::Invalid {
                name: "RATE_LIMIT_RPS",
                value: rps_raw,
            })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_address: or_default("BIND_ADDRESS", "0.0.0.0:5000"),
            app_env: or_default("APP_ENV", "development"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expire,
            jwt_cookie_expire_days,
            cors_origins: or_default("CORS_ORIGINS", "*")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            rate_limit_rps,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

/// `30d`, `12h`, `15m`, `90s` or a bare number of seconds
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let n: u64 = digits.parse().ok()?;
    let secs = match unit {
        "d" => n.checked_mul(86_400)?,
        "h" => n.checked_mul(3_600)?,
        "m" => n.checked_mul(60)?,
        "s" => n,
        _ => return None,
    };
    (secs > 0).then(|| Duration::from_secs(secs))
}
