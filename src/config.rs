/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, DATABASE_URL, SECRET_KEY, ALGORITHM など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動時に一度だけ構築し、以降は不変の値として注入する
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Signing configuration shared by issuer and verifier: (secret, algorithm, ttl).
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub secret: Vec<u8>,
    pub algorithm: String,
    pub ttl_minutes: u32,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl AuthSettings {
    pub const DEFAULT_ALGORITHM: &'static str = "HS256";
    pub const DEFAULT_TTL_MINUTES: u32 = 30;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (environment in production, a closure in tests).
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = get("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?
            .into_bytes();

        let algorithm = get("ALGORITHM")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_ALGORITHM.to_string());

        let ttl_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            None => Self::DEFAULT_TTL_MINUTES,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or(ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES"))?,
        };

        Ok(Self {
            secret,
            algorithm,
            ttl_minutes,
        })
    }

    pub fn ttl(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.ttl_minutes))
    }
}

/// Transport-level limits applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            // protected endpoints take no large bodies
            body_limit_bytes: 64 * 1024,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None -> in-memory identity store (development only)
    pub database_url: Option<String>,
    pub identity_lookup_timeout: Duration,
    pub http: HttpLimits,
    pub auth: AuthSettings,
}

impl Config {
    pub const DEFAULT_IDENTITY_LOOKUP_TIMEOUT: Duration = Duration::from_millis(2000);

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = get("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let database_url = get("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let identity_lookup_timeout = get("IDENTITY_LOOKUP_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Self::DEFAULT_IDENTITY_LOOKUP_TIMEOUT);

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: get("HTTP_BODY_LIMIT_BYTES")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.body_limit_bytes),
            request_timeout: get("HTTP_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        let auth = AuthSettings::from_source(&get)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            identity_lookup_timeout,
            http,
            auth,
        })
    }
}
