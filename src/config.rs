use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mealplan-coach".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mealplan-coaches".into()),
            ttl_minutes: env_number("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_number("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        Ok(Self { database_url, jwt })
    }
}

/// Connection settings for the dashboard's HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("MEALPLAN_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/v1".into());
        let timeout = env_number("MEALPLAN_API_TIMEOUT_SECS").unwrap_or(30);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout.max(1) as u64),
        }
    }
}

fn env_number(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse::<i64>().ok())
}
