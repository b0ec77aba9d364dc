use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; without one the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Offset used to cut calendar days for daily summaries.
    pub utc_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };
        let offset_minutes = std::env::var("APP_UTC_OFFSET_MINUTES")
            .ok()
            .map(|v| v.parse::<i32>())
            .transpose()
            .context("APP_UTC_OFFSET_MINUTES must be an integer")?
            .unwrap_or(0);
        let utc_offset = offset_from_minutes(offset_minutes)?;
        Ok(Self { database_url, jwt, utc_offset })
    }
}

pub fn offset_from_minutes(minutes: i32) -> anyhow::Result<UtcOffset> {
    UtcOffset::from_whole_seconds(minutes * 60)
        .with_context(|| format!("utc offset out of range: {minutes} minutes"))
}
