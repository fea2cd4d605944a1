//! Service configuration loaded from environment variables.
//!
//! ## Required
//! - `ADMIN_EMAIL` - email accepted by admin login
//!
//! ## Optional
//! - `HOST` - bind address (default: 0.0.0.0)
//! - `PORT` - listen port (default: 8083)
//! - `DATABASE_URL` - PostgreSQL connection string; without it the service runs
//!   on an in-memory store seeded with the demo catalog
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 10)
//! - `NATS_URL` - message bus for domain events
//! - `STORE_CURRENCY` - ISO currency code for prices (default: ILS)
//! - `UPLOAD_DIR` - directory uploaded images are written to (default: uploads)
//! - `UPLOAD_PUBLIC_URL` - URL prefix uploads are served under (default: /uploads)
//! - `CONTACT_PHONE` - WhatsApp number for the contact link (default: 972599765211)
//! - `SESSION_IDLE_MINUTES` - idle minutes before a cart session is dropped (default: 120)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub admin_email: String,
    pub currency: String,
    pub upload_dir: PathBuf,
    pub upload_public_url: String,
    pub contact_phone: String,
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let admin_email = get("ADMIN_EMAIL").ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_EMAIL".to_string()))?;
        let currency = or_default("STORE_CURRENCY", "ILS").to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidEnvVar("STORE_CURRENCY".to_string(), format!("not an ISO code: {currency}")));
        }
        let idle_minutes: u64 = parse_var("SESSION_IDLE_MINUTES", &or_default("SESSION_IDLE_MINUTES", "120"))?;
        if idle_minutes == 0 {
            return Err(ConfigError::InvalidEnvVar("SESSION_IDLE_MINUTES".to_string(), "must be at least 1".to_string()));
        }

        Ok(Self {
            host: parse_var("HOST", &or_default("HOST", "0.0.0.0"))?,
            port: parse_var("PORT", &or_default("PORT", "8083"))?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", &or_default("DATABASE_MAX_CONNECTIONS", "10"))?,
            nats_url: get("NATS_URL"),
            admin_email,
            currency,
            upload_dir: PathBuf::from(or_default("UPLOAD_DIR", "uploads")),
            upload_public_url: or_default("UPLOAD_PUBLIC_URL", "/uploads"),
            contact_phone: or_default("CONTACT_PHONE", "972599765211"),
            session_idle_timeout: Duration::from_secs(idle_minutes.saturating_mul(60)),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }

    /// WhatsApp deep link for the storefront contact button.
    pub fn contact_url(&self) -> String { format!("https://wa.me/{}", self.contact_phone) }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("ADMIN_EMAIL", "owner@jibreel.shop")]).unwrap();
        assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:8083");
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.database_max_connections, 10);
        assert_eq!(cfg.currency, "ILS");
        assert_eq!(cfg.upload_public_url, "/uploads");
        assert_eq!(cfg.contact_url(), "https://wa.me/972599765211");
        assert_eq!(cfg.session_idle_timeout, Duration::from_secs(2 * 60 * 60));
    }

    #[test]
    fn test_session_idle_minutes() {
        let cfg = config(&[("ADMIN_EMAIL", "a@b.c"), ("SESSION_IDLE_MINUTES", "15")]).unwrap();
        assert_eq!(cfg.session_idle_timeout, Duration::from_secs(15 * 60));
        assert!(config(&[("ADMIN_EMAIL", "a@b.c"), ("SESSION_IDLE_MINUTES", "0")]).is_err());
        assert!(config(&[("ADMIN_EMAIL", "a@b.c"), ("SESSION_IDLE_MINUTES", "-5")]).is_err());
    }

    #[test]
    fn test_admin_email_required() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::MissingEnvVar("ADMIN_EMAIL".into()));
        assert!(config(&[("ADMIN_EMAIL", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("ADMIN_EMAIL", "a@b.c"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PORT"));
        assert!(config(&[("ADMIN_EMAIL", "a@b.c"), ("STORE_CURRENCY", "SHEKEL")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("ADMIN_EMAIL", "a@b.c"),
            ("PORT", "9000"),
            ("STORE_CURRENCY", "usd"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("CONTACT_PHONE", "15550100"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.currency, "USD");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(cfg.contact_url(), "https://wa.me/15550100");
    }
}
