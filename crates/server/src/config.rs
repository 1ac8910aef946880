use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Value shipped in `.env.example`; treated as "no key configured".
pub const PLACEHOLDER_API_KEY: &str = "your_youtube_api_key_here";

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub youtube_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub static_dir: Option<PathBuf>,
    pub enrich_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            youtube_api_key: None,
            cache_ttl: Duration::from_secs(3600),
            static_dir: None,
            enrich_limit: 20,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(port) => port.parse().context("PORT must be a valid number")?,
            None => defaults.port,
        };

        let youtube_api_key = lookup("YOUTUBE_API_KEY")
            .or_else(|| lookup("VITE_YOUTUBE_API_KEY"))
            .filter(|key| is_configured_key(key));

        let cache_ttl = match lookup("CACHE_TTL_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().context("CACHE_TTL_SECS must be a number of seconds")?),
            None => defaults.cache_ttl,
        };

        let enrich_limit = match lookup("ENRICH_LIMIT") {
            Some(limit) => limit.parse().context("ENRICH_LIMIT must be a valid number")?,
            None => defaults.enrich_limit,
        };

        Ok(Self {
            port,
            youtube_api_key,
            cache_ttl,
            static_dir: lookup("STATIC_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from),
            enrich_limit,
        })
    }

    /// Log warnings for settings that disable features
    pub fn warn_missing(&self) {
        if self.youtube_api_key.is_none() {
            tracing::warn!("YOUTUBE_API_KEY is not configured - YouTube video search will be disabled");
        }
    }
}

fn is_configured_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.youtube_api_key, None);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.enrich_limit, 20);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("YOUTUBE_API_KEY", "abc"),
            ("CACHE_TTL_SECS", "60"),
            ("ENRICH_LIMIT", "5"),
            ("STATIC_DIR", "dist"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.youtube_api_key.as_deref(), Some("abc"));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.enrich_limit, 5);
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_legacy_key_name() {
        let config = config_from(&[("VITE_YOUTUBE_API_KEY", "legacy")]).unwrap();
        assert_eq!(config.youtube_api_key.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_placeholder_key_is_unset() {
        let config = config_from(&[("YOUTUBE_API_KEY", PLACEHOLDER_API_KEY)]).unwrap();
        assert_eq!(config.youtube_api_key, None);

        let config = config_from(&[("YOUTUBE_API_KEY", "  ")]).unwrap();
        assert_eq!(config.youtube_api_key, None);
    }

    #[test]
    fn test_invalid_port() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }
}
