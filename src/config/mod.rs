//! Configuration loading
//!
//! Configuration comes from three layers, lowest priority first:
//! built-in defaults, an optional JSON file, and command line overrides
//! (applied by the binary).

mod schema;

pub use schema::{AppConfig, AssetConfig, SignalingConfig, WebConfig};

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use crate::error::{AppError, Result};

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse configuration from a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid configuration: {}", e)))?;
        Ok(config)
    }

    /// Check the configuration is usable before binding anything
    pub fn validate(&self) -> Result<()> {
        if self.web.bind_address.trim().is_empty() {
            return Err(AppError::Config("bind address must not be empty".into()));
        }
        self.web
            .bind_address
            .parse::<IpAddr>()
            .map_err(|_| AppError::Config(format!("invalid bind address: {}", self.web.bind_address)))?;
        if self.web.http_port == 0 {
            return Err(AppError::Config("http port must not be 0".into()));
        }
        if self.signaling.url.trim().is_empty() {
            return Err(AppError::Config("signaling url must not be empty".into()));
        }
        Ok(())
    }

    /// Socket address the HTTP server listens on
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .web
            .bind_address
            .parse()
            .map_err(|_| AppError::Config(format!("invalid bind address: {}", self.web.bind_address)))?;
        Ok(SocketAddr::new(ip, self.web.http_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.web.bind_address, "0.0.0.0");
        assert_eq!(config.web.http_port, 3000);
        assert_eq!(config.signaling.url, "ws://localhost:3000");
        assert_eq!(config.assets.template.as_deref(), Some("template.html"));
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json(r#"{"signaling": {"url": "wss://relay.example.com"}}"#).unwrap();
        assert_eq!(config.signaling.url, "wss://relay.example.com");
        assert_eq!(config.web.http_port, 3000);
        assert_eq!(config.assets.index, "index.html");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.web.http_port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.web.bind_address = "not-an-ip".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.signaling.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relay.json");
        tokio::fs::write(&path, r#"{"web": {"http_port": 9000}, "assets": {"template": null}}"#)
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.web.http_port, 9000);
        assert!(config.assets.template.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
