use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web server settings
    pub web: WebConfig,
    /// Signaling endpoint advertised to browsers
    pub signaling: SignalingConfig,
    /// Static asset settings
    pub assets: AssetConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub bind_address: String,
    /// HTTP port (also carries the WebSocket upgrade)
    pub http_port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 3000,
        }
    }
}

/// Signaling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingConfig {
    /// URL the browser should open its WebSocket against.
    /// Only used when rendering the entry template.
    pub url: String,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3000".to_string(),
        }
    }
}

/// Static asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory all assets are served from
    pub public_dir: PathBuf,
    /// Entry document served for `/` when no template is configured
    pub index: String,
    /// Template rendered for `/` and `/index.html`, relative to `public_dir`
    pub template: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            index: "index.html".to_string(),
            template: Some("template.html".to_string()),
        }
    }
}
