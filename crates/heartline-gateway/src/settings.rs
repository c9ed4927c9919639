//! Gateway configuration.
//!
//! | Source | Notes |
//! |--------|-------|
//! | defaults | see [`GatewayConfig::load`] |
//! | `HEARTLINE_CONFIG` file (default `config/gateway.toml`) | optional; skipped when absent |
//! | `HEARTLINE__*` env vars | e.g. `HEARTLINE__PORT=9000`, `HEARTLINE__CORS_ORIGINS=a,b` |

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Allowed browser origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_name: "Heartline Voice Coach".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_filter: "info".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load config. Precedence: env `HEARTLINE__*` > config file > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("HEARTLINE_CONFIG").unwrap_or_else(|_| "config/gateway.toml".to_string());
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_filter", defaults.log_filter)?
            .set_default("cors_origins", Vec::<String>::new())?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("HEARTLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
