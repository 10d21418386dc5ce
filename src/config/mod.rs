// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SpaConfig,
};

/// Default config file, looked up as `config.toml` (and other supported extensions)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix of environment overrides, e.g. `SPA_ROUTER_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "SPA_ROUTER";

const LOG_LEVELS: [&str; 4] = ["error", "warn", "info", "debug"];

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the optional file,
    /// environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?)
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("spa.index_files"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Reject settings the router cannot work with
    pub fn validate(&self) -> Result<(), String> {
        let spa = &self.spa;
        if !spa.api_prefix.starts_with('/') {
            return Err(format!(
                "spa.api_prefix must start with '/': '{}'",
                spa.api_prefix
            ));
        }
        if !spa.fallback_path.starts_with('/') {
            return Err(format!(
                "spa.fallback_path must start with '/': '{}'",
                spa.fallback_path
            ));
        }
        if spa.fallback_path.starts_with(&spa.api_prefix) {
            return Err(format!(
                "spa.fallback_path '{}' lies under spa.api_prefix '{}'",
                spa.fallback_path, spa.api_prefix
            ));
        }
        if spa.index_files.is_empty() {
            return Err("spa.index_files must not be empty".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "logging.level must be one of {LOG_LEVELS:?}: '{}'",
                self.logging.level
            ));
        }
        self.socket_addr().map(|_| ())
    }
}
