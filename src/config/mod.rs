//! Builds an `AppConfig` from the environment.
//! Sources from lowest to highest priority: serde defaults, `config/relay.toml` (optional),
//! the raw `PORT` env variable and finally all the `RELAY_*` env variables.
//!
//! The config is built once in `main` and handed to the `App`, nothing reads it globally.

mod error;
mod structs;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use structs::{AppConfig, MissingField, NetConfig, RelayConfig};

pub const CONFIG_FILE: &str = "config/relay.toml";
pub const ENV_PREFIX: &str = "RELAY_";

impl AppConfig {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw().only(&["PORT"]))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Fails only if a value is present but malformed (e.g. a non-numeric port).
    /// Missing relay fields are reported through `RelayConfig::missing_fields`.
    pub fn load() -> ConfigResult<Self> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> ConfigResult<Self> {
        info!("{:<12} - Initializing the configuration", "load_config");

        let net_config: NetConfig = figment.extract()?;
        let relay_config: RelayConfig = figment.extract()?;

        Ok(AppConfig {
            net_config,
            relay_config,
        })
    }
}
