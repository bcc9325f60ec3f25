//! # Host Configuration
//!
//! Unified configuration for the bootstrap run. Every field has a sane
//! default; the environment can override individual values.

use thiserror::Error;

use shared_types::ChainId;

/// Complete host configuration.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Bootstrap behavior.
    pub bootstrap: BootstrapConfig,
    /// UI configuration.
    pub ui: UiConfig,
}

impl HostConfig {
    /// Load defaults, then apply `HOST_*` environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(chain_id) = std::env::var("HOST_CHAIN_ID") {
            config.network.chain_id = ChainId(chain_id);
        }
        if let Ok(locale) = std::env::var("HOST_LOCALE") {
            config.ui.initial_locale = Some(locale);
        }
        if let Ok(strict) = std::env::var("HOST_STRICT_KEYS") {
            config.bootstrap.strict_keys = strict == "1" || strict.eq_ignore_ascii_case("true");
        }

        config
    }

    /// Validate the configuration before booting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChainId`] when the chain id is not
    /// a `0x`-prefixed hex string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chain_id = self.network.chain_id.as_str();
        let hex = chain_id.strip_prefix("0x").unwrap_or("");
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidChainId(chain_id.to_string()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Chain id is not a 0x-prefixed hex string.
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain the host boots against.
    pub chain_id: ChainId,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: ChainId::default(),
        }
    }
}

/// Bootstrap behavior.
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    /// Fail on duplicate state/API keys instead of last-writer-wins.
    pub strict_keys: bool,
}

/// UI configuration.
#[derive(Debug, Clone, Default)]
pub struct UiConfig {
    /// Locale the UI starts in; `None` lets the persisted preference
    /// win.
    pub initial_locale: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        HostConfig::default().validate().expect("valid");
    }

    #[test]
    fn malformed_chain_id_is_rejected() {
        let mut config = HostConfig::default();
        config.network.chain_id = ChainId("mainnet".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChainId(_))
        ));
    }
}
