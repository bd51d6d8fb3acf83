use std::{fmt, result::Result as StdResult, str::FromStr};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// JNI 1.6, the lowest interface version Android guarantees.
pub const DEFAULT_JNI_VERSION: i32 = 0x0001_0006;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Tag used for the bridge's own diagnostics.
    pub log_tag: String,
    /// Max level of the bridge's own diagnostics (`error` .. `trace`, or `off`).
    pub log_level: String,
    /// Tag under which engine panics are written.
    pub panic_tag: String,
    /// Interface version requested from the runtime when the registering
    /// thread could not report one.
    pub jni_version: i32,
    pub host_methods: HostMethods,
}

/// Names of the host methods invoked for chain notifications.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HostMethods {
    /// `void (long chainId, String error)`
    pub on_chain_initialized: String,
    /// `void (long chainId)`
    pub on_responses_available: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_tag: "smoldot-bridge".to_owned(),
            log_level: "info".to_owned(),
            panic_tag: "PANIC".to_owned(),
            jni_version: DEFAULT_JNI_VERSION,
            host_methods: HostMethods::default(),
        }
    }
}

impl Default for HostMethods {
    fn default() -> Self {
        Self {
            on_chain_initialized: "onChainInitialized".to_owned(),
            on_responses_available: "onResponsesAvailable".to_owned(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(Error::config)
    }

    /// Level filter for the bridge's own logs, `Info` if the configured value doesn't parse.
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

impl FromStr for BridgeConfig {
    type Err = Error;
    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        Self::from_toml(s)
    }
}

impl fmt::Display for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        toml::to_string_pretty(self)
            .map_err(|_| fmt::Error)
            .and_then(|s| write!(f, "{}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: BridgeConfig = "".parse().unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.panic_tag, "PANIC");
        assert_eq!(config.host_methods.on_responses_available, "onResponsesAvailable");
        assert_eq!(config.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let config = BridgeConfig::from_toml(
            r#"
            log_level = "trace"

            [host_methods]
            on_responses_available = "notifyChain"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter(), LevelFilter::Trace);
        assert_eq!(config.host_methods.on_responses_available, "notifyChain");
        assert_eq!(config.host_methods.on_chain_initialized, "onChainInitialized");
        assert_eq!(config.jni_version, DEFAULT_JNI_VERSION);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = BridgeConfig::from_toml("max_chains = 4").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unparsable_level_falls_back_to_info() {
        let config = BridgeConfig {
            log_level: "loud".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn display_output_parses_back() {
        let config = BridgeConfig {
            panic_tag: "SMOLDOT-PANIC".to_owned(),
            ..Default::default()
        };
        let parsed: BridgeConfig = config.to_string().parse().unwrap();
        assert_eq!(parsed, config);
    }
}
