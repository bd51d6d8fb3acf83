//! Global state of the JNI bridge.
//!
//! Uses OnceLock for the configuration, which is fixed once the bridge is first
//! initialized.

use std::sync::OnceLock;

use crate::dispatch;
use crate::engine::Bridge;
use crate::ffi::LinkedEngine;
use crate::types::BridgeConfig;

/// Configuration submitted through `jniConfigure`, or the default one.
pub static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

/// Configuration in effect. Freezes it on first call.
pub fn config() -> &'static BridgeConfig {
    CONFIG.get_or_init(BridgeConfig::default)
}

/// Bridge over the process-wide hub and the linked engine.
pub fn bridge() -> Bridge<'static, LinkedEngine> {
    Bridge::new(dispatch::global(), LinkedEngine)
}
