//! C ABI boundary with the engine.
//!
//! - `callbacks`: functions the engine imports, turning its reports into events
//! - `engine`: functions the engine exports, wrapped as an [`Engine`](crate::engine::Engine)
//!
//! # Re-entrancy
//!
//! The engine calls the callbacks from its own threads, possibly while holding
//! internal locks. Receivers must not call back into the engine from inside a
//! callback.

pub mod callbacks;
pub mod engine;

pub use callbacks::{on_chain_initialized, on_log, on_panic, on_responses_available};
pub use engine::JsonRpcResponseInfo;
#[cfg(feature = "engine-link")]
pub use engine::LinkedEngine;
