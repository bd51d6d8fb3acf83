//! Native bridge between the smoldot light client engine and an Android host.
//!
//! The engine reports logs, panics and chain notifications from its own threads.
//! Those reports are turned into [`event::Event`] values, handed to the
//! [`dispatch::Dispatcher`] and delivered synchronously to the single registered
//! [`event::EventReceiver`], which forwards them to the host runtime.

#[cfg(test)]
mod tests;

pub mod attach;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod ffi;
pub mod marshal;
pub mod receiver;
pub mod types;

// JNI bridge for Android
#[cfg(feature = "jni-bridge")]
pub mod jni_bridge;

pub use dispatch::{DispatchHub, Dispatcher};
pub use engine::{Bridge, Engine};
pub use error::{Error, Result};
pub use event::{Event, EventKind, EventReceiver, LogLevel};
