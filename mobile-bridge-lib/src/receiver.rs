//! Translation of engine events into host-visible effects.

use log::warn;

use crate::error::Result;
use crate::event::{
    ChainInitializedEvent, Event, EventReceiver, JsonRpcResponsesNonEmptyEvent, LogEvent,
    LogLevel, PanicEvent,
};

/// Platform log priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPriority {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LogPriority {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LogPriority::Error,
            LogLevel::Warn => LogPriority::Warn,
            LogLevel::Info => LogPriority::Info,
            LogLevel::Debug => LogPriority::Debug,
            LogLevel::Trace => LogPriority::Verbose,
        }
    }
}

/// Destination of engine log lines and panic reports.
pub trait LogSink: Send {
    fn write(&self, priority: LogPriority, tag: &str, message: &str);
}

/// Writes through the `log` facade, with the tag as record target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogSink;

impl LogSink for FacadeLogSink {
    fn write(&self, priority: LogPriority, tag: &str, message: &str) {
        let level = match priority {
            LogPriority::Verbose => log::Level::Trace,
            LogPriority::Debug => log::Level::Debug,
            LogPriority::Info => log::Level::Info,
            LogPriority::Warn => log::Level::Warn,
            LogPriority::Error => log::Level::Error,
        };
        log::log!(target: tag, level, "{}", message);
    }
}

/// Writes straight to logcat with the engine's target as tag.
///
/// Engine lines bypass the `log` facade on Android so they keep their own tag
/// instead of the bridge's.
#[cfg(target_os = "android")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogcatSink;

#[cfg(target_os = "android")]
impl LogSink for LogcatSink {
    fn write(&self, priority: LogPriority, tag: &str, message: &str) {
        use android_log_sys::{LogPriority as Prio, __android_log_write};

        let prio = match priority {
            LogPriority::Verbose => Prio::VERBOSE,
            LogPriority::Debug => Prio::DEBUG,
            LogPriority::Info => Prio::INFO,
            LogPriority::Warn => Prio::WARN,
            LogPriority::Error => Prio::ERROR,
        };
        let tag = crate::marshal::text_to_c_string(tag);
        let message = crate::marshal::text_to_c_string(message);
        unsafe {
            __android_log_write(prio as std::os::raw::c_int, tag.as_ptr(), message.as_ptr());
        }
    }
}

/// Sink for engine lines on the current platform.
#[cfg(target_os = "android")]
pub fn platform_sink() -> LogcatSink {
    LogcatSink
}

/// Sink for engine lines on the current platform.
#[cfg(not(target_os = "android"))]
pub fn platform_sink() -> FacadeLogSink {
    FacadeLogSink
}

/// Host methods invoked for chain notifications.
///
/// Chain ids are widened to `i64`, the host's `long`.
pub trait HostCallbacks: Send {
    fn on_chain_initialized(&self, chain_id: i64, error: Option<&str>) -> Result<()>;
    fn on_responses_available(&self, chain_id: i64) -> Result<()>;
}

/// Receiver forwarding logs and panics to a [`LogSink`] and chain notifications to
/// the host.
pub struct HostReceiver<H, S> {
    host: H,
    sink: S,
    panic_tag: String,
}

impl<H: HostCallbacks, S: LogSink> HostReceiver<H, S> {
    pub fn new(host: H, sink: S, panic_tag: impl Into<String>) -> Self {
        Self {
            host,
            sink,
            panic_tag: panic_tag.into(),
        }
    }
}

impl<H: HostCallbacks, S: LogSink> EventReceiver for HostReceiver<H, S> {
    fn on_event(&self, event: Event) {
        match event {
            Event::Log(LogEvent {
                level,
                target,
                message,
            }) => self.sink.write(level.into(), &target, &message),
            Event::Panic(PanicEvent { message }) => {
                self.sink.write(LogPriority::Error, &self.panic_tag, &message)
            }
            Event::ChainInitialized(ChainInitializedEvent { chain_id, error }) => {
                if let Err(e) = self
                    .host
                    .on_chain_initialized(i64::from(chain_id), error.as_deref())
                {
                    warn!("chain {} initialization callback failed: {}", chain_id, e);
                }
            }
            Event::JsonRpcResponsesNonEmpty(JsonRpcResponsesNonEmptyEvent { chain_id }) => {
                if let Err(e) = self.host.on_responses_available(i64::from(chain_id)) {
                    warn!("chain {} responses callback failed: {}", chain_id, e);
                }
            }
        }
    }
}
