//! Events emitted by the engine.
//!
//! The set of events is closed: every receiver matches on [`Event`] exhaustively,
//! so adding a variant forces each receiver to decide how to handle it.

use std::fmt;

/// Severity of an engine log line, as numbered by the engine's `print` import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Maps a raw ordinal to a level. Unknown ordinals become `Error` so the line is
    /// still emitted at the most visible severity.
    pub fn from_ordinal(ordinal: u32) -> Self {
        match ordinal {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Error,
        }
    }

    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Tag of an [`Event`], fixed when the event is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Log,
    Panic,
    ChainInitialized,
    JsonRpcResponsesNonEmpty,
}

impl EventKind {
    pub fn tag(self) -> u32 {
        match self {
            EventKind::Log => 100,
            EventKind::Panic => 101,
            EventKind::ChainInitialized => 200,
            EventKind::JsonRpcResponsesNonEmpty => 300,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Log => "log",
            EventKind::Panic => "panic",
            EventKind::ChainInitialized => "chain_initialized",
            EventKind::JsonRpcResponsesNonEmpty => "json_rpc_responses_non_empty",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// The engine hit an unrecoverable fault and must be considered unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicEvent {
    pub message: String,
}

/// Outcome of an `add_chain` request. `error` is `None` on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInitializedEvent {
    pub chain_id: u32,
    pub error: Option<String>,
}

/// At least one JSON-RPC response is waiting in the chain's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonRpcResponsesNonEmptyEvent {
    pub chain_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Log(LogEvent),
    Panic(PanicEvent),
    ChainInitialized(ChainInitializedEvent),
    JsonRpcResponsesNonEmpty(JsonRpcResponsesNonEmptyEvent),
}

impl Event {
    pub fn log(level: LogLevel, target: String, message: String) -> Self {
        Event::Log(LogEvent {
            level,
            target,
            message,
        })
    }

    pub fn panic(message: String) -> Self {
        Event::Panic(PanicEvent { message })
    }

    pub fn chain_initialized(chain_id: u32, error: Option<String>) -> Self {
        Event::ChainInitialized(ChainInitializedEvent { chain_id, error })
    }

    pub fn json_rpc_responses_non_empty(chain_id: u32) -> Self {
        Event::JsonRpcResponsesNonEmpty(JsonRpcResponsesNonEmptyEvent { chain_id })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Log(_) => EventKind::Log,
            Event::Panic(_) => EventKind::Panic,
            Event::ChainInitialized(_) => EventKind::ChainInitialized,
            Event::JsonRpcResponsesNonEmpty(_) => EventKind::JsonRpcResponsesNonEmpty,
        }
    }

    /// Chain the event refers to, for chain-scoped events.
    pub fn chain_id(&self) -> Option<u32> {
        match self {
            Event::ChainInitialized(ev) => Some(ev.chain_id),
            Event::JsonRpcResponsesNonEmpty(ev) => Some(ev.chain_id),
            Event::Log(_) | Event::Panic(_) => None,
        }
    }
}

/// Consumer of dispatched events.
///
/// Called on engine threads while the dispatcher's receiver lock is held, so
/// implementations must return quickly and must not call back into the dispatcher.
pub trait EventReceiver: Send {
    fn on_event(&self, event: Event);
}
