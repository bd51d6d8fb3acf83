//! Test doubles shared by the unit tests, and end-to-end scenarios.


use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::engine::{AddChainRequest, Engine};
use crate::event::{Event, EventReceiver};
use crate::receiver::{HostCallbacks, LogPriority, LogSink};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shared, cloneable view of what a test double recorded.
#[derive(Clone)]
pub(crate) struct Recorded<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Recorded<T> {
    pub(crate) fn new() -> Self {
        Recorded(Arc::new(Mutex::new(Vec::new())))
    }

    pub(crate) fn push(&self, item: T) {
        self.0.lock().unwrap().push(item);
    }

    pub(crate) fn events(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }
}

pub(crate) struct RecordingReceiver {
    seen: Recorded<Event>,
}

impl RecordingReceiver {
    pub(crate) fn new() -> (Self, Recorded<Event>) {
        let seen = Recorded::new();
        (Self { seen: seen.clone() }, seen)
    }
}

impl EventReceiver for RecordingReceiver {
    fn on_event(&self, event: Event) {
        self.seen.push(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    ChainInitialized { chain_id: i64, error: Option<String> },
    ResponsesAvailable { chain_id: i64 },
}

pub(crate) struct RecordingHost {
    calls: Recorded<HostCall>,
    fail: bool,
}

impl RecordingHost {
    pub(crate) fn new() -> (Self, Recorded<HostCall>) {
        let calls = Recorded::new();
        (
            Self {
                calls: calls.clone(),
                fail: false,
            },
            calls,
        )
    }

    /// Host whose callbacks record the call and then report a failure.
    pub(crate) fn failing() -> (Self, Recorded<HostCall>) {
        let (mut host, calls) = Self::new();
        host.fail = true;
        (host, calls)
    }

    fn outcome(&self) -> crate::Result<()> {
        if self.fail {
            Err(crate::Error::runtime("host rejected the call"))
        } else {
            Ok(())
        }
    }
}

impl HostCallbacks for RecordingHost {
    fn on_chain_initialized(&self, chain_id: i64, error: Option<&str>) -> crate::Result<()> {
        self.calls.push(HostCall::ChainInitialized {
            chain_id,
            error: error.map(str::to_owned),
        });
        self.outcome()
    }

    fn on_responses_available(&self, chain_id: i64) -> crate::Result<()> {
        self.calls.push(HostCall::ResponsesAvailable { chain_id });
        self.outcome()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogLine {
    pub priority: LogPriority,
    pub tag: String,
    pub message: String,
}

pub(crate) struct RecordingSink {
    lines: Recorded<LogLine>,
}

impl RecordingSink {
    pub(crate) fn new() -> (Self, Recorded<LogLine>) {
        let lines = Recorded::new();
        (
            Self {
                lines: lines.clone(),
            },
            lines,
        )
    }
}

impl LogSink for RecordingSink {
    fn write(&self, priority: LogPriority, tag: &str, message: &str) {
        self.lines.push(LogLine {
            priority,
            tag: tag.to_owned(),
            message: message.to_owned(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Init(u32),
    AddChain {
        chain_spec: Vec<u8>,
        database_content: Vec<u8>,
        max_pending_requests: u32,
        max_subscriptions: u32,
        potential_relay_chains: Vec<u8>,
    },
    RemoveChain(u32),
    Send(Vec<u8>, u32),
    Peek(u32),
    Pop(u32),
}

/// In-memory engine: allocates sequential chain ids, answers `json_rpc_send` with a
/// fixed status and serves responses queued by the test.
pub(crate) struct FakeEngine {
    calls: Recorded<EngineCall>,
    next_chain_id: Mutex<u32>,
    send_status: u32,
    responses: Mutex<VecDeque<(u32, Vec<u8>)>>,
}

impl FakeEngine {
    pub(crate) fn new() -> (Self, Recorded<EngineCall>) {
        Self::with_send_status(0)
    }

    pub(crate) fn with_send_status(send_status: u32) -> (Self, Recorded<EngineCall>) {
        let calls = Recorded::new();
        (
            Self {
                calls: calls.clone(),
                next_chain_id: Mutex::new(0),
                send_status,
                responses: Mutex::new(VecDeque::new()),
            },
            calls,
        )
    }

    pub(crate) fn queue_response(&self, chain_id: u32, response: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back((chain_id, response.as_bytes().to_vec()));
    }
}

impl Engine for FakeEngine {
    fn init(&self, max_log_level: u32) {
        self.calls.push(EngineCall::Init(max_log_level));
    }

    fn add_chain(&self, request: &AddChainRequest<'_>) -> u32 {
        self.calls.push(EngineCall::AddChain {
            chain_spec: request.chain_spec.to_vec(),
            database_content: request.database_content.to_vec(),
            max_pending_requests: request.max_pending_requests,
            max_subscriptions: request.max_subscriptions,
            potential_relay_chains: request.potential_relay_chains.to_vec(),
        });
        let mut next = self.next_chain_id.lock().unwrap();
        let chain_id = *next;
        *next += 1;
        chain_id
    }

    fn remove_chain(&self, chain_id: u32) {
        self.calls.push(EngineCall::RemoveChain(chain_id));
    }

    fn json_rpc_send(&self, request: &[u8], chain_id: u32) -> u32 {
        self.calls.push(EngineCall::Send(request.to_vec(), chain_id));
        self.send_status
    }

    fn json_rpc_responses_peek(&self, chain_id: u32) -> Option<Vec<u8>> {
        self.calls.push(EngineCall::Peek(chain_id));
        self.responses
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| *id == chain_id)
            .map(|(_, response)| response.clone())
    }

    fn json_rpc_responses_pop(&self, chain_id: u32) {
        self.calls.push(EngineCall::Pop(chain_id));
        let mut responses = self.responses.lock().unwrap();
        if let Some(index) = responses.iter().position(|(id, _)| *id == chain_id) {
            responses.remove(index);
        }
    }
}
