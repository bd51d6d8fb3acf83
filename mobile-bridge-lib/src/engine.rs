//! Host-facing side of the bridge: commands forwarded to the engine, and
//! registration/teardown of the event receiver.

use std::fmt;

use log::{debug, info, warn};

use crate::dispatch::DispatchHub;
use crate::error::Result;
use crate::event::{EventReceiver, LogLevel};
use crate::marshal::decode_relay_chain_ids;

/// Parameters of an `add_chain` command, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct AddChainRequest<'a> {
    /// UTF-8 chain specification.
    pub chain_spec: &'a [u8],
    /// UTF-8 database content, possibly empty.
    pub database_content: &'a [u8],
    /// Zero disables the JSON-RPC service of the chain.
    pub max_pending_requests: u32,
    pub max_subscriptions: u32,
    /// Chain ids packed as 32-bit little-endian integers.
    pub potential_relay_chains: &'a [u8],
}

/// Commands exported by the engine.
pub trait Engine: Send + Sync {
    fn init(&self, max_log_level: u32);

    /// Allocates a chain id and starts initializing the chain in the background.
    /// Completion is reported with a `chain_initialized` event.
    fn add_chain(&self, request: &AddChainRequest<'_>) -> u32;

    fn remove_chain(&self, chain_id: u32);

    /// Queues a JSON-RPC request. See [`SendStatus`] for the returned code.
    fn json_rpc_send(&self, request: &[u8], chain_id: u32) -> u32;

    /// Copy of the response at the front of the chain's queue, `None` if it is empty.
    fn json_rpc_responses_peek(&self, chain_id: u32) -> Option<Vec<u8>>;

    fn json_rpc_responses_pop(&self, chain_id: u32);
}

/// Status code returned by `json_rpc_send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Queued,
    /// The chain has too many pending requests.
    QueueFull,
    Other(u32),
}

impl From<u32> for SendStatus {
    fn from(code: u32) -> Self {
        match code {
            0 => SendStatus::Queued,
            1 => SendStatus::QueueFull,
            other => SendStatus::Other(other),
        }
    }
}

impl From<SendStatus> for u32 {
    fn from(status: SendStatus) -> Self {
        match status {
            SendStatus::Queued => 0,
            SendStatus::QueueFull => 1,
            SendStatus::Other(code) => code,
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SendStatus::Queued => write!(f, "queued"),
            SendStatus::QueueFull => write!(f, "queue full"),
            SendStatus::Other(code) => write!(f, "unknown status {}", code),
        }
    }
}

/// Entry point for the host: owns the engine handle and the dispatch hub events
/// are routed through.
pub struct Bridge<'h, E> {
    hub: &'h DispatchHub,
    engine: E,
}

impl<'h, E: Engine> Bridge<'h, E> {
    pub fn new(hub: &'h DispatchHub, engine: E) -> Self {
        Self { hub, engine }
    }

    /// Registers `receiver` and initializes the engine. Unknown log levels are
    /// normalized to `Error` before reaching the engine.
    pub fn initialize(&self, log_level: u32, receiver: Box<dyn EventReceiver>) {
        self.hub.get_or_create().set_receiver(receiver);

        let level = LogLevel::from_ordinal(log_level);
        info!("initializing engine with max log level {:?}", level);
        self.engine.init(level.ordinal());
    }

    pub fn add_chain(&self, request: &AddChainRequest<'_>) -> u32 {
        if request.potential_relay_chains.len() % 4 != 0 {
            warn!(
                "relay chain buffer of {} bytes is not a whole number of chain ids",
                request.potential_relay_chains.len()
            );
        }
        debug!(
            "adding chain ({} spec bytes, {} potential relay chains)",
            request.chain_spec.len(),
            decode_relay_chain_ids(request.potential_relay_chains).len()
        );
        let chain_id = self.engine.add_chain(request);
        debug!("chain {} allocated", chain_id);
        chain_id
    }

    pub fn remove_chain(&self, chain_id: u32) {
        debug!("removing chain {}", chain_id);
        self.engine.remove_chain(chain_id);
    }

    pub fn send_request(&self, request: &[u8], chain_id: u32) -> SendStatus {
        let status = SendStatus::from(self.engine.json_rpc_send(request, chain_id));
        if status != SendStatus::Queued {
            debug!("request to chain {} not queued: {}", chain_id, status);
        }
        status
    }

    /// Takes the response at the front of the chain's queue, `None` if it is empty.
    pub fn peek_response(&self, chain_id: u32) -> Option<Vec<u8>> {
        match self.take_response(chain_id, |response| Ok(response.to_vec())) {
            Ok(response) => response,
            Err(_) => None,
        }
    }

    /// Converts the response at the front of the chain's queue with `convert` and
    /// pops it only if the conversion succeeded. On error the response stays queued.
    pub fn take_response<T>(
        &self,
        chain_id: u32,
        convert: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<Option<T>> {
        let response = match self.engine.json_rpc_responses_peek(chain_id) {
            Some(response) => response,
            None => return Ok(None),
        };
        let converted = convert(&response)?;
        self.engine.json_rpc_responses_pop(chain_id);
        Ok(Some(converted))
    }

    /// Drops the receiver and the dispatcher. Events produced afterwards are
    /// discarded until a receiver is registered again.
    pub fn destroy(&self) {
        info!("destroying bridge");
        self.hub.reset();
    }
}
