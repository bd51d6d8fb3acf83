//! Bridge → engine commands.

use crate::marshal::buffer_to_bytes;

/// Front of a chain's JSON-RPC response queue, as returned by
/// `json_rpc_responses_peek`. A `len` of zero means the queue is empty.
///
/// `ptr` stays valid until `json_rpc_responses_pop` or `remove_chain` is called for
/// the same chain.
#[repr(C)]
#[derive(Debug)]
pub struct JsonRpcResponseInfo {
    pub ptr: *const u8,
    pub len: usize,
}

impl JsonRpcResponseInfo {
    /// Copies the response out of engine memory, `None` if the queue is empty.
    ///
    /// # Safety
    ///
    /// `ptr` must still be valid, i.e. the response must not have been popped yet.
    pub unsafe fn to_response(&self) -> Option<Vec<u8>> {
        if self.len == 0 {
            return None;
        }
        Some(buffer_to_bytes(self.ptr, self.len))
    }
}

#[cfg(feature = "engine-link")]
mod linked {
    use super::JsonRpcResponseInfo;
    use crate::engine::{AddChainRequest, Engine};
    use log::error;

    extern "C" {
        fn init(max_log_level: u32);
        fn add_chain(
            chain_spec_buffer_ptr: *const u8,
            chain_spec_buffer_len: usize,
            database_content_buffer_ptr: *const u8,
            database_content_buffer_len: usize,
            json_rpc_max_pending_requests: u32,
            json_rpc_max_subscriptions: u32,
            potential_relay_chains_buffer_ptr: *const u8,
            potential_relay_chains_buffer_len: usize,
        ) -> u32;
        fn remove_chain(chain_id: u32);
        fn json_rpc_send(text_buffer_ptr: *const u8, text_buffer_len: usize, chain_id: u32)
            -> u32;
        fn json_rpc_responses_peek(chain_id: u32) -> *const JsonRpcResponseInfo;
        fn json_rpc_responses_pop(chain_id: u32);
    }

    /// The engine linked into this library.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LinkedEngine;

    impl Engine for LinkedEngine {
        fn init(&self, max_log_level: u32) {
            unsafe { init(max_log_level) }
        }

        fn add_chain(&self, request: &AddChainRequest<'_>) -> u32 {
            unsafe {
                add_chain(
                    request.chain_spec.as_ptr(),
                    request.chain_spec.len(),
                    request.database_content.as_ptr(),
                    request.database_content.len(),
                    request.max_pending_requests,
                    request.max_subscriptions,
                    request.potential_relay_chains.as_ptr(),
                    request.potential_relay_chains.len(),
                )
            }
        }

        fn remove_chain(&self, chain_id: u32) {
            unsafe { remove_chain(chain_id) }
        }

        fn json_rpc_send(&self, request: &[u8], chain_id: u32) -> u32 {
            unsafe { json_rpc_send(request.as_ptr(), request.len(), chain_id) }
        }

        fn json_rpc_responses_peek(&self, chain_id: u32) -> Option<Vec<u8>> {
            unsafe {
                let info = json_rpc_responses_peek(chain_id);
                match info.as_ref() {
                    Some(info) => info.to_response(),
                    None => {
                        error!("engine returned no response info for chain {}", chain_id);
                        None
                    }
                }
            }
        }

        fn json_rpc_responses_pop(&self, chain_id: u32) {
            unsafe { json_rpc_responses_pop(chain_id) }
        }
    }
}

#[cfg(feature = "engine-link")]
pub use linked::LinkedEngine;

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn zero_length_info_is_an_empty_queue() {
        let info = JsonRpcResponseInfo {
            ptr: ptr::null(),
            len: 0,
        };
        assert_eq!(unsafe { info.to_response() }, None);
    }

    #[test]
    fn response_is_copied_out() {
        let response = br#"{"jsonrpc":"2.0","id":1,"result":null}"#;
        let info = JsonRpcResponseInfo {
            ptr: response.as_ptr(),
            len: response.len(),
        };
        assert_eq!(unsafe { info.to_response() }, Some(response.to_vec()));
    }
}
