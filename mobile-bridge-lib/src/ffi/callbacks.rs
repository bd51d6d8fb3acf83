//! Engine → bridge callbacks.
//!
//! The `on_*` functions take the dispatcher explicitly. The exported symbols at the
//! bottom of this file are what the engine links against; they resolve the
//! process-wide dispatcher and forward.

use crate::dispatch::{Delivery, Dispatcher};
use crate::event::{Event, LogLevel};
use crate::marshal::{buffer_to_optional_text, buffer_to_text};

/// The engine hit a fatal error.
///
/// # Safety
///
/// `message_ptr` must be valid for reads of `message_len` bytes for the duration of
/// the call.
pub unsafe fn on_panic(
    dispatcher: &Dispatcher,
    message_ptr: *const u8,
    message_len: usize,
) -> Delivery {
    let message = buffer_to_text(message_ptr, message_len);
    dispatcher.dispatch(Event::panic(message))
}

/// A chain finished initializing. A null `error_ptr` means success.
///
/// # Safety
///
/// If `error_ptr` is non-null it must be valid for reads of `error_len` bytes for
/// the duration of the call.
pub unsafe fn on_chain_initialized(
    dispatcher: &Dispatcher,
    chain_id: u32,
    error_ptr: *const u8,
    error_len: usize,
) -> Delivery {
    let error = buffer_to_optional_text(error_ptr, error_len);
    dispatcher.dispatch(Event::chain_initialized(chain_id, error))
}

/// The chain's JSON-RPC response queue went from empty to non-empty.
pub fn on_responses_available(dispatcher: &Dispatcher, chain_id: u32) -> Delivery {
    dispatcher.dispatch(Event::json_rpc_responses_non_empty(chain_id))
}

/// The engine emitted a log line. `level` uses the engine's numbering (1 = error
/// through 5 = trace).
///
/// # Safety
///
/// Both buffers must be valid for reads of their respective lengths for the
/// duration of the call.
pub unsafe fn on_log(
    dispatcher: &Dispatcher,
    level: u32,
    target_ptr: *const u8,
    target_len: usize,
    message_ptr: *const u8,
    message_len: usize,
) -> Delivery {
    let level = LogLevel::from_ordinal(level);
    let target = buffer_to_text(target_ptr, target_len);
    let message = buffer_to_text(message_ptr, message_len);
    dispatcher.dispatch(Event::log(level, target, message))
}

#[cfg(feature = "engine-link")]
mod exports {
    use crate::dispatch;

    /// Engine import: fatal error with a UTF-8 message.
    ///
    /// # Safety
    ///
    /// See [`super::on_panic`].
    #[no_mangle]
    pub unsafe extern "C" fn panic(message_ptr: *const u8, message_len: usize) {
        let dispatcher = dispatch::global().get_or_create();
        super::on_panic(&dispatcher, message_ptr, message_len);
    }

    /// Engine import: reply to `add_chain`.
    ///
    /// # Safety
    ///
    /// See [`super::on_chain_initialized`].
    #[no_mangle]
    pub unsafe extern "C" fn chain_initialized(
        chain_id: u32,
        error_msg_ptr: *const u8,
        error_msg_len: usize,
    ) {
        let dispatcher = dispatch::global().get_or_create();
        super::on_chain_initialized(&dispatcher, chain_id, error_msg_ptr, error_msg_len);
    }

    /// Engine import: responses are waiting for `chain_id`.
    #[no_mangle]
    pub extern "C" fn json_rpc_responses_non_empty(chain_id: u32) {
        let dispatcher = dispatch::global().get_or_create();
        super::on_responses_available(&dispatcher, chain_id);
    }

    /// Engine import: log line.
    ///
    /// # Safety
    ///
    /// See [`super::on_log`].
    #[no_mangle]
    pub unsafe extern "C" fn print(
        level: u32,
        target_ptr: *const u8,
        target_len: usize,
        message_ptr: *const u8,
        message_len: usize,
    ) {
        let dispatcher = dispatch::global().get_or_create();
        super::on_log(
            &dispatcher,
            level,
            target_ptr,
            target_len,
            message_ptr,
            message_len,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChainInitializedEvent, LogEvent};
    use crate::marshal::optional_text_to_buffer;
    use crate::tests::RecordingReceiver;
    use std::ptr;

    #[test]
    fn callbacks_without_receiver_are_discarded() {
        let dispatcher = Dispatcher::new();
        let message = b"unreachable";
        let delivery = unsafe { on_panic(&dispatcher, message.as_ptr(), message.len()) };
        assert_eq!(delivery, Delivery::Discarded);
        assert_eq!(on_responses_available(&dispatcher, 1), Delivery::Discarded);
    }

    #[test]
    fn log_callback_decodes_buffers_and_level() {
        let dispatcher = Dispatcher::new();
        let (receiver, seen) = RecordingReceiver::new();
        dispatcher.set_receiver(Box::new(receiver));

        let target = b"network-service";
        let message = b"connected to 12 peers";
        unsafe {
            on_log(&dispatcher, 4, target.as_ptr(), target.len(), message.as_ptr(), message.len());
            on_log(&dispatcher, 0, target.as_ptr(), 7, ptr::null(), 0);
        }

        assert_eq!(
            seen.events(),
            vec![
                Event::Log(LogEvent {
                    level: LogLevel::Debug,
                    target: "network-service".into(),
                    message: "connected to 12 peers".into(),
                }),
                Event::Log(LogEvent {
                    level: LogLevel::Error,
                    target: "network".into(),
                    message: String::new(),
                }),
            ]
        );
    }

    #[test]
    fn chain_initialized_distinguishes_null_from_empty_error() {
        let dispatcher = Dispatcher::new();
        let (receiver, seen) = RecordingReceiver::new();
        dispatcher.set_receiver(Box::new(receiver));

        let (null_ptr, null_len) = optional_text_to_buffer(None);
        let (empty_ptr, empty_len) = optional_text_to_buffer(Some(""));
        unsafe {
            on_chain_initialized(&dispatcher, 1, null_ptr, null_len);
            on_chain_initialized(&dispatcher, 2, empty_ptr, empty_len);
        }

        assert_eq!(
            seen.events(),
            vec![
                Event::ChainInitialized(ChainInitializedEvent {
                    chain_id: 1,
                    error: None,
                }),
                Event::ChainInitialized(ChainInitializedEvent {
                    chain_id: 2,
                    error: Some(String::new()),
                }),
            ]
        );
    }

    #[test]
    fn panic_callback_copies_message() {
        let dispatcher = Dispatcher::new();
        let (receiver, seen) = RecordingReceiver::new();
        dispatcher.set_receiver(Box::new(receiver));

        let mut message = b"panicked at 'attempt to divide by zero'".to_vec();
        let delivery = unsafe { on_panic(&dispatcher, message.as_ptr(), message.len()) };
        message.clear();

        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(
            seen.events(),
            vec![Event::panic("panicked at 'attempt to divide by zero'".into())]
        );
    }
}
