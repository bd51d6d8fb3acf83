//! Delivery of engine events to the registered receiver.
//!
//! [`DispatchHub`] owns the lazily created [`Dispatcher`]; the dispatcher owns at
//! most one receiver. The two live behind separate locks: delivery never touches
//! the instance slot.

use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace};

use crate::event::{Event, EventReceiver};

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No receiver was registered. The event is dropped.
    Discarded,
    /// The receiver panicked while handling the event. The event is dropped.
    Failed,
    /// Raised by the receiver itself while it was handling an event. Delivered once
    /// that callback returns.
    Deferred,
}

thread_local! {
    /// Address of the dispatcher currently delivering on this thread, 0 if none.
    static DELIVERING: Cell<usize> = Cell::new(0);
}

/// Marks the current thread as delivering for `dispatcher` until dropped.
struct DeliveryMarker {
    previous: usize,
}

impl DeliveryMarker {
    fn enter(dispatcher: &Dispatcher) -> Self {
        let previous = DELIVERING.with(|d| d.replace(dispatcher.address()));
        Self { previous }
    }
}

impl Drop for DeliveryMarker {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
    }
}

/// Requests made from inside a callback, applied when the callback returns.
#[derive(Default)]
struct Deferred {
    /// `Some(None)` clears the receiver, `Some(Some(_))` replaces it.
    receiver_change: Option<Option<Box<dyn EventReceiver>>>,
    events: VecDeque<Event>,
}

#[derive(Default)]
pub struct Dispatcher {
    receiver: Mutex<Option<Box<dyn EventReceiver>>>,
    deferred: Mutex<Deferred>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn receiver(&self) -> MutexGuard<'_, Option<Box<dyn EventReceiver>>> {
        self.receiver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deferred(&self) -> MutexGuard<'_, Deferred> {
        self.deferred.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }

    /// Whether the calling thread is inside this dispatcher's receiver callback, and
    /// therefore already holds the receiver lock.
    fn delivering_here(&self) -> bool {
        DELIVERING.with(|d| d.get() == self.address())
    }

    /// Registers `receiver`, replacing and dropping any previous one.
    ///
    /// Called from inside the receiver's own callback, the replacement takes effect
    /// once that callback returns.
    pub fn set_receiver(&self, receiver: Box<dyn EventReceiver>) {
        if self.delivering_here() {
            debug!("receiver replaced during delivery, applying after the callback");
            self.deferred().receiver_change = Some(Some(receiver));
            return;
        }
        *self.receiver() = Some(receiver);
    }

    /// Removes the current receiver. Returns whether one was registered.
    ///
    /// Called from inside the receiver's own callback, the removal takes effect once
    /// that callback returns.
    pub fn clear_receiver(&self) -> bool {
        if self.delivering_here() {
            debug!("receiver cleared during delivery, applying after the callback");
            let previous = self.deferred().receiver_change.replace(None);
            return !matches!(previous, Some(None));
        }
        self.receiver().take().is_some()
    }

    pub fn has_receiver(&self) -> bool {
        if self.delivering_here() {
            return match &self.deferred().receiver_change {
                Some(change) => change.is_some(),
                None => true,
            };
        }
        self.receiver().is_some()
    }

    /// Hands `event` to the receiver on the calling thread.
    ///
    /// The receiver lock is held for the whole callback, so concurrent dispatches
    /// reach the receiver one at a time. Events and receiver changes the callback
    /// itself produces are queued and applied, in order, before the lock is released.
    pub fn dispatch(&self, event: Event) -> Delivery {
        if self.delivering_here() {
            trace!("queueing {} event raised during delivery", event.kind());
            self.deferred().events.push_back(event);
            return Delivery::Deferred;
        }

        let mut slot = self.receiver();
        let _marker = DeliveryMarker::enter(self);
        let delivery = deliver(slot.as_deref(), event);

        loop {
            let (change, next) = {
                let mut deferred = self.deferred();
                (deferred.receiver_change.take(), deferred.events.pop_front())
            };
            if let Some(change) = change {
                *slot = change;
            }
            match next {
                Some(event) => {
                    deliver(slot.as_deref(), event);
                }
                None => break,
            }
        }

        delivery
    }
}

fn deliver(receiver: Option<&dyn EventReceiver>, event: Event) -> Delivery {
    let receiver = match receiver {
        Some(receiver) => receiver,
        None => {
            trace!("no receiver registered, discarding {} event", event.kind());
            return Delivery::Discarded;
        }
    };

    let kind = event.kind();
    match panic::catch_unwind(AssertUnwindSafe(|| receiver.on_event(event))) {
        Ok(()) => Delivery::Delivered,
        Err(_) => {
            error!("receiver panicked while handling {} event", kind);
            Delivery::Failed
        }
    }
}

/// Holder of the process's dispatcher instance.
pub struct DispatchHub {
    instance: Mutex<Option<Arc<Dispatcher>>>,
}

impl Default for DispatchHub {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchHub {
    pub const fn new() -> Self {
        Self {
            instance: Mutex::new(None),
        }
    }

    fn instance(&self) -> MutexGuard<'_, Option<Arc<Dispatcher>>> {
        self.instance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the live dispatcher, creating it on first use.
    pub fn get_or_create(&self) -> Arc<Dispatcher> {
        let mut instance = self.instance();
        Arc::clone(instance.get_or_insert_with(|| {
            trace!("creating dispatcher");
            Arc::new(Dispatcher::new())
        }))
    }

    /// Returns the live dispatcher without creating one.
    pub fn current(&self) -> Option<Arc<Dispatcher>> {
        self.instance().clone()
    }

    /// Clears the receiver and drops the instance. The next
    /// [`get_or_create`](Self::get_or_create) builds a fresh dispatcher with no receiver.
    ///
    /// Threads still holding the old instance keep dispatching into it, where events
    /// are discarded.
    pub fn reset(&self) {
        let dispatcher = self.instance().take();
        if let Some(dispatcher) = dispatcher {
            dispatcher.clear_receiver();
        }
    }

    /// Shorthand for `get_or_create().dispatch(event)`.
    pub fn dispatch(&self, event: Event) -> Delivery {
        self.get_or_create().dispatch(event)
    }
}

/// Hub used by the C ABI callbacks, which the engine calls without any context.
pub fn global() -> &'static DispatchHub {
    static HUB: DispatchHub = DispatchHub::new();
    &HUB
}
