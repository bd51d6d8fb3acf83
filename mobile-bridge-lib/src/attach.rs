//! Scoped attachment of engine threads to the managed runtime.
//!
//! Engine threads were never created by the runtime, so before calling into it a
//! thread may have to be attached. [`AttachedEnv`] attaches on acquisition when
//! needed and detaches on drop, but only if it was the one that attached.

use log::{trace, warn};

use crate::error::Result;

/// Result of asking the runtime for the current thread's call interface.
#[derive(Debug)]
pub enum EnvLookup<E> {
    /// The thread is already attached; here is its interface.
    Attached(E),
    /// The thread is not attached to the runtime.
    Detached,
    /// The runtime doesn't support the requested interface version.
    UnsupportedVersion,
    /// Any other failure code reported by the runtime.
    Failed(i32),
}

/// A managed runtime that threads can attach to.
pub trait ManagedRuntime {
    /// Per-thread call interface handed out by the runtime.
    type Env;

    fn get_env(&self, version: i32) -> EnvLookup<Self::Env>;

    /// Attaches the calling thread and returns its interface.
    fn attach_current_thread(&self) -> Result<Self::Env>;

    /// Detaches the calling thread. Only called by a guard that attached it.
    fn detach_current_thread(&self);
}

/// How an [`AttachedEnv`] came to hold (or not hold) an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// The thread was attached before acquisition; it stays attached.
    AlreadyAttached,
    /// Acquisition attached the thread; dropping the guard detaches it.
    AttachedHere,
    /// No interface is available. Calls through this guard are skipped.
    Unavailable,
}

pub struct AttachedEnv<'rt, R: ManagedRuntime> {
    runtime: &'rt R,
    env: Option<R::Env>,
    state: AttachState,
}

impl<'rt, R: ManagedRuntime> AttachedEnv<'rt, R> {
    /// Obtains an interface for the calling thread, attaching it if it is detached.
    ///
    /// Never fails: if the thread cannot be attached or the version is unsupported,
    /// the guard is returned without an interface.
    pub fn acquire(runtime: &'rt R, version: i32) -> Self {
        let (env, state) = match runtime.get_env(version) {
            EnvLookup::Attached(env) => (Some(env), AttachState::AlreadyAttached),
            EnvLookup::Detached => match runtime.attach_current_thread() {
                Ok(env) => {
                    trace!("attached engine thread to managed runtime");
                    (Some(env), AttachState::AttachedHere)
                }
                Err(e) => {
                    warn!("failed to attach thread to managed runtime: {}", e);
                    (None, AttachState::Unavailable)
                }
            },
            EnvLookup::UnsupportedVersion => {
                warn!("managed runtime doesn't support interface version {:#x}", version);
                (None, AttachState::Unavailable)
            }
            EnvLookup::Failed(code) => {
                warn!("managed runtime refused interface lookup (code {})", code);
                (None, AttachState::Unavailable)
            }
        };

        Self {
            runtime,
            env,
            state,
        }
    }

    pub fn state(&self) -> AttachState {
        self.state
    }

    pub fn did_attach(&self) -> bool {
        self.state == AttachState::AttachedHere
    }

    pub fn env(&mut self) -> Option<&mut R::Env> {
        self.env.as_mut()
    }

    /// Runs `f` with the interface, or returns `None` without calling it when no
    /// interface is available.
    pub fn with_env<T>(&mut self, f: impl FnOnce(&mut R::Env) -> T) -> Option<T> {
        self.env.as_mut().map(f)
    }
}

impl<R: ManagedRuntime> Drop for AttachedEnv<'_, R> {
    fn drop(&mut self) {
        // The interface must not outlive the attachment.
        drop(self.env.take());
        if self.did_attach() {
            self.runtime.detach_current_thread();
            trace!("detached engine thread from managed runtime");
        }
    }
}

/// Runs `call` on the calling thread's interface, attaching for the duration of the
/// call if needed. Returns `Ok(None)` without calling it when no interface is
/// available.
pub fn run_attached<R, T>(
    runtime: &R,
    version: i32,
    call: impl FnOnce(&mut R::Env) -> Result<T>,
) -> Result<Option<T>>
where
    R: ManagedRuntime,
{
    let mut attached = AttachedEnv::acquire(runtime, version);
    match attached.with_env(call) {
        Some(result) => result.map(Some),
        None => Ok(None),
    }
}
