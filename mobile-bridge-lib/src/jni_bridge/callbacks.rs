//! JVM callback implementations
//!
//! Invokes the host object's chain notification methods from engine threads.

use jni::objects::{GlobalRef, JObject, JValue};
use jni::sys::jint;
use jni::JNIEnv;
use log::warn;

use super::vm::JniRuntime;
use crate::attach::run_attached;
use crate::error::Result;
use crate::receiver::HostCallbacks;
use crate::types::HostMethods;

const ON_CHAIN_INITIALIZED_SIG: &str = "(JLjava/lang/String;)V";
const ON_RESPONSES_AVAILABLE_SIG: &str = "(J)V";

/// The registered host object, reachable from any thread.
pub struct JniHost {
    runtime: JniRuntime,
    version: jint,
    host: GlobalRef,
    methods: HostMethods,
}

impl JniHost {
    pub fn new(runtime: JniRuntime, version: jint, host: GlobalRef, methods: HostMethods) -> Self {
        Self {
            runtime,
            version,
            host,
            methods,
        }
    }

    /// Runs `call` on an attached env. Skipped when the thread can't be attached.
    fn with_env(&self, call: impl FnOnce(&mut JNIEnv) -> Result<()>) -> Result<()> {
        run_attached(&self.runtime, self.version, |raw| {
            let mut env = unsafe { JNIEnv::from_raw(*raw) }?;
            let result = env.with_local_frame(4, |env| call(env));
            clear_pending_exception(&mut env);
            result
        })
        .map(|_| ())
    }
}

impl HostCallbacks for JniHost {
    fn on_chain_initialized(&self, chain_id: i64, error: Option<&str>) -> Result<()> {
        self.with_env(|env| {
            let error = match error {
                Some(error) => JObject::from(env.new_string(error)?),
                None => JObject::null(),
            };
            env.call_method(
                self.host.as_obj(),
                self.methods.on_chain_initialized.as_str(),
                ON_CHAIN_INITIALIZED_SIG,
                &[JValue::Long(chain_id), JValue::Object(&error)],
            )?;
            Ok(())
        })
    }

    fn on_responses_available(&self, chain_id: i64) -> Result<()> {
        self.with_env(|env| {
            env.call_method(
                self.host.as_obj(),
                self.methods.on_responses_available.as_str(),
                ON_RESPONSES_AVAILABLE_SIG,
                &[JValue::Long(chain_id)],
            )?;
            Ok(())
        })
    }
}

/// Engine threads must never return to the engine with an exception pending.
fn clear_pending_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        warn!("host callback threw");
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}
