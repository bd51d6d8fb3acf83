//! Native methods of `com.github.smoldot.SmoldotAndroid`.
//!
//! Every method converts its Java arguments, forwards to the [`Bridge`](crate::engine::Bridge)
//! and converts the result back. Failures are logged and turned into a sentinel
//! return value; nothing is thrown into the caller.

use std::os::raw::c_void;
use std::ptr;

use jni::objects::{JByteArray, JObject, JString};
use jni::sys::{jboolean, jbyteArray, jint, jlong, JNI_ERR, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use log::{error, info};

use super::callbacks::JniHost;
use super::marshal::managed_array_to_bytes;
use super::types::{bridge, config, CONFIG};
use super::vm::JniRuntime;
use crate::attach::{EnvLookup, ManagedRuntime};
use crate::engine::AddChainRequest;
use crate::marshal::{long_to_chain_id, long_to_u32_saturating};
use crate::receiver::{platform_sink, HostReceiver, LogPriority, LogSink};
use crate::types::BridgeConfig;

const LOAD_TAG: &str = "SmoldotAndroid";

#[no_mangle]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    platform_sink().write(LogPriority::Info, LOAD_TAG, "Loaded");

    match JniRuntime::new(vm).get_env(JNI_VERSION_1_6) {
        EnvLookup::Attached(_) => JNI_VERSION_1_6,
        _ => JNI_ERR,
    }
}

/// JNI: Submit a TOML configuration
///
/// Must happen before `jniInit`; the configuration is frozen afterwards.
/// Returns false if the document is invalid or a configuration is already in effect.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniConfigure(
    mut env: JNIEnv,
    _thiz: JObject,
    config_jstr: JString,
) -> jboolean {
    let document: String = match env.get_string(&config_jstr) {
        Ok(s) => s.into(),
        Err(e) => {
            error!("Failed to read configuration string: {}", e);
            return JNI_FALSE;
        }
    };

    let parsed = match BridgeConfig::from_toml(&document) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid bridge configuration: {}", e);
            return JNI_FALSE;
        }
    };

    if CONFIG.set(parsed).is_err() {
        error!("Bridge configuration already in effect");
        return JNI_FALSE;
    }

    JNI_TRUE
}

/// JNI: Register the host object and initialize the engine
///
/// `thiz` receives chain notifications until `jniDestroy`. Unknown log levels are
/// treated as error-only.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniInit(
    env: JNIEnv,
    thiz: JObject,
    log_level: jlong,
) {
    let config = config();

    // Initialize Android logger
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(config.log_filter())
            .with_tag(config.log_tag.as_str()),
    );

    let vm = match env.get_java_vm() {
        Ok(vm) => vm,
        Err(e) => {
            error!("Failed to get JavaVM: {}", e);
            return;
        }
    };

    let host = match env.new_global_ref(thiz) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create host GlobalRef: {}", e);
            return;
        }
    };

    let version = env
        .get_version()
        .map(jint::from)
        .unwrap_or(config.jni_version);

    let receiver = HostReceiver::new(
        JniHost::new(
            JniRuntime::new(vm),
            version,
            host,
            config.host_methods.clone(),
        ),
        platform_sink(),
        config.panic_tag.as_str(),
    );

    let level = u32::try_from(log_level).unwrap_or(0);
    bridge().initialize(level, Box::new(receiver));

    info!("Bridge initialized (JNI version {:#x})", version);
}

/// JNI: Add a chain
///
/// Returns the chain id, or -1 if an argument couldn't be read. The outcome of the
/// initialization is reported later through `onChainInitialized`.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniAddChain(
    env: JNIEnv,
    _thiz: JObject,
    chain_spec: JByteArray,
    database_content: JByteArray,
    potential_relay_chains: JByteArray,
    json_rpc_max_pending_requests: jlong,
    json_rpc_max_subscriptions: jlong,
) -> jlong {
    let read = |name: &str, array: &JByteArray| match managed_array_to_bytes(&env, array) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!("Failed to read {}: {}", name, e);
            None
        }
    };

    let (chain_spec, database_content, potential_relay_chains) = match (
        read("chain spec", &chain_spec),
        read("database content", &database_content),
        read("potential relay chains", &potential_relay_chains),
    ) {
        (Some(spec), Some(database), Some(relays)) => (spec, database, relays),
        _ => return -1,
    };

    let chain_id = bridge().add_chain(&AddChainRequest {
        chain_spec: &chain_spec,
        database_content: &database_content,
        max_pending_requests: long_to_u32_saturating(json_rpc_max_pending_requests),
        max_subscriptions: long_to_u32_saturating(json_rpc_max_subscriptions),
        potential_relay_chains: &potential_relay_chains,
    });

    jlong::from(chain_id)
}

/// JNI: Remove a chain
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniRemoveChain(
    _env: JNIEnv,
    _thiz: JObject,
    chain_id: jlong,
) {
    match long_to_chain_id(chain_id) {
        Some(chain_id) => bridge().remove_chain(chain_id),
        None => error!("Invalid chain id: {}", chain_id),
    }
}

/// JNI: Send a JSON-RPC request
///
/// Returns 0 when queued, 1 when the chain's queue is full, -1 if the arguments
/// couldn't be read.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniSendJsonRpc(
    env: JNIEnv,
    _thiz: JObject,
    request: JByteArray,
    chain_id: jlong,
) -> jlong {
    let chain_id = match long_to_chain_id(chain_id) {
        Some(id) => id,
        None => {
            error!("Invalid chain id: {}", chain_id);
            return -1;
        }
    };

    let request = match managed_array_to_bytes(&env, &request) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read request: {}", e);
            return -1;
        }
    };

    jlong::from(u32::from(bridge().send_request(&request, chain_id)))
}

/// JNI: Take the next JSON-RPC response
///
/// Returns null when the chain's queue is empty. The response is popped only once
/// the `byte[]` has been created.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniJsonRpcResponsesPeek(
    env: JNIEnv,
    _thiz: JObject,
    chain_id: jlong,
) -> jbyteArray {
    let chain_id = match long_to_chain_id(chain_id) {
        Some(id) => id,
        None => {
            error!("Invalid chain id: {}", chain_id);
            return ptr::null_mut();
        }
    };

    let taken = bridge().take_response(chain_id, |response| {
        Ok(env.byte_array_from_slice(response)?)
    });

    match taken {
        Ok(Some(array)) => array.into_raw(),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            error!("Failed to create response byte[]: {}", e);
            ptr::null_mut()
        }
    }
}

/// JNI: Unregister the host object
///
/// Engine events produced afterwards are discarded.
#[no_mangle]
pub extern "C" fn Java_com_github_smoldot_SmoldotAndroid_jniDestroy(_env: JNIEnv, _thiz: JObject) {
    bridge().destroy();
}
