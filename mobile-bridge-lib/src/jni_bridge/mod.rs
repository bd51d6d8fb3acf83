//! JNI bridge for Android
//!
//! Exposes the bridge to `com.github.smoldot.SmoldotAndroid`.
//!
//! ## Architecture
//!
//! - `types`: process-wide configuration and bridge handle
//! - `vm`: `JavaVM` as a [`ManagedRuntime`](crate::attach::ManagedRuntime)
//! - `callbacks`: host method invocations for chain notifications
//! - `marshal`: Java arrays to owned bytes
//! - `lifecycle`: the `jni*` native methods and `JNI_OnLoad`
//!
//! ## Thread Model
//!
//! - `jni*` methods run on host threads, already attached
//! - Events arrive on engine threads, which are attached for the duration of
//!   each host call and detached afterwards

pub mod callbacks;
pub mod lifecycle;
pub mod marshal;
pub mod types;
pub mod vm;

// Re-export main entry points
pub use lifecycle::{
    Java_com_github_smoldot_SmoldotAndroid_jniAddChain,
    Java_com_github_smoldot_SmoldotAndroid_jniConfigure,
    Java_com_github_smoldot_SmoldotAndroid_jniDestroy,
    Java_com_github_smoldot_SmoldotAndroid_jniInit,
    Java_com_github_smoldot_SmoldotAndroid_jniJsonRpcResponsesPeek,
    Java_com_github_smoldot_SmoldotAndroid_jniRemoveChain,
    Java_com_github_smoldot_SmoldotAndroid_jniSendJsonRpc, JNI_OnLoad,
};
