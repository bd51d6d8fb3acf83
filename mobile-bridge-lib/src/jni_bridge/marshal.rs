//! Java → native conversions.

use jni::objects::JByteArray;
use jni::JNIEnv;

use crate::error::Result;

/// Copies a Java `byte[]` into an owned vector. No reference into the Java heap is
/// kept past the call. A null array is an error.
pub fn managed_array_to_bytes(env: &JNIEnv, array: &JByteArray) -> Result<Vec<u8>> {
    Ok(env.convert_byte_array(array)?)
}
