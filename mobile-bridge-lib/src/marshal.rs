//! Conversions between raw boundary buffers and owned values.
//!
//! Every function copies its input exactly once and keeps no reference to it, so
//! callers only need the buffer to stay valid for the duration of the call.

use std::ffi::CString;
use std::{ptr, slice};

/// Copies `len` bytes starting at `ptr`.
///
/// A zero `len` yields an empty vector without touching `ptr`, which may then be null.
///
/// # Safety
///
/// When `len` is non-zero, `ptr` must be valid for reads of `len` bytes.
pub unsafe fn buffer_to_bytes(ptr: *const u8, len: usize) -> Vec<u8> {
    if len == 0 || ptr.is_null() {
        return Vec::new();
    }
    slice::from_raw_parts(ptr, len).to_vec()
}

/// Copies `len` bytes starting at `ptr` as text. The buffer is not expected to be
/// NUL-terminated; invalid UTF-8 sequences are replaced with U+FFFD.
///
/// # Safety
///
/// Same contract as [`buffer_to_bytes`].
pub unsafe fn buffer_to_text(ptr: *const u8, len: usize) -> String {
    if len == 0 || ptr.is_null() {
        return String::new();
    }
    String::from_utf8_lossy(slice::from_raw_parts(ptr, len)).into_owned()
}

/// Like [`buffer_to_text`], but a null `ptr` means "no value". A non-null pointer
/// with a zero `len` is a present, empty string.
///
/// # Safety
///
/// Same contract as [`buffer_to_bytes`].
pub unsafe fn buffer_to_optional_text(ptr: *const u8, len: usize) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(buffer_to_text(ptr, len))
}

/// Encodes an optional string as the `(ptr, len)` pair expected by the engine's
/// callbacks: `None` becomes a null pointer.
pub fn optional_text_to_buffer(text: Option<&str>) -> (*const u8, usize) {
    match text {
        Some(text) => (text.as_ptr(), text.len()),
        None => (ptr::null(), 0),
    }
}

/// NUL-terminated copy of `text`, cut at the first interior NUL.
pub fn text_to_c_string(text: &str) -> CString {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

/// Packs chain ids as consecutive 32-bit little-endian integers, the layout of the
/// `potential_relay_chains` buffer of `add_chain`.
pub fn encode_relay_chain_ids(chain_ids: &[u32]) -> Vec<u8> {
    chain_ids.iter().flat_map(|id| id.to_le_bytes()).collect()
}

/// Inverse of [`encode_relay_chain_ids`]. A trailing chunk shorter than four bytes
/// is ignored.
pub fn decode_relay_chain_ids(buffer: &[u8]) -> Vec<u32> {
    buffer
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Narrows a host `long` to `u32`, saturating at both ends.
pub fn long_to_u32_saturating(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Host `long` to engine chain id, `None` if it is out of range.
pub fn long_to_chain_id(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}
