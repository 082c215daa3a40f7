//! FFI layer for host presentation layers.
//!
//! This module provides C-compatible functions so a UI written in another
//! language can drive the quote collection. All data crosses the boundary as
//! JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `quotesync_*` functions are allocated by Rust
//! - Caller must free them with `quotesync_string_free`
//! - Store pointers must be freed with `quotesync_store_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{snapshot, QuoteStore};
use std::ffi::{c_char, CStr, CString};

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

const NUL_ERROR: &CStr = c"{\"error\":\"string contained null bytes\"}";

/// Convert a Rust string to a C string pointer.
/// Caller must free with `quotesync_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    CString::new(s)
        .unwrap_or_else(|_| NUL_ERROR.to_owned())
        .into_raw()
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

// ============================================================================
// Store Lifecycle
// ============================================================================

/// Create a store from a stored collection blob.
///
/// A null or unreadable blob yields an empty store, the same way a cold
/// start would.
///
/// # Safety
/// - `quotes_json` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `quotesync_store_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_new(quotes_json: *const c_char) -> *mut QuoteStore {
    let quotes = from_c_string(quotes_json)
        .map(|blob| snapshot::decode_lenient(&blob).quotes)
        .unwrap_or_default();
    Box::into_raw(Box::new(QuoteStore::from_quotes(quotes)))
}

/// Free a store.
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_free(store: *mut QuoteStore) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `quotesync_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn quotesync_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Store Operations
// ============================================================================

/// Get every quote.
///
/// # Returns
/// JSON string: `{"ok": [Quote, ...]}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_all(store: *const QuoteStore) -> *mut c_char {
    let Some(store) = store.as_ref() else {
        return error_json("null store pointer");
    };
    to_c_string(FfiResult::ok(store.all()).to_json())
}

/// Add a locally authored quote.
///
/// # Returns
/// JSON string: `{"ok": Quote}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - `text` and `category` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_add(
    store: *mut QuoteStore,
    text: *const c_char,
    category: *const c_char,
) -> *mut c_char {
    let Some(store) = store.as_mut() else {
        return error_json("null store pointer");
    };
    let text = from_c_string(text).unwrap_or_default();
    let category = from_c_string(category).unwrap_or_default();

    match store.add(&text, &category) {
        Ok(quote) => to_c_string(FfiResult::ok(quote).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Merge a remote snapshot into the store.
///
/// # Arguments
/// - `remote_json`: JSON array of quotes as fetched from the remote side
///
/// # Returns
/// JSON string: `{"ok": MergeOutcome}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - `remote_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_merge(
    store: *mut QuoteStore,
    remote_json: *const c_char,
) -> *mut c_char {
    let Some(store) = store.as_mut() else {
        return error_json("null store pointer");
    };
    let Some(remote_str) = from_c_string(remote_json) else {
        return error_json("invalid remote JSON");
    };

    match snapshot::decode(&remote_str) {
        Ok(remote) => to_c_string(FfiResult::ok(store.merge(&remote)).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Export the collection in the pretty-printed export format.
///
/// # Returns
/// JSON string: `{"ok": "<export blob>"}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_export(store: *const QuoteStore) -> *mut c_char {
    let Some(store) = store.as_ref() else {
        return error_json("null store pointer");
    };

    match snapshot::encode_pretty(store.all()) {
        Ok(blob) => to_c_string(FfiResult::ok(blob).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Import quotes from an export file.
///
/// # Returns
/// JSON string: `{"ok": <imported count>}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - `blob` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_import(
    store: *mut QuoteStore,
    blob: *const c_char,
) -> *mut c_char {
    let Some(store) = store.as_mut() else {
        return error_json("null store pointer");
    };
    let Some(blob) = from_c_string(blob) else {
        return error_json("invalid import JSON");
    };

    match snapshot::parse_import(&blob) {
        Ok(quotes) => to_c_string(FfiResult::ok(store.extend(quotes)).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Get the filter options (`"all"` first).
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_categories(store: *const QuoteStore) -> *mut c_char {
    let Some(store) = store.as_ref() else {
        return error_json("null store pointer");
    };
    to_c_string(FfiResult::ok(store.category_index().options()).to_json())
}

/// Resolve a persisted filter value against the store's categories.
///
/// # Returns
/// JSON string: `{"ok": "<filter>"}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `quotesync_store_new` or null
/// - `persisted` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `quotesync_string_free`
#[no_mangle]
pub unsafe extern "C" fn quotesync_store_resolve_filter(
    store: *const QuoteStore,
    persisted: *const c_char,
) -> *mut c_char {
    let Some(store) = store.as_ref() else {
        return error_json("null store pointer");
    };
    let persisted = from_c_string(persisted).unwrap_or_default();
    to_c_string(FfiResult::ok(store.category_index().resolve(&persisted)).to_json())
}

// ============================================================================
// Utility
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn quotesync_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
