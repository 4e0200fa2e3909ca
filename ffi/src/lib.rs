//! C-ABI wrapper around `quake-core`.
//!
//! # Overview
//! Lets a mobile host load the latest earthquake through `extern "C"`
//! functions, either by letting Rust do the HTTP call (`quake_fetch_*`) or
//! by executing the request itself and handing back the response
//! (`quake_build_request` / `quake_parse_response`).
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `FfiRecordResult` carries either a record or an error code; hosts
//!   render nothing unless the code is `Ok`.
//! - The C caller owns all returned pointers and must call the matching
//!   `quake_free_*` function to release them.
//! - `quake_fetch_start` runs on a worker thread. Cancelling or freeing the
//!   task handle waits for a callback that is already running, so after
//!   either returns the host may release `user_data`.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use quake_core::{
    alert_text, format_time, parse_record, spawn_fetch, CancellationToken, FeedConfig, FeedError,
    HttpResponse, QuakeClient,
};
use tracing_subscriber::EnvFilter;

use types::*;

/// Borrow a C string as `&str`; invalid UTF-8 reads as empty.
unsafe fn str_arg<'a>(s: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `tracing` subscriber writing to stderr, filtered by `QUAKE_LOG`
/// (default `info`). Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn quake_init_logging() -> bool {
    catch_unwind(|| {
        let filter =
            EnvFilter::try_from_env("QUAKE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `url`, or for the USGS query when `url` is null.
/// Free with `quake_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_client_new(url: *const c_char) -> *mut FfiQuakeClient {
    catch_unwind(|| {
        let mut config = FeedConfig::default();
        if !url.is_null() {
            config = config.with_url(unsafe { str_arg(url) });
        }
        Box::into_raw(Box::new(FfiQuakeClient {
            inner: QuakeClient::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Like `quake_client_new` with explicit timeouts in milliseconds. A zero
/// timeout keeps the default.
#[unsafe(no_mangle)]
pub extern "C" fn quake_client_new_with_timeouts(
    url: *const c_char,
    connect_timeout_ms: u64,
    read_timeout_ms: u64,
) -> *mut FfiQuakeClient {
    catch_unwind(|| {
        let mut config = FeedConfig::default();
        if !url.is_null() {
            config = config.with_url(unsafe { str_arg(url) });
        }
        if connect_timeout_ms > 0 {
            config = config.with_connect_timeout(Duration::from_millis(connect_timeout_ms));
        }
        if read_timeout_ms > 0 {
            config = config.with_read_timeout(Duration::from_millis(read_timeout_ms));
        }
        Box::into_raw(Box::new(FfiQuakeClient {
            inner: QuakeClient::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_client_free(client: *mut FfiQuakeClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Host-does-IO
// ---------------------------------------------------------------------------

/// Describe the feed request for a host that performs HTTP itself.
///
/// Returns null if `client` is null. Free with `quake_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_build_request(client: *const FfiQuakeClient) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_request())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Parse the host's response to the feed request.
#[unsafe(no_mangle)]
pub extern "C" fn quake_parse_response(
    client: *const FfiQuakeClient,
    response: *const FfiHttpResponse,
) -> *mut FfiRecordResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiRecordResult::null_arg("client");
        }
        if response.is_null() {
            return FfiRecordResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { str_arg(resp.body) }.to_string()
        };
        let core_resp = HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body,
        };
        FfiRecordResult::from_outcome(client.inner.parse_response(core_resp))
    }))
    .unwrap_or_else(|_| FfiRecordResult::panic("panic in quake_parse_response"))
}

/// Parse raw feed text. Null text is treated as empty.
#[unsafe(no_mangle)]
pub extern "C" fn quake_parse_json(text: *const c_char) -> *mut FfiRecordResult {
    catch_unwind(|| {
        if text.is_null() {
            return FfiRecordResult::from_error(FeedError::EmptyBody);
        }
        FfiRecordResult::from_outcome(parse_record(unsafe { str_arg(text) }))
    })
    .unwrap_or_else(|_| FfiRecordResult::panic("panic in quake_parse_json"))
}

// ---------------------------------------------------------------------------
// Rust-does-IO
// ---------------------------------------------------------------------------

/// Blocking GET of `url` with the client's timeouts.
///
/// Returns the body of a 200 response, or an empty string for a null or
/// malformed URL and for any network or status failure. Returns null only
/// if `client` is null. Free with `quake_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_text(
    client: *const FfiQuakeClient,
    url: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        if url.is_null() {
            return to_c_string("");
        }
        let client = unsafe { &*client };
        to_c_string(client.inner.fetcher().fetch(unsafe { str_arg(url) }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Blocking fetch and parse of the client's feed URL.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_record(client: *const FfiQuakeClient) -> *mut FfiRecordResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiRecordResult::null_arg("client");
        }
        let client = unsafe { &*client };
        FfiRecordResult::from_outcome(client.inner.try_fetch_record())
    }))
    .unwrap_or_else(|_| FfiRecordResult::panic("panic in quake_fetch_record"))
}

/// Start a background fetch. `callback` runs once on the worker thread with
/// the result unless the task is cancelled or freed first.
///
/// Returns null if `client` or `callback` is null. Release the handle with
/// `quake_fetch_join` or `quake_fetch_task_free`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_start(
    client: *const FfiQuakeClient,
    callback: Option<QuakeFetchCallback>,
    user_data: *mut c_void,
) -> *mut FfiFetchTask {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client }.inner.clone();
        let data = UserData(user_data);
        let task = spawn_fetch(client, CancellationToken::new(), move |outcome| {
            let data = data;
            callback(FfiRecordResult::from_outcome(outcome), data.0);
        });
        Box::into_raw(Box::new(FfiFetchTask { inner: task }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Cancel the task. If the callback is running on the worker this blocks
/// until it returns; afterwards the callback never runs. Calling it from
/// inside the callback does not block. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_cancel(task: *const FfiFetchTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*task }.inner.cancel()));
    }
}

/// Wait for the task to finish and free the handle. Returns false if the
/// worker panicked or `task` is null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_join(task: *mut FfiFetchTask) -> bool {
    if task.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let task = unsafe { Box::from_raw(task) };
        task.inner.join()
    }))
    .unwrap_or(false)
}

/// Cancel the task (see `quake_fetch_cancel`) and free the handle without
/// waiting for the fetch itself. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_fetch_task_free(task: *mut FfiFetchTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let task = unsafe { Box::from_raw(task) };
            task.inner.cancel();
        }));
    }
}

// ---------------------------------------------------------------------------
// Display strings
// ---------------------------------------------------------------------------

/// Text for a tsunami flag. Free with `quake_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_alert_text(alert_level: i32) -> *mut c_char {
    catch_unwind(|| to_c_string(alert_text(alert_level))).unwrap_or(std::ptr::null_mut())
}

/// Event time rendered in UTC, or an empty string if out of range.
/// Free with `quake_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn quake_format_time(occurred_at_millis: i64) -> *mut c_char {
    catch_unwind(|| to_c_string(format_time(occurred_at_millis).unwrap_or_default()))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request from `quake_build_request`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free a result from any parse or fetch function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_free_result(result: *mut FfiRecordResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.record.is_null() {
            let record = unsafe { Box::from_raw(result.record) };
            if !record.title.is_null() {
                drop(unsafe { CString::from_raw(record.title) });
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn quake_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
