//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use quake_core::{FeedError, HttpMethod, HttpRequest, QuakeClient, Record};

/// Opaque handle to a `QuakeClient`.
pub struct FfiQuakeClient {
    pub(crate) inner: QuakeClient,
}

/// Opaque handle to a running background fetch.
pub struct FfiFetchTask {
    pub(crate) inner: quake_core::FetchTask,
}

/// Called once from the worker thread when a background fetch completes and
/// was not cancelled. The callee owns `result` and must release it with
/// `quake_free_result`.
pub type QuakeFetchCallback = extern "C" fn(result: *mut FfiRecordResult, user_data: *mut c_void);

/// Host pointer carried to the worker thread untouched.
pub(crate) struct UserData(pub(crate) *mut c_void);

// The pointer is never dereferenced on the Rust side; thread-safety of the
// pointee is the host's contract with its own callback.
unsafe impl Send for UserData {}

/// Lossy `String` to owned C string; interior NULs are stripped.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The feed request as C-compatible plain data.
///
/// Built by `quake_build_request`. The host executes it and passes the
/// response back through `quake_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

/// Caller-owned response. The FFI layer reads but never frees these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Why no record is available. Hosts show a blank screen for every
/// non-`Ok` code; the distinction is for logs and tests.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Empty = 1,
    NoFeatures = 2,
    MalformedUrl = 3,
    Network = 4,
    HttpStatus = 5,
    Json = 6,
    Panic = 7,
    NullArg = 8,
}

#[repr(C)]
pub struct FfiRecord {
    pub title: *mut c_char,
    pub occurred_at_millis: i64,
    pub alert_level: i32,
}

/// Result envelope for parse and fetch operations.
///
/// On success `error_code` is `Ok`, `error_message` is null and `record`
/// is non-null. On failure `record` is null and `error_message` describes
/// the failure. `http_status` is non-zero only for `HttpStatus`.
#[repr(C)]
pub struct FfiRecordResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub record: *mut FfiRecord,
}

impl FfiRecordResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        record: *mut FfiRecord,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiRecordResult {
            error_code,
            error_message,
            http_status,
            record,
        }))
    }

    pub(crate) fn from_outcome(outcome: Result<Record, FeedError>) -> *mut Self {
        match outcome {
            Ok(record) => Self::ok(record),
            Err(err) => Self::from_error(err),
        }
    }

    pub(crate) fn ok(record: Record) -> *mut Self {
        let ffi_record = Box::new(FfiRecord {
            title: to_c_string(record.title()),
            occurred_at_millis: record.occurred_at_millis(),
            alert_level: record.alert_level(),
        });
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, Box::into_raw(ffi_record))
    }

    pub(crate) fn from_error(err: FeedError) -> *mut Self {
        let (code, status) = match &err {
            FeedError::EmptyBody => (FfiErrorCode::Empty, 0),
            FeedError::NoFeatures => (FfiErrorCode::NoFeatures, 0),
            FeedError::MalformedUrl { .. } => (FfiErrorCode::MalformedUrl, 0),
            FeedError::Network(_) => (FfiErrorCode::Network, 0),
            FeedError::HttpStatus { status } => (FfiErrorCode::HttpStatus, *status),
            FeedError::Json(_) => (FfiErrorCode::Json, 0),
        };
        Self::boxed(code, to_c_string(err.to_string()), status, std::ptr::null_mut())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            to_c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, to_c_string(msg), 0, std::ptr::null_mut())
    }
}
