//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use mainwp_core::{ApiError, ApiResponse, HttpMethod, HttpRequest, HttpResponse, RequestBuilder};

/// Opaque handle to a configured `RequestBuilder`. C callers receive a
/// pointer to this and pass it back into every FFI function.
pub struct FfiDashboardClient {
    pub(crate) inner: RequestBuilder,
}

/// Copy a Rust string into a heap-allocated C string. Interior NULs cannot
/// be represented and yield an empty string.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Options = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `mainwp_build_request`. `method` is the verb to put on the wire
/// (POST for masked verbs). The transport fields carry the hints the caller
/// must honor while executing the request.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_secs: u64,
    pub verify_ssl: bool,
    pub follow_redirects: bool,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = into_c_string(req.url);
        let body = match req.body {
            Some(b) => into_c_string(b),
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
                    key: into_c_string(k),
                    value: into_c_string(v),
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
            timeout_secs: req.hints.timeout.as_secs(),
            verify_ssl: req.hints.verify_ssl,
            follow_redirects: req.hints.follow_redirects,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request, then passes a
/// pointer to `mainwp_parse_response`. The FFI layer reads but does not free
/// these fields. `headers` may be null when `headers_len` is 0.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    /// Copy the caller's response into a core `HttpResponse`. A null body
    /// reads as empty; headers that are null or not UTF-8 are skipped.
    pub(crate) fn to_core(&self) -> HttpResponse {
        let body = unsafe { borrow_str(self.body) }
            .unwrap_or_default()
            .to_string();

        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            let raw = unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            raw.iter()
                .filter_map(|h| {
                    let key = unsafe { borrow_str(h.key) }?;
                    let value = unsafe { borrow_str(h.value) }?;
                    Some((key.to_string(), value.to_string()))
                })
                .collect()
        };

        HttpResponse {
            status: self.status,
            headers,
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Configuration = 1,
    Serialization = 2,
    Deserialization = 3,
    NotFound = 4,
    Unauthorized = 5,
    Http = 6,
    Transport = 7,
    Panic = 8,
    NullArg = 9,
}

/// Result envelope for `mainwp_parse_response`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `body` is
/// the normalized JSON body (`null` for an empty response). On failure
/// `error_code` describes the category and `error_message` is a
/// human-readable C string; for `Http` errors `body` holds the raw response
/// body, otherwise it is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        body: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message,
            http_status,
            body,
        }))
    }

    /// Build a success result carrying the normalized body.
    pub(crate) fn ok(response: ApiResponse) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            response.status,
            into_c_string(response.body.to_string()),
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let message = into_c_string(err.to_string());
        let status = err.status().unwrap_or(0);
        let (error_code, body) = match err {
            ApiError::Configuration(_) => (FfiErrorCode::Configuration, std::ptr::null_mut()),
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, std::ptr::null_mut()),
            ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, std::ptr::null_mut()),
            ApiError::NotFound { .. } => (FfiErrorCode::NotFound, std::ptr::null_mut()),
            ApiError::Unauthorized { .. } => (FfiErrorCode::Unauthorized, std::ptr::null_mut()),
            ApiError::Http { body, .. } => (FfiErrorCode::Http, into_c_string(body)),
            ApiError::Transport(_) => (FfiErrorCode::Transport, std::ptr::null_mut()),
        };
        Self::boxed(error_code, message, status, body)
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            into_c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            into_c_string(msg),
            0,
            std::ptr::null_mut(),
        )
    }
}
