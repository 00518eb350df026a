//! C-ABI wrapper around `mainwp-core`.
//!
//! # Overview
//! Exposes request building and response normalization through `extern "C"`
//! functions so any language with a C FFI can talk to a dashboard using its
//! own HTTP stack. The library never performs I/O: the caller executes each
//! `FfiHttpRequest` and hands the raw response back.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Bodies and query parameters cross the boundary as JSON strings; the
//!   normalized response body comes back as a JSON string in `FfiResult`.
//! - The C caller owns all returned pointers and must call the matching
//!   `mainwp_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use mainwp_core::{
    parse_response, ApiError, AuthMethod, ClientOptions, Credentials, HttpMethod, HttpRequest,
    RequestBuilder,
};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, ApiError> {
    if ptr.is_null() {
        return Err(ApiError::Configuration(format!("null argument: {name}")));
    }
    unsafe { borrow_str(ptr) }
        .ok_or_else(|| ApiError::Configuration(format!("{name} is not valid UTF-8")))
}

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn optional_str<'a>(ptr: *const c_char, name: &str) -> Result<Option<&'a str>, ApiError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { required_str(ptr, name) }.map(Some)
}

/// Accepts either a JSON object (`{"page": 2}`, keys in sorted order) or an
/// array of pairs (`[["page", "2"]]`, order kept). Non-string values are
/// rendered as JSON text.
fn parse_query(raw: &str) -> Result<Vec<(String, String)>, ApiError> {
    let invalid = || {
        ApiError::Configuration("query_json must be an object or an array of pairs".into())
    };
    let scalar = |v: Value| match v {
        Value::String(s) => s,
        other => other.to_string(),
    };

    match serde_json::from_str::<Value>(raw).map_err(|_| invalid())? {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, scalar(v))).collect()),
        Value::Array(items) => items
            .into_iter()
            .map(|pair| match pair {
                Value::Array(kv) if kv.len() == 2 => {
                    let mut kv = kv.into_iter();
                    match (kv.next(), kv.next()) {
                        (Some(Value::String(k)), Some(v)) => Ok((k, scalar(v))),
                        _ => Err(invalid()),
                    }
                }
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

fn new_client(
    base_url: &str,
    credentials: Option<Credentials>,
    options: ClientOptions,
) -> *mut FfiDashboardClient {
    match RequestBuilder::new(base_url, credentials, &options) {
        Ok(inner) => Box::into_raw(Box::new(FfiDashboardClient { inner })),
        Err(_) => std::ptr::null_mut(),
    }
}

/// # Safety
/// `options_json` must be null or a valid NUL-terminated string.
unsafe fn read_options(options_json: *const c_char) -> Result<ClientOptions, ApiError> {
    match unsafe { optional_str(options_json, "options_json") }? {
        Some(raw) => ClientOptions::from_json(raw),
        None => Ok(ClientOptions::new()),
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`, authenticating with a bearer
/// `token`. `token` and `options_json` may be null.
///
/// Returns null if `base_url` is null, the options do not parse, or the
/// configuration is rejected. The caller must free the returned pointer
/// with `mainwp_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_client_new(
    base_url: *const c_char,
    token: *const c_char,
    options_json: *const c_char,
) -> *mut FfiDashboardClient {
    catch_unwind(|| {
        let (Ok(url), Ok(token), Ok(options)) = (
            unsafe { required_str(base_url, "base_url") },
            unsafe { optional_str(token, "token") },
            unsafe { read_options(options_json) },
        ) else {
            return std::ptr::null_mut();
        };
        new_client(url, token.map(Credentials::bearer), options)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client that authenticates with HTTP Basic credentials.
/// `auth_method` is forced to `basic` whatever `options_json` says.
///
/// Returns null if any required argument is null or the configuration is
/// rejected.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_client_new_basic(
    base_url: *const c_char,
    username: *const c_char,
    password: *const c_char,
    options_json: *const c_char,
) -> *mut FfiDashboardClient {
    catch_unwind(|| {
        let (Ok(url), Ok(username), Ok(password), Ok(options)) = (
            unsafe { required_str(base_url, "base_url") },
            unsafe { required_str(username, "username") },
            unsafe { required_str(password, "password") },
            unsafe { read_options(options_json) },
        ) else {
            return std::ptr::null_mut();
        };
        new_client(
            url,
            Some(Credentials::basic(username, password)),
            options.auth_method(AuthMethod::Basic),
        )
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `mainwp_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_client_free(client: *mut FfiDashboardClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// # Safety
/// Every pointer must be null or a valid NUL-terminated string.
unsafe fn build_request(
    client: &FfiDashboardClient,
    method: *const c_char,
    endpoint: *const c_char,
    body_json: *const c_char,
    query_json: *const c_char,
) -> Result<HttpRequest, ApiError> {
    let method: HttpMethod = unsafe { required_str(method, "method") }?.parse()?;
    let endpoint = unsafe { required_str(endpoint, "endpoint") }?;
    let body = unsafe { optional_str(body_json, "body_json") }?
        .map(|raw| {
            serde_json::from_str::<Value>(raw).map_err(|e| ApiError::Serialization(e.to_string()))
        })
        .transpose()?;
    let query = match unsafe { optional_str(query_json, "query_json") }? {
        Some(raw) => parse_query(raw)?,
        None => Vec::new(),
    };
    let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    client.inner.build(endpoint, method, body.as_ref(), &query)
}

/// Build the request for `method` (`"GET"`, `"post"`, ...) on `endpoint`.
///
/// `body_json` is only sent for POST and PUT. `query_json` is used for the
/// other verbs. Both may be null.
///
/// Returns null if `client`, `method`, or `endpoint` is null, or if the
/// method, body, or query is rejected. The caller must free the returned
/// pointer with `mainwp_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_build_request(
    client: *const FfiDashboardClient,
    method: *const c_char,
    endpoint: *const c_char,
    body_json: *const c_char,
    query_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match unsafe { build_request(client, method, endpoint, body_json, query_json) } {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Normalize a response the caller obtained by executing a built request.
///
/// Never returns null. The caller must free the result with
/// `mainwp_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_parse_response(
    client: *const FfiDashboardClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        match parse_response(resp.to_core()) {
            Ok(parsed) => FfiResult::ok(parsed),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in mainwp_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `mainwp_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        mainwp_free_string(req.url);
        mainwp_free_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                mainwp_free_string(h.key);
                mainwp_free_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by `mainwp_parse_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        mainwp_free_string(result.error_message);
        mainwp_free_string(result.body);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mainwp_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
