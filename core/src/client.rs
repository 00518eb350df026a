//! Verb-level client for the dashboard REST API.
//!
//! # Design
//! `DashboardClient` pairs a stateless `RequestBuilder` with a `Transport`.
//! Each verb builds exactly one `HttpRequest`, hands it to the transport
//! once, and normalizes the response with `parse_response`. Callers that do
//! their own I/O can skip the transport entirely: take the builder from
//! `request_builder()`, execute the request themselves, and feed the result
//! to `parse_response`.

use serde::Serialize;

use crate::auth::Credentials;
use crate::builder::RequestBuilder;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::ClientOptions;
use crate::transport::Transport;
use crate::types::{ApiResponse, WpErrorBody};

/// Version of this client library.
pub const CLIENT_VERSION: &str = "5.0.0";

/// Synchronous client for one dashboard site.
#[derive(Debug)]
pub struct DashboardClient<T: Transport> {
    builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> DashboardClient<T> {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        options: &ClientOptions,
        transport: T,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            builder: RequestBuilder::new(base_url, credentials, options)?,
            transport,
        })
    }

    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        self.dispatch(self.builder.build_get(endpoint, query)?)
    }

    pub fn post<B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(self.builder.build_post(endpoint, body)?)
    }

    pub fn put<B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(self.builder.build_put(endpoint, body)?)
    }

    pub fn delete(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        self.dispatch(self.builder.build_delete(endpoint, query)?)
    }

    pub fn options(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.dispatch(self.builder.build_options(endpoint)?)
    }

    /// General form of the verb methods.
    pub fn request<B>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(self.builder.build(endpoint, method, body, query)?)
    }

    fn dispatch(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        // Only the path is logged: the query may carry credentials.
        tracing::debug!(
            method = %request.method,
            path = %request_path(&request.url),
            "dispatching request"
        );
        let response = self.transport.execute(&request)?;
        parse_response(response)
    }
}

#[cfg(feature = "ureq-transport")]
impl DashboardClient<crate::transport::UreqTransport> {
    /// Client backed by the blocking ureq transport.
    pub fn with_ureq(
        base_url: &str,
        credentials: Option<Credentials>,
        options: &ClientOptions,
    ) -> Result<Self, ApiError> {
        Self::new(
            base_url,
            credentials,
            options,
            crate::transport::UreqTransport::new(),
        )
    }
}

fn request_path(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Normalize a raw transport response.
///
/// 2xx responses yield their JSON body (`null` when empty). Other statuses
/// become errors, using the WordPress error envelope when the body has one.
pub fn parse_response(response: HttpResponse) -> Result<ApiResponse, ApiError> {
    if !(200..300).contains(&response.status) {
        return Err(status_error(response));
    }
    let body = if response.body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?
    };
    Ok(ApiResponse {
        status: response.status,
        headers: response.headers,
        body,
    })
}

/// Map a non-success status code to the appropriate `ApiError` variant.
fn status_error(response: HttpResponse) -> ApiError {
    let envelope: Option<WpErrorBody> = serde_json::from_str(&response.body).ok();
    let (code, message) = match envelope {
        Some(e) => (e.code, e.message),
        None => (String::new(), response.body.trim().to_string()),
    };

    match response.status {
        401 | 403 => ApiError::Unauthorized {
            status: response.status,
            message,
        },
        404 => ApiError::NotFound { message },
        status => ApiError::Http {
            status,
            code,
            message,
            body: response.body,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::error::TransportError;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    /// Transport that records every request and replies with a fixed response.
    #[derive(Debug)]
    struct Recorder {
        seen: Mutex<Vec<HttpRequest>>,
        reply: HttpResponse,
    }

    impl Recorder {
        fn new(reply: HttpResponse) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn client(options: ClientOptions, reply: HttpResponse) -> DashboardClient<Recorder> {
        DashboardClient::new(
            "https://shop.test",
            Some(Credentials::bearer("tok123")),
            &options,
            Recorder::new(reply),
        )
        .unwrap()
    }

    #[test]
    fn get_dispatches_once_and_parses_json() {
        let c = client(ClientOptions::new(), response(200, r#"[{"id":1}]"#));
        let resp = c.get("sites", &[("status", "connected")]).unwrap();
        assert_eq!(resp.body, json!([{"id": 1}]));

        let seen = c.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://shop.test/wp-json/v2/sites?status=connected");
    }

    #[test]
    fn each_verb_reaches_the_transport_with_its_method() {
        let c = client(ClientOptions::new(), response(200, "{}"));
        c.get("a", &[]).unwrap();
        c.post("a", &json!({})).unwrap();
        c.put("a", &json!({})).unwrap();
        c.delete("a", &[]).unwrap();
        c.options("a").unwrap();

        let methods: Vec<HttpMethod> = c
            .transport
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Get,
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Delete,
                HttpMethod::Options
            ]
        );
    }

    #[test]
    fn override_is_applied_before_dispatch() {
        let c = client(
            ClientOptions::new().method_override_header(true),
            response(200, "{}"),
        );
        c.delete("sites/1", &[]).unwrap();
        let seen = c.transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].header("X-HTTP-Method-Override"), Some("DELETE"));
    }

    #[test]
    fn configuration_errors_never_reach_the_transport() {
        let err = DashboardClient::new(
            "not a url",
            None,
            &ClientOptions::new(),
            Recorder::new(response(200, "{}")),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn transport_errors_surface_unchanged() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError::Timeout)
        };
        let c = DashboardClient::new("https://shop.test", None, &ClientOptions::new(), transport)
            .unwrap();
        let err = c.get("sites", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Timeout)));
    }

    #[test]
    fn parse_success_with_empty_body_is_null() {
        let resp = parse_response(response(204, "")).unwrap();
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_null());
    }

    #[test]
    fn parse_success_bad_json() {
        let err = parse_response(response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_unauthorized_uses_wp_envelope() {
        let body = r#"{"code":"rest_forbidden","message":"Sorry, you are not allowed to do that.","data":{"status":401}}"#;
        let err = parse_response(response(401, body)).unwrap_err();
        match err {
            ApiError::Unauthorized { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Sorry, you are not allowed to do that.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_not_found() {
        let body = r#"{"code":"rest_no_route","message":"No route was found"}"#;
        let err = parse_response(response(404, body)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { message } if message == "No route was found"));
    }

    #[test]
    fn parse_server_error_keeps_raw_body() {
        let err = parse_response(response(502, "bad gateway")).unwrap_err();
        match err {
            ApiError::Http {
                status,
                code,
                message,
                body,
            } => {
                assert_eq!(status, 502);
                assert!(code.is_empty());
                assert_eq!(message, "bad gateway");
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(feature = "ureq-transport")]
    #[test]
    fn ureq_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DashboardClient<crate::transport::UreqTransport>>();
    }

    #[test]
    fn client_dispatches_from_many_threads() {
        let c = client(ClientOptions::new(), response(200, "{}"));
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| c.get("sites", &[]).unwrap());
            }
        });
        assert_eq!(c.transport.seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn request_path_strips_query() {
        assert_eq!(
            request_path("https://shop.test/wp-json/v2/sites?access_token=abc"),
            "https://shop.test/wp-json/v2/sites"
        );
        assert_eq!(request_path("https://shop.test/"), "https://shop.test/");
    }
}
