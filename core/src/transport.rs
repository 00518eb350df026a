//! Pluggable transport that executes built requests.
//!
//! The core never opens sockets itself. A `Transport` receives a fully
//! resolved `HttpRequest`, honors its `TransportHints` (timeout, TLS
//! verification, redirects), and returns status, headers and raw body.
//! Non-2xx statuses are data, not errors.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one `HttpRequest`. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq-transport")]
pub use ureq_transport::UreqTransport;
#[cfg(all(test, feature = "ureq-transport"))]
use ureq_transport::global_timeout;

#[cfg(feature = "ureq-transport")]
mod ureq_transport {
    use std::time::Duration;

    use ureq::http;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse, TransportHints};

    /// Redirect limit applied when `follow_redirects` is on.
    const MAX_REDIRECTS: u32 = 10;

    /// A zero timeout means no timeout, as with cURL.
    pub(super) fn global_timeout(timeout: Duration) -> Option<Duration> {
        (!timeout.is_zero()).then_some(timeout)
    }

    /// Blocking [`Transport`] backed by [`ureq`].
    ///
    /// An agent is configured from each request's hints, so a single
    /// `UreqTransport` serves clients with different options.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct UreqTransport;

    impl UreqTransport {
        pub fn new() -> Self {
            Self
        }

        fn agent(hints: &TransportHints) -> ureq::Agent {
            let tls = ureq::tls::TlsConfig::builder()
                .disable_verification(!hints.verify_ssl)
                .build();
            ureq::Agent::config_builder()
                .timeout_global(global_timeout(hints.timeout))
                .max_redirects(if hints.follow_redirects { MAX_REDIRECTS } else { 0 })
                .tls_config(tls)
                // Status codes are interpreted by `parse_response`.
                .http_status_as_error(false)
                .build()
                .new_agent()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let agent = Self::agent(&request.hints);

            let mut builder = http::Request::builder()
                .method(request.method.as_str())
                .uri(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let result = if let Some(body) = &request.body {
                let req = builder
                    .body(body.as_bytes().to_vec())
                    .map_err(|e| TransportError::Other(Box::new(e)))?;
                agent.run(req)
            } else {
                let req = builder
                    .body(())
                    .map_err(|e| TransportError::Other(Box::new(e)))?;
                agent.run(req)
            };

            match result {
                Ok(resp) => convert_response(resp),
                Err(ureq::Error::Timeout(_)) => Err(TransportError::Timeout),
                Err(ureq::Error::HostNotFound) => {
                    Err(TransportError::Connection("host not found".to_owned()))
                }
                Err(ureq::Error::Io(e)) => Err(TransportError::Connection(e.to_string())),
                Err(e) => Err(TransportError::Other(Box::new(e))),
            }
        }
    }

    fn convert_response(
        response: http::Response<ureq::Body>,
    ) -> Result<HttpResponse, TransportError> {
        let (parts, mut body) = response.into_parts();

        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = body
            .read_to_string()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        tracing::debug!(status = parts.status.as_u16(), "response received");

        Ok(HttpResponse {
            status: parts.status.as_u16(),
            headers,
            body,
        })
    }
}
