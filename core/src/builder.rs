//! Stateless assembly of fully resolved requests.
//!
//! # Design
//! `RequestBuilder` holds the validated base URL, the optional credentials
//! and the resolved options, and carries no mutable state between calls.
//! `build` is a pure function of its arguments and that configuration: it
//! produces an `HttpRequest` with the final URL, the verb actually sent, all
//! headers, the JSON body, and the transport hints. Executing it is the
//! caller's business.

use serde::Serialize;
use url::Url;

use crate::auth::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::options::{ClientOptions, OptionsResolver};

pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Builds `HttpRequest` values for one dashboard site.
#[derive(Debug)]
pub struct RequestBuilder {
    /// Validated absolute URL without trailing slash.
    base_url: String,
    credentials: Option<Credentials>,
    options: OptionsResolver,
}

impl RequestBuilder {
    /// Fails with `ApiError::Configuration` when `base_url` is not an
    /// absolute http(s) URL, carries a query or fragment, or when the
    /// credentials do not fit the resolved auth method.
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        options: &ClientOptions,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ApiError::configuration(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::configuration(format!(
                "base URL must use http or https, got {:?}",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ApiError::configuration("base URL has no host"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ApiError::configuration(
                "base URL must not carry a query string or fragment",
            ));
        }

        let options = OptionsResolver::new(options);
        if let Some(credentials) = &credentials {
            credentials.validate_for(options.auth_method())?;
        }

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            credentials,
            options,
        })
    }

    pub fn options(&self) -> &OptionsResolver {
        &self.options
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` + API prefix (or extension prefix) + version + endpoint,
    /// joined with exactly one `/` each. An empty endpoint yields the
    /// version root, which keeps its trailing slash.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let prefix = match self.options.extension_api_prefix() {
            "" => self.options.api_prefix(),
            extension => extension,
        };

        let mut raw = self.base_url.clone();
        for segment in [prefix, self.options.version()] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                raw.push('/');
                raw.push_str(segment);
            }
        }
        raw.push('/');
        raw.push_str(endpoint.trim_matches('/'));

        // The URL parser would resolve these and climb out of the API root.
        let appended = &raw[self.base_url.len()..];
        if appended.split(['/', '\\']).any(is_dot_segment) {
            return Err(ApiError::configuration(format!(
                "path {appended:?} must not contain `.` or `..` segments"
            )));
        }

        Url::parse(&raw)
            .map_err(|e| ApiError::configuration(format!("invalid endpoint {endpoint:?}: {e}")))
    }

    pub fn build_get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        self.build(endpoint, HttpMethod::Get, None::<&()>, query)
    }

    pub fn build_post<B>(&self, endpoint: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build(endpoint, HttpMethod::Post, Some(body), &[])
    }

    pub fn build_put<B>(&self, endpoint: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build(endpoint, HttpMethod::Put, Some(body), &[])
    }

    pub fn build_delete(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        self.build(endpoint, HttpMethod::Delete, None::<&()>, query)
    }

    pub fn build_options(&self, endpoint: &str) -> Result<HttpRequest, ApiError> {
        self.build(endpoint, HttpMethod::Options, None::<&()>, &[])
    }

    /// Assemble the request for `method` on `endpoint`.
    ///
    /// `query` is only used by GET, DELETE and OPTIONS; `body` only by POST
    /// and PUT. Query-string credentials are appended after `query` for
    /// every verb.
    pub fn build<B>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.endpoint_url(endpoint)?;
        let query_auth = self.options.is_query_string_auth();

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if !method.carries_body() {
            pairs.extend_from_slice(query);
        }
        if query_auth {
            if let Some(credentials) = &self.credentials {
                pairs.extend(credentials.query_pairs());
            }
        }
        // An empty serializer would still leave a bare `?` behind.
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let body = if method.carries_body() {
            body.map(serde_json::to_string)
                .transpose()
                .map_err(|e| ApiError::Serialization(e.to_string()))?
        } else {
            None
        };

        let mut headers = vec![(HEADER_ACCEPT.to_string(), JSON_MEDIA_TYPE.to_string())];
        if body.is_some() {
            headers.push((HEADER_CONTENT_TYPE.to_string(), JSON_MEDIA_TYPE.to_string()));
        }
        headers.push((
            HEADER_USER_AGENT.to_string(),
            self.options.user_agent().to_string(),
        ));
        if !query_auth {
            if let Some(credentials) = &self.credentials {
                headers.push((HEADER_AUTHORIZATION.to_string(), credentials.header_value()));
            }
        }

        let effective = if self.options.is_method_override_header() && !method.is_get_or_post() {
            headers.push((HEADER_METHOD_OVERRIDE.to_string(), method.as_str().to_string()));
            HttpMethod::Post
        } else {
            method
        };

        Ok(HttpRequest {
            method: effective,
            url: url.into(),
            headers,
            body,
            hints: self.options.transport_hints(),
        })
    }
}

/// `.` or `..`, including the percent-encoded forms the URL parser accepts.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
