//! Client configuration and its resolution to concrete values.
//!
//! # Design
//! `ClientOptions` is the raw, user-supplied configuration: every recognized
//! key is optional and nothing is defaulted yet. `OptionsResolver` applies
//! the documented defaults once, at construction, and afterwards only hands
//! out the resolved values. Both are immutable after construction, so a
//! resolver can be shared across threads freely.
//!
//! Parsing is strict: a value of the wrong JSON type fails with
//! `ApiError::Configuration` instead of being coerced. The one exception is
//! `auth_method`, which is kept raw because its resolution is an allow-list
//! (anything but the exact string `"basic"` means bearer).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::TransportHints;

/// API version used when `version` is not set.
pub const DEFAULT_VERSION: &str = "v2";

/// Request timeout in seconds used when `timeout` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// WordPress REST API prefix, including leading and trailing slashes.
pub const WP_API_PREFIX: &str = "/wp-json/";

/// `User-Agent` sent when `user_agent` is not set. Carries no version number.
pub const DEFAULT_USER_AGENT: &str = "MainWP Dashboard API Client-Rust";

/// User-supplied configuration. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    version: Option<String>,
    verify_ssl: Option<bool>,
    auth_method: Option<Value>,
    timeout: Option<u64>,
    query_string_auth: Option<bool>,
    extension_api: Option<String>,
    user_agent: Option<String>,
    follow_redirects: Option<bool>,
    method_override_header: Option<bool>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a flat JSON object.
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ApiError::configuration(format!("options are not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse options from an already decoded JSON value, which must be an
    /// object (or `null`, meaning no options).
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| ApiError::configuration(format!("invalid option value: {e}"))),
            other => Err(ApiError::configuration(format!(
                "options must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Accepts any JSON value; only the exact string `"basic"` selects basic
    /// auth when resolved.
    pub fn auth_method(mut self, method: impl Into<Value>) -> Self {
        self.auth_method = Some(method.into());
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn query_string_auth(mut self, enabled: bool) -> Self {
        self.query_string_auth = Some(enabled);
        self
    }

    pub fn extension_api(mut self, prefix: impl Into<String>) -> Self {
        self.extension_api = Some(prefix.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    pub fn method_override_header(mut self, enabled: bool) -> Self {
        self.method_override_header = Some(enabled);
        self
    }
}

/// How credentials are attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    #[default]
    Bearer,
    Basic,
}

impl AuthMethod {
    /// Strict allow-list: `Basic` only for the exact string `"basic"`.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw {
            Some(Value::String(s)) if s == "basic" => AuthMethod::Basic,
            _ => AuthMethod::Bearer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::Bearer => "bearer",
            AuthMethod::Basic => "basic",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AuthMethod> for Value {
    fn from(method: AuthMethod) -> Self {
        Value::String(method.as_str().to_string())
    }
}

/// Names of the recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Version,
    VerifySsl,
    AuthMethod,
    Timeout,
    QueryStringAuth,
    ExtensionApi,
    UserAgent,
    FollowRedirects,
    MethodOverrideHeader,
}

impl OptionKey {
    pub const ALL: [OptionKey; 9] = [
        OptionKey::Version,
        OptionKey::VerifySsl,
        OptionKey::AuthMethod,
        OptionKey::Timeout,
        OptionKey::QueryStringAuth,
        OptionKey::ExtensionApi,
        OptionKey::UserAgent,
        OptionKey::FollowRedirects,
        OptionKey::MethodOverrideHeader,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::Version => "version",
            OptionKey::VerifySsl => "verify_ssl",
            OptionKey::AuthMethod => "auth_method",
            OptionKey::Timeout => "timeout",
            OptionKey::QueryStringAuth => "query_string_auth",
            OptionKey::ExtensionApi => "extension_api",
            OptionKey::UserAgent => "user_agent",
            OptionKey::FollowRedirects => "follow_redirects",
            OptionKey::MethodOverrideHeader => "method_override_header",
        }
    }
}

impl FromStr for OptionKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ApiError::configuration(format!("unknown option: {s}")))
    }
}

/// Strip every trailing `/` and append exactly one. Empty input stays empty.
pub fn normalize_extension_prefix(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    format!("{}/", raw.trim_end_matches('/'))
}

/// Resolved, typed view over `ClientOptions` with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsResolver {
    version: String,
    verify_ssl: bool,
    auth_method: AuthMethod,
    timeout: Duration,
    query_string_auth: bool,
    extension_api_prefix: String,
    user_agent: String,
    follow_redirects: bool,
    method_override_header: bool,
}

impl OptionsResolver {
    pub fn new(options: &ClientOptions) -> Self {
        Self {
            version: options
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            verify_ssl: options.verify_ssl.unwrap_or(true),
            auth_method: AuthMethod::from_raw(options.auth_method.as_ref()),
            timeout: Duration::from_secs(options.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            query_string_auth: options.query_string_auth.unwrap_or(false),
            extension_api_prefix: normalize_extension_prefix(
                options.extension_api.as_deref().unwrap_or_default(),
            ),
            user_agent: options
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            follow_redirects: options.follow_redirects.unwrap_or(false),
            method_override_header: options.method_override_header.unwrap_or(false),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send credentials as query parameters instead of an `Authorization`
    /// header. Some hosts strip that header before it reaches WordPress.
    pub fn is_query_string_auth(&self) -> bool {
        self.query_string_auth
    }

    pub fn api_prefix(&self) -> &'static str {
        WP_API_PREFIX
    }

    /// Normalized `extension_api`, or empty when the default prefix applies.
    pub fn extension_api_prefix(&self) -> &str {
        &self.extension_api_prefix
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Mask every verb other than GET and POST as POST with an
    /// `X-HTTP-Method-Override` header.
    pub fn is_method_override_header(&self) -> bool {
        self.method_override_header
    }

    pub fn transport_hints(&self) -> TransportHints {
        TransportHints {
            timeout: self.timeout,
            verify_ssl: self.verify_ssl,
            follow_redirects: self.follow_redirects,
        }
    }

    /// Generic keyed lookup. Never fails: absent keys yield their default.
    pub fn resolve(&self, key: OptionKey) -> Value {
        match key {
            OptionKey::Version => Value::from(self.version.as_str()),
            OptionKey::VerifySsl => Value::from(self.verify_ssl),
            OptionKey::AuthMethod => Value::from(self.auth_method),
            OptionKey::Timeout => Value::from(self.timeout.as_secs()),
            OptionKey::QueryStringAuth => Value::from(self.query_string_auth),
            OptionKey::ExtensionApi => Value::from(self.extension_api_prefix.as_str()),
            OptionKey::UserAgent => Value::from(self.user_agent.as_str()),
            OptionKey::FollowRedirects => Value::from(self.follow_redirects),
            OptionKey::MethodOverrideHeader => Value::from(self.method_override_header),
        }
    }
}

impl Default for OptionsResolver {
    fn default() -> Self {
        Self::new(&ClientOptions::default())
    }
}
