//! Credentials and how they are attached to a request.

use base64::prelude::*;
use secrecy::{ExposeSecret as _, SecretString};

use crate::error::ApiError;
use crate::options::AuthMethod;

/// Query parameter carrying the bearer token under query-string auth.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
pub const USERNAME_PARAM: &str = "username";
pub const PASSWORD_PARAM: &str = "password";

/// API credentials. Secrets are redacted from `Debug` output.
#[derive(Debug)]
pub enum Credentials {
    Bearer { token: SecretString },
    Basic { username: String, password: SecretString },
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: SecretString::from(token.into()),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Credentials::Bearer { .. } => AuthMethod::Bearer,
            Credentials::Basic { .. } => AuthMethod::Basic,
        }
    }

    /// Reject credentials that are empty or do not fit `method`.
    pub(crate) fn validate_for(&self, method: AuthMethod) -> Result<(), ApiError> {
        if self.method() != method {
            return Err(ApiError::configuration(format!(
                "{} credentials cannot be used with auth_method {method}",
                self.method()
            )));
        }
        match self {
            Credentials::Bearer { token } if token.expose_secret().is_empty() => {
                Err(ApiError::configuration("bearer token is empty"))
            }
            Credentials::Basic { username, .. } if username.is_empty() => {
                Err(ApiError::configuration("basic auth username is empty"))
            }
            _ => Ok(()),
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn header_value(&self) -> String {
        match self {
            Credentials::Bearer { token } => format!("Bearer {}", token.expose_secret()),
            Credentials::Basic { username, password } => {
                let pair = format!("{username}:{}", password.expose_secret());
                format!("Basic {}", BASE64_STANDARD.encode(pair.as_bytes()))
            }
        }
    }

    /// Raw (unencoded) query pairs; the URL serializer encodes them.
    pub(crate) fn query_pairs(&self) -> Vec<(&str, &str)> {
        match self {
            Credentials::Bearer { token } => vec![(ACCESS_TOKEN_PARAM, token.expose_secret())],
            Credentials::Basic { username, password } => vec![
                (USERNAME_PARAM, username.as_str()),
                (PASSWORD_PARAM, password.expose_secret()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        assert_eq!(Credentials::bearer("tok123").header_value(), "Bearer tok123");
    }

    #[test]
    fn basic_header_is_base64_of_user_colon_pass() {
        let header = Credentials::basic("admin", "secret").header_value();
        assert_eq!(header, "Basic YWRtaW46c2VjcmV0");
        let decoded = BASE64_STANDARD.decode(&header[6..]).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "admin:secret");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let debug = format!("{:?}", Credentials::basic("admin", "hunter2"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
        assert!(!format!("{:?}", Credentials::bearer("tok123")).contains("tok123"));
    }

    #[test]
    fn mismatched_method_is_a_configuration_error() {
        let err = Credentials::bearer("tok").validate_for(AuthMethod::Basic).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        let err = Credentials::basic("u", "p").validate_for(AuthMethod::Bearer).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn empty_token_or_username_is_rejected() {
        assert!(Credentials::bearer("").validate_for(AuthMethod::Bearer).is_err());
        assert!(Credentials::basic("", "p").validate_for(AuthMethod::Basic).is_err());
        assert!(Credentials::basic("u", "").validate_for(AuthMethod::Basic).is_ok());
    }

    #[test]
    fn query_pairs_use_wire_parameter_names() {
        let basic = Credentials::basic("ad min", "p&w");
        assert_eq!(
            basic.query_pairs(),
            vec![("username", "ad min"), ("password", "p&w")]
        );
        assert_eq!(
            Credentials::bearer("abc").query_pairs(),
            vec![("access_token", "abc")]
        );
    }
}
