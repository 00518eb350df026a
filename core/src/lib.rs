//! Synchronous client core for the MainWP Dashboard REST API.
//!
//! # Overview
//! Resolves client options, builds fully specified `HttpRequest` values
//! (URL, effective verb, headers, JSON body, transport hints), and
//! normalizes `HttpResponse` values into `ApiResponse`. Executing a request
//! is delegated to a `Transport`, or to the caller (host-does-IO pattern).
//!
//! # Design
//! - `OptionsResolver` applies every documented default once, at
//!   construction; nothing is looked up ad hoc afterwards.
//! - `RequestBuilder` is stateless: the same inputs always produce the same
//!   request, so it can be shared across threads freely.
//! - Method override and query-string auth are decided inside `build`, so a
//!   transport only ever sees the final wire form.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//!
//! ```no_run
//! use mainwp_core::{ClientOptions, Credentials, DashboardClient};
//!
//! let client = DashboardClient::with_ureq(
//!     "https://dashboard.example.com",
//!     Some(Credentials::bearer("token")),
//!     &ClientOptions::new().timeout(10),
//! )?;
//! let sites = client.get("sites", &[("status", "connected")])?;
//! println!("{}", sites.body);
//! # Ok::<(), mainwp_core::ApiError>(())
//! ```

pub mod auth;
pub mod builder;
pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use builder::RequestBuilder;
pub use client::{parse_response, DashboardClient, CLIENT_VERSION};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportHints};
pub use options::{AuthMethod, ClientOptions, OptionKey, OptionsResolver};
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use transport::Transport;
pub use types::{ApiResponse, WpErrorBody};
