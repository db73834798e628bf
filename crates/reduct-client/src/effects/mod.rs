//! I/O operations: transport, token refresh, queries and the bucket API.
//!
//! Everything that touches the network lives here. Decisions about what a
//! status or header means are delegated to [`crate::core`].

mod auth;
mod bucket;
mod client;
mod credential;
mod http;
mod mock;
mod query;
mod record;
mod response;

pub use auth::{AUTHORIZATION, AuthRetryInterceptor};
pub use bucket::Bucket;
pub use client::Client;
pub use credential::Credential;
pub use http::{BoxStream, HttpClient, HttpRequest, HttpResponse, Method};
pub use mock::{MockError, MockHttpClient, MockResponse};
pub use query::{QuerySession, QueryState};
pub use record::Record;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
