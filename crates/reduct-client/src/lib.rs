//! Async client for ReductStore, a time-series object storage served over HTTP.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and wire types
//! - [`core`] - Pure transformations (auth state machine, header parsing, backoff)
//! - [`effects`] - I/O operations behind the [`HttpClient`] transport trait
//!
//! # Key Features
//!
//! - **Streamed queries**: [`QuerySession`] polls one record at a time and hands
//!   out its body as a live stream, never buffering more than one record
//! - **Transparent token refresh**: [`AuthRetryInterceptor`] refreshes an expired
//!   access token once and replays the request once, with no retry loops
//! - **Shared credential**: a refreshed token is seen by every later request
//!
//! # Example
//!
//! ```no_run
//! use reduct_client::{Client, ClientOptions, QueryOptions};
//!
//! # async fn run() -> reduct_client::Result<()> {
//! let client = Client::new("http://127.0.0.1:8383", ClientOptions::default())?;
//! let bucket = client.get_or_create_bucket("sensors", None).await?;
//! bucket.write("temp", "21.5", Some(1_000)).await?;
//!
//! let mut query = bucket.query("temp", QueryOptions::default().start(0)).await?;
//! while let Some(record) = query.next().await? {
//!     println!("{} -> {:?}", record.timestamp(), record.bytes().await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::retry_delay;
pub use data::{
    BucketInfo, BucketSettings, ClientOptions, EntryInfo, Headers, NoDataPolicy, QueryOptions,
    QuotaType, ServerInfo,
};
pub use effects::{
    AuthRetryInterceptor, BoxStream, Bucket, Client, Credential, HttpClient, HttpRequest,
    HttpResponse, Method, MockError, MockHttpClient, MockResponse, QuerySession, QueryState,
    Record,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{BoxError, Error, Result};
