//! Immutable configuration and wire types.
//!
//! Nothing in this module performs I/O; values are built by callers or
//! decoded from server responses and passed down to the effect layer.

pub mod headers;
pub mod info;
pub mod options;

pub use headers::Headers;
pub use info::{BucketInfo, BucketSettings, EntryInfo, QuotaType, ServerInfo};
pub use options::{ClientOptions, NoDataPolicy, QueryOptions};
