//! Core layer: pure transformations with no I/O.

pub mod auth;
pub mod paths;
pub mod record;
pub mod retry;

pub use auth::{AuthState, Outcome, parse_access_token};
pub use record::{PollStatus, RecordMeta, classify_poll, error_message, parse_record_meta};
pub use retry::retry_delay;
