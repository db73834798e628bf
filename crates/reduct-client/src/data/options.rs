use std::fmt;
use std::time::Duration;

/// Configuration for a [`Client`](crate::Client).
///
/// # Examples
///
/// ```
/// use reduct_client::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::default()
///     .api_token("my-api-token")
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Long-lived API token used only to obtain short-lived access tokens.
    ///
    /// When absent, authorization failures are surfaced as ordinary request
    /// errors and no refresh is ever attempted.
    ///
    /// Default: None
    pub api_token: Option<String>,

    /// Short-lived access token to start with.
    ///
    /// Installed into the shared credential at construction so the first
    /// request does not need a refresh round-trip.
    ///
    /// Default: None
    pub access_token: Option<String>,

    /// Per-request timeout applied by the transport.
    ///
    /// This also bounds how long a single record body may take to arrive.
    ///
    /// Default: None (no timeout)
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientOptions {
    /// Set the long-lived API token.
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set an initial short-lived access token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What a [`QuerySession`](crate::QuerySession) does when the server answers
/// a poll with "no data yet".
///
/// "No data yet" is distinct from exhaustion: the server keeps the query alive
/// until its TTL runs out, and more records may arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoDataPolicy {
    /// Return `Ok(None)` from `next()` but keep the session open.
    ///
    /// The caller may poll again later; [`is_exhausted`](crate::QuerySession::is_exhausted)
    /// stays `false`.
    #[default]
    End,

    /// Sleep and re-poll with exponential backoff.
    ///
    /// The delay before re-poll N (0-indexed) is `base_delay * 2^N`. After
    /// `max_attempts` re-polls without data, `next()` returns `Ok(None)` and
    /// the session stays open.
    Retry {
        base_delay: Duration,
        max_attempts: u32,
    },
}

/// Parameters for opening a query.
///
/// # Examples
///
/// ```
/// use reduct_client::{NoDataPolicy, QueryOptions};
/// use std::time::Duration;
///
/// let options = QueryOptions::default()
///     .start(1_000)
///     .stop(5_000)
///     .ttl(Duration::from_secs(30))
///     .no_data(NoDataPolicy::Retry {
///         base_delay: Duration::from_millis(50),
///         max_attempts: 4,
///     });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Inclusive lower bound in microseconds. Unbounded when absent.
    pub start: Option<u64>,

    /// Exclusive upper bound in microseconds. Unbounded when absent.
    pub stop: Option<u64>,

    /// Server-side lifetime of the query. Sent in whole seconds, rounded up.
    pub ttl: Option<Duration>,

    pub no_data: NoDataPolicy,
}

impl QueryOptions {
    #[must_use]
    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn stop(mut self, stop: u64) -> Self {
        self.stop = Some(stop);
        self
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn no_data(mut self, policy: NoDataPolicy) -> Self {
        self.no_data = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_tokens() {
        let options = ClientOptions::default()
            .api_token("secret-api")
            .access_token("secret-access");
        let printed = format!("{options:?}");
        assert!(!printed.contains("secret-api"));
        assert!(!printed.contains("secret-access"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn query_options_default_is_unbounded() {
        let options = QueryOptions::default();
        assert_eq!(options.start, None);
        assert_eq!(options.stop, None);
        assert_eq!(options.ttl, None);
        assert_eq!(options.no_data, NoDataPolicy::End);
    }
}
