//! Pull-based iteration over the records of a server-side query.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::auth::AuthRetryInterceptor;
use super::http::{HttpClient, HttpRequest};
use super::record::Record;
use super::response::json;
use crate::core::paths::{query_params, query_path};
use crate::core::{PollStatus, classify_poll, parse_record_meta, retry_delay};
use crate::data::{NoDataPolicy, QueryOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// More records may follow.
    Open,
    /// The server delivered its last record or reported exhaustion.
    Exhausted,
    /// A poll failed; the error was returned from `next()`.
    Failed,
}

#[derive(Deserialize)]
struct OpenedQuery {
    id: serde_json::Value,
}

/// A server-side cursor over an entry's records within a time range.
///
/// Each call to [`next`](Self::next) issues exactly one poll (more only under
/// [`NoDataPolicy::Retry`]). Once the session is no longer
/// [`Open`](QueryState::Open), `next()` returns `Ok(None)` without touching
/// the network. Sessions cannot be restarted; open a new query instead.
///
/// ```no_run
/// # async fn run(bucket: reduct_client::Bucket<reduct_client::ReqwestClient>) -> reduct_client::Result<()> {
/// use reduct_client::QueryOptions;
///
/// let mut query = bucket
///     .query("temp", QueryOptions::default().start(1_000).stop(5_000))
///     .await?;
/// while let Some(record) = query.next().await? {
///     let ts = record.timestamp();
///     let data = record.bytes().await?;
///     println!("{ts}: {} bytes", data.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct QuerySession<C: HttpClient> {
    interceptor: Arc<AuthRetryInterceptor<C>>,
    entry_path: String,
    query_id: String,
    state: QueryState,
    no_data: NoDataPolicy,
    last_timestamp: Option<u64>,
    delivered: u64,
}

impl<C: HttpClient> QuerySession<C> {
    /// Open a query on the entry at `entry_path`.
    pub(crate) async fn open(
        interceptor: Arc<AuthRetryInterceptor<C>>,
        entry_path: String,
        options: &QueryOptions,
    ) -> Result<Self> {
        let request = HttpRequest::get(query_path(&entry_path)).queries(query_params(options));
        let opened: OpenedQuery = json(interceptor.execute(request).await?).await?;
        let query_id = match opened.id {
            serde_json::Value::String(id) if !id.is_empty() => id,
            serde_json::Value::Number(id) => id.to_string(),
            other => {
                return Err(Error::Protocol(format!("invalid query id: {other}")));
            }
        };

        debug!(entry = %entry_path, %query_id, ?options, "query opened");
        Ok(Self {
            interceptor,
            entry_path,
            query_id,
            state: QueryState::Open,
            no_data: options.no_data,
            last_timestamp: None,
            delivered: 0,
        })
    }

    /// The opaque id the server issued for this query.
    pub fn id(&self) -> &str {
        &self.query_id
    }

    pub fn entry_path(&self) -> &str {
        &self.entry_path
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == QueryState::Exhausted
    }

    /// Number of records yielded so far.
    pub fn records_read(&self) -> u64 {
        self.delivered
    }

    /// Fetch the next record.
    ///
    /// Returns `Ok(None)` when the query is exhausted, or when the server has
    /// nothing to deliver yet and the [`NoDataPolicy`] gives up; the two are
    /// told apart by [`is_exhausted`](Self::is_exhausted). Any error makes the
    /// session [`Failed`](QueryState::Failed).
    pub async fn next(&mut self) -> Result<Option<Record<'_>>> {
        let mut idle_polls = 0;

        while self.state == QueryState::Open {
            let request = HttpRequest::get(self.entry_path.as_str()).query("q", self.query_id.as_str());
            let response = match self.interceptor.execute(request).await {
                Ok(response) => response,
                Err(err) => return self.fail(err),
            };

            match classify_poll(response.status) {
                PollStatus::Record => {
                    let meta = match parse_record_meta(&response.headers) {
                        Ok(meta) => meta,
                        Err(err) => return self.fail(err),
                    };
                    if let Some(previous) = self.last_timestamp
                        && meta.timestamp < previous
                    {
                        return self.fail(Error::Protocol(format!(
                            "record timestamp {} precedes {previous}",
                            meta.timestamp
                        )));
                    }

                    self.last_timestamp = Some(meta.timestamp);
                    self.delivered += 1;
                    if meta.last {
                        self.finish();
                    }
                    return Ok(Some(Record::new(meta, response.body)));
                }
                PollStatus::Exhausted => self.finish(),
                PollStatus::NoData => match self.no_data {
                    NoDataPolicy::Retry {
                        base_delay,
                        max_attempts,
                    } if idle_polls < max_attempts => {
                        let delay = retry_delay(idle_polls, base_delay);
                        debug!(query_id = %self.query_id, ?delay, "no data yet, polling again");
                        tokio::time::sleep(delay).await;
                        idle_polls += 1;
                    }
                    _ => return Ok(None),
                },
                PollStatus::Unexpected(status) => {
                    return self.fail(Error::Protocol(format!(
                        "unexpected poll status {status}"
                    )));
                }
            }
        }

        Ok(None)
    }

    fn finish(&mut self) {
        self.state = QueryState::Exhausted;
        debug!(
            entry = %self.entry_path,
            query_id = %self.query_id,
            records = self.delivered,
            "query exhausted"
        );
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.state = QueryState::Failed;
        Err(err)
    }
}

impl<C: HttpClient> fmt::Debug for QuerySession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySession")
            .field("entry_path", &self.entry_path)
            .field("query_id", &self.query_id)
            .field("state", &self.state)
            .field("records_read", &self.delivered)
            .finish()
    }
}
