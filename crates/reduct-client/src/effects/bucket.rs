use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::auth::AuthRetryInterceptor;
use super::http::{HttpClient, HttpRequest};
use super::query::QuerySession;
use super::response::{collect, discard, json};
use crate::core::paths::{bucket_path, entry_path};
use crate::core::record::CONTENT_LENGTH;
use crate::data::info::BucketDetails;
use crate::data::{BucketInfo, BucketSettings, EntryInfo, QueryOptions};
use crate::error::{Error, Result};

/// A bucket on the server. Obtained from [`Client`](crate::Client).
pub struct Bucket<C: HttpClient> {
    name: String,
    interceptor: Arc<AuthRetryInterceptor<C>>,
}

impl<C: HttpClient> Clone for Bucket<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

impl<C: HttpClient> fmt::Debug for Bucket<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket").field("name", &self.name).finish()
    }
}

impl<C: HttpClient> Bucket<C> {
    pub(crate) fn new(name: impl Into<String>, interceptor: Arc<AuthRetryInterceptor<C>>) -> Self {
        Self {
            name: name.into(),
            interceptor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn details(&self) -> Result<BucketDetails> {
        let response = self
            .interceptor
            .execute(HttpRequest::get(bucket_path(&self.name)))
            .await?;
        json(response).await
    }

    pub async fn settings(&self) -> Result<BucketSettings> {
        Ok(self.details().await?.settings)
    }

    /// Update settings. Fields left unset keep their current value.
    pub async fn set_settings(&self, settings: &BucketSettings) -> Result<()> {
        let request = HttpRequest::put(bucket_path(&self.name))
            .header("content-type", "application/json")
            .body(serde_json::to_vec(settings)?);
        discard(self.interceptor.execute(request).await?).await
    }

    pub async fn info(&self) -> Result<BucketInfo> {
        self.details()
            .await?
            .info
            .ok_or_else(|| Error::Protocol(format!("no info for bucket '{}'", self.name)))
    }

    pub async fn entries(&self) -> Result<Vec<EntryInfo>> {
        Ok(self.details().await?.entries)
    }

    /// Remove the bucket and all its entries.
    pub async fn remove(&self) -> Result<()> {
        let request = HttpRequest::delete(bucket_path(&self.name));
        discard(self.interceptor.execute(request).await?).await?;
        debug!(bucket = %self.name, "bucket removed");
        Ok(())
    }

    /// Write a record. `timestamp` (microseconds) defaults to now.
    pub async fn write(
        &self,
        entry: &str,
        data: impl Into<Bytes>,
        timestamp: Option<u64>,
    ) -> Result<()> {
        let data = data.into();
        let timestamp = timestamp.unwrap_or_else(now_micros);
        let request = HttpRequest::post(entry_path(&self.name, entry))
            .query("ts", timestamp.to_string())
            .header(CONTENT_LENGTH, data.len().to_string())
            .body(data);
        discard(self.interceptor.execute(request).await?).await
    }

    /// Read the record at `timestamp`, or the latest one.
    pub async fn read(&self, entry: &str, timestamp: Option<u64>) -> Result<Bytes> {
        let mut request = HttpRequest::get(entry_path(&self.name, entry));
        if let Some(timestamp) = timestamp {
            request = request.query("ts", timestamp.to_string());
        }
        let mut response = self.interceptor.execute(request).await?;
        collect(&mut response.body).await
    }

    /// Open a query over `entry`. See [`QuerySession`].
    pub async fn query(&self, entry: &str, options: QueryOptions) -> Result<QuerySession<C>> {
        QuerySession::open(
            Arc::clone(&self.interceptor),
            entry_path(&self.name, entry),
            &options,
        )
        .await
    }
}

fn now_micros() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or_default()
}
