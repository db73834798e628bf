use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::auth::AuthRetryInterceptor;
use super::bucket::Bucket;
use super::credential::Credential;
use super::http::{HttpClient, HttpRequest};
use super::response::{discard, json};
use crate::core::paths::{INFO_PATH, LIST_PATH, bucket_path};
use crate::data::info::BucketList;
use crate::data::{BucketInfo, BucketSettings, ClientOptions, ServerInfo};
use crate::error::Result;

/// Entry point to a storage server.
///
/// All buckets obtained from one client share its transport and credential,
/// so a token refreshed for one request is used by every later request.
pub struct Client<C: HttpClient> {
    interceptor: Arc<AuthRetryInterceptor<C>>,
}

impl<C: HttpClient> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

impl<C: HttpClient> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credential", self.interceptor.credential())
            .finish()
    }
}

#[cfg(feature = "reqwest")]
impl Client<super::http::ReqwestClient> {
    /// Connect to the server at `url` over reqwest.
    ///
    /// ```no_run
    /// use reduct_client::{Client, ClientOptions};
    ///
    /// let client = Client::new(
    ///     "http://127.0.0.1:8383",
    ///     ClientOptions::default().api_token("my-api-token"),
    /// )?;
    /// # Ok::<(), reduct_client::Error>(())
    /// ```
    pub fn new(url: &str, options: ClientOptions) -> Result<Self> {
        let transport = super::http::ReqwestClient::new(url, options.timeout)?;
        Ok(Self::with_transport(transport, options))
    }
}

impl<C: HttpClient> Client<C> {
    /// Build a client over any transport.
    ///
    /// `options.timeout` is not applied here; configure it on the transport.
    pub fn with_transport(transport: C, options: ClientOptions) -> Self {
        let credential = match options.access_token {
            Some(token) => Credential::with_token(token),
            None => Credential::new(),
        };
        Self {
            interceptor: Arc::new(AuthRetryInterceptor::new(
                transport,
                credential,
                options.api_token,
            )),
        }
    }

    /// The shared access-token cell.
    pub fn credential(&self) -> &Credential {
        self.interceptor.credential()
    }

    pub async fn info(&self) -> Result<ServerInfo> {
        json(self.interceptor.execute(HttpRequest::get(INFO_PATH)).await?).await
    }

    pub async fn list(&self) -> Result<Vec<BucketInfo>> {
        let list: BucketList =
            json(self.interceptor.execute(HttpRequest::get(LIST_PATH)).await?).await?;
        Ok(list.buckets)
    }

    /// Create a bucket. Fails with status 409 if it already exists.
    pub async fn create_bucket(
        &self,
        name: &str,
        settings: Option<&BucketSettings>,
    ) -> Result<Bucket<C>> {
        let mut request = HttpRequest::post(bucket_path(name));
        if let Some(settings) = settings {
            request = request
                .header("content-type", "application/json")
                .body(serde_json::to_vec(settings)?);
        }
        discard(self.interceptor.execute(request).await?).await?;
        debug!(bucket = name, "bucket created");
        Ok(Bucket::new(name, Arc::clone(&self.interceptor)))
    }

    /// Get an existing bucket. Fails with status 404 if it does not exist.
    pub async fn get_bucket(&self, name: &str) -> Result<Bucket<C>> {
        discard(self.interceptor.execute(HttpRequest::get(bucket_path(name))).await?).await?;
        Ok(Bucket::new(name, Arc::clone(&self.interceptor)))
    }

    /// Create a bucket, or get it if it already exists.
    pub async fn get_or_create_bucket(
        &self,
        name: &str,
        settings: Option<&BucketSettings>,
    ) -> Result<Bucket<C>> {
        match self.create_bucket(name, settings).await {
            Err(err) if err.is_conflict() => {
                debug!(bucket = name, "bucket exists, reusing it");
                self.get_bucket(name).await
            }
            other => other,
        }
    }
}
