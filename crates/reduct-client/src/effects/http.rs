use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::data::Headers;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound request, relative to the transport's base URL.
///
/// Cloning is cheap: the body is reference-counted, so the interceptor can
/// keep a copy for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response whose body has not been read yet.
pub struct HttpResponse<E> {
    pub status: u16,
    pub headers: Headers,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

impl<E> fmt::Debug for HttpResponse<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"{ ... }")
            .finish()
    }
}

impl<E: Send + 'static> HttpResponse<E> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert the body error type.
    pub fn map_err<F, M>(self, mut f: M) -> HttpResponse<F>
    where
        M: FnMut(E) -> F + Send + 'static,
        F: Send + 'static,
    {
        HttpResponse {
            status: self.status,
            headers: self.headers,
            body: Box::pin(self.body.map(move |chunk| chunk.map_err(&mut f))),
        }
    }
}

/// Asynchronous HTTP transport.
///
/// Implementations issue the request against their base endpoint and return
/// the response for every status code; deciding what a status means is left
/// to the caller. Errors are reserved for failures to get a response at all
/// (DNS, connection, timeout).
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - [`MockHttpClient`](crate::MockHttpClient): scripted responses for tests
pub trait HttpClient: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;
    use crate::error::{Error, Result};
    use reqwest::Url;

    /// Production transport using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
        base_url: Url,
    }

    impl ReqwestClient {
        /// Create a transport for `base_url`, optionally with a per-request timeout.
        pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
            let base_url =
                Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
            if base_url.cannot_be_a_base() {
                return Err(Error::InvalidUrl(base_url.to_string()));
            }

            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(|e| Error::Transport(Box::new(e)))?;

            Ok(Self { client, base_url })
        }

        pub fn base_url(&self) -> &Url {
            &self.base_url
        }

        fn url_for(&self, request: &HttpRequest) -> Url {
            let mut url = self.base_url.clone();
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(request.path.split('/').filter(|s| !s.is_empty()));
            }
            if !request.query.is_empty() {
                url.query_pairs_mut().extend_pairs(&request.query);
            }
            url
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn send(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse<Self::Error>, Self::Error> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, self.url_for(&request));
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();

            Ok(HttpResponse {
                status: response.status().as_u16(),
                headers,
                body: Box::pin(response.bytes_stream()),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn url_keeps_base_path_prefix() {
            let client = ReqwestClient::new("http://localhost:8383/api/", None).unwrap();
            let request = HttpRequest::get("/b/data/temp").query("q", "7");
            assert_eq!(
                client.url_for(&request).as_str(),
                "http://localhost:8383/api/b/data/temp?q=7"
            );
        }

        #[test]
        fn url_without_prefix() {
            let client = ReqwestClient::new("http://localhost:8383", None).unwrap();
            let request = HttpRequest::get("/info");
            assert_eq!(client.url_for(&request).as_str(), "http://localhost:8383/info");
        }

        #[test]
        fn rejects_invalid_base() {
            assert!(matches!(
                ReqwestClient::new("not a url", None),
                Err(Error::InvalidUrl(_))
            ));
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
