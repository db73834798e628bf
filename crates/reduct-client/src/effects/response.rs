//! Helpers for consuming response bodies.

use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use serde::de::DeserializeOwned;

use super::http::{BoxStream, HttpResponse};
use crate::core::error_message;
use crate::error::{Error, Result};

// Error and refresh bodies are small; anything past this is not read.
pub(crate) const SMALL_BODY_LIMIT: usize = 64 * 1024;

/// Accumulate a body into one buffer. On error, nothing accumulated so far is returned.
pub(crate) async fn collect<E>(
    body: &mut BoxStream<'_, std::result::Result<Bytes, E>>,
) -> std::result::Result<Bytes, E> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.try_next().await? {
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Accumulate at most `limit` bytes of a body, then stop reading.
pub(crate) async fn collect_at_most<E>(
    body: &mut BoxStream<'_, std::result::Result<Bytes, E>>,
    limit: usize,
) -> std::result::Result<Bytes, E> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.try_next().await? {
        let room = limit.saturating_sub(buffer.len());
        buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buffer.len() >= limit {
            break;
        }
    }
    Ok(buffer.freeze())
}

/// Drain a successful response and decode it as JSON.
pub(crate) async fn json<T: DeserializeOwned>(mut response: HttpResponse<Error>) -> Result<T> {
    let body = collect(&mut response.body).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Drain a successful response and drop its body.
pub(crate) async fn discard(mut response: HttpResponse<Error>) -> Result<()> {
    while response.body.try_next().await?.is_some() {}
    Ok(())
}

/// Turn a failed response into [`Error::Request`].
pub(crate) async fn into_request_error<E>(mut response: HttpResponse<E>) -> Error {
    let mut body = BytesMut::new();
    // A broken error body still leaves the status to report.
    while let Ok(Some(chunk)) = response.body.try_next().await {
        let room = SMALL_BODY_LIMIT.saturating_sub(body.len());
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() >= SMALL_BODY_LIMIT {
            break;
        }
    }

    Error::Request {
        status: response.status,
        message: error_message(response.status, &response.headers, &body),
    }
}
