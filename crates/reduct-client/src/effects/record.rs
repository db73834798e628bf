use std::fmt;
use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, TryStreamExt, stream};

use super::http::BoxStream;
use crate::core::RecordMeta;
use crate::error::{Error, Result};

// Upper bound on the buffer reserved up front from an advertised size.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// One record of a query, bound to the still-open response carrying its body.
///
/// A `Record` mutably borrows the [`QuerySession`](crate::QuerySession) that
/// produced it, so the next record cannot be requested until this one is
/// consumed or dropped. Dropping an unread record discards its body.
pub struct Record<'a> {
    meta: RecordMeta,
    body: BoxStream<'static, Result<Bytes>>,
    received: u64,
    finished: bool,
    _session: PhantomData<&'a mut ()>,
}

impl<'a> Record<'a> {
    pub(crate) fn new(meta: RecordMeta, body: BoxStream<'static, Result<Bytes>>) -> Self {
        Self {
            meta,
            body,
            received: 0,
            finished: false,
            _session: PhantomData,
        }
    }

    /// Microseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.meta.timestamp
    }

    /// Body length in bytes, as announced by the server.
    pub fn size(&self) -> u64 {
        self.meta.size
    }

    /// Whether the server marked this as the final record of the query.
    pub fn is_last(&self) -> bool {
        self.meta.last
    }

    /// Next chunk of the body, or `None` once all `size` bytes were read.
    ///
    /// A body that ends early or runs past `size` is a [`Error::Stream`].
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        if self.finished {
            return Ok(None);
        }

        match self.body.try_next().await {
            Ok(Some(chunk)) => {
                self.received += chunk.len() as u64;
                if self.received > self.meta.size {
                    self.finished = true;
                    return Err(Error::Stream(format!(
                        "record body exceeds announced size of {} bytes",
                        self.meta.size
                    )));
                }
                Ok(Some(chunk))
            }
            Ok(None) => {
                self.finished = true;
                if self.received != self.meta.size {
                    return Err(Error::Stream(format!(
                        "record body truncated: got {} of {} bytes",
                        self.received, self.meta.size
                    )));
                }
                Ok(None)
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Read the whole body into one buffer.
    ///
    /// On error the partial buffer is dropped and only the error is returned.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::with_capacity(self.meta.size.min(MAX_PREALLOC) as usize);
        while let Some(chunk) = self.chunk().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// The body as a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'a {
        stream::try_unfold(self, |mut record| async move {
            Ok::<_, Error>(record.chunk().await?.map(|chunk| (chunk, record)))
        })
    }

    /// Read and drop the rest of the body.
    pub async fn discard(mut self) -> Result<()> {
        while self.chunk().await?.is_some() {}
        Ok(())
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("timestamp", &self.meta.timestamp)
            .field("size", &self.meta.size)
            .field("last", &self.meta.last)
            .field("received", &self.received)
            .finish()
    }
}
