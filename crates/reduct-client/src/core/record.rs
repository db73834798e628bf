//! Poll response classification and record header parsing.

use crate::data::Headers;
use crate::error::{Error, Result};

pub const TIME_HEADER: &str = "x-reduct-time";
pub const LAST_HEADER: &str = "x-reduct-last";
pub const ERROR_HEADER: &str = "x-reduct-error";
pub const CONTENT_LENGTH: &str = "content-length";

/// Meaning of a successful poll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// A record follows in the body.
    Record,
    /// The query has no more records; the session is finished.
    Exhausted,
    /// Nothing to deliver right now; the query is still alive.
    NoData,
    Unexpected(u16),
}

pub fn classify_poll(status: u16) -> PollStatus {
    match status {
        200 => PollStatus::Record,
        202 => PollStatus::Exhausted,
        204 => PollStatus::NoData,
        other => PollStatus::Unexpected(other),
    }
}

/// Metadata of one record, taken from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    /// Microseconds since the Unix epoch.
    pub timestamp: u64,
    /// Body length in bytes.
    pub size: u64,
    /// Whether this is the final record of the query.
    pub last: bool,
}

pub fn parse_record_meta(headers: &Headers) -> Result<RecordMeta> {
    Ok(RecordMeta {
        timestamp: required_u64(headers, TIME_HEADER)?,
        size: required_u64(headers, CONTENT_LENGTH)?,
        last: headers.get(LAST_HEADER).map(str::trim) == Some("1"),
    })
}

/// Human-readable message for a failed response.
///
/// Prefers the `x-reduct-error` header, then a JSON `detail` field, then the
/// raw body text, then the canonical reason phrase.
pub fn error_message(status: u16, headers: &Headers, body: &[u8]) -> String {
    if let Some(message) = headers.get(ERROR_HEADER).filter(|m| !m.trim().is_empty()) {
        return message.trim().to_string();
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail").and_then(|d| d.as_str())
    {
        return detail.to_string();
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    reason_phrase(status).to_string()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown Status",
    }
}

fn required_u64(headers: &Headers, name: &str) -> Result<u64> {
    let value = headers
        .get(name)
        .ok_or_else(|| Error::Protocol(format!("missing {name} header")))?;
    value
        .trim()
        .parse()
        .map_err(|_| Error::Protocol(format!("invalid {name} header: {value:?}")))
}
