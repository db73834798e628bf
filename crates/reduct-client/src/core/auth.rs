//! Per-request authorization state machine.
//!
//! Every logical request walks this machine exactly once:
//!
//! ```text
//! Initial ──success──────────────────────────────▶ Done
//!    │ ──401 + api token──▶ Refreshing ──ok──▶ Retrying ──success──▶ Done
//!    │                          │                  │
//!    └──other failure──▶ Failed ◀──refresh failed──┴──any failure──▶ Failed
//! ```
//!
//! `Retrying` never leads back to `Refreshing`, which caps the work for one
//! request at a single refresh and a single replay.

use serde::Deserialize;

/// State of one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Initial,
    Refreshing,
    Retrying,
    Done,
    Failed,
}

/// What happened in the step just taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unauthorized,
    Failure,
    RefreshSucceeded,
    RefreshFailed,
}

impl Outcome {
    /// Classify the status of an attempted request.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            401 => Outcome::Unauthorized,
            _ => Outcome::Failure,
        }
    }
}

impl AuthState {
    /// Next state after `outcome`.
    ///
    /// `can_refresh` is whether a long-lived API token is configured. An
    /// outcome that cannot occur in the current state fails the request.
    pub fn advance(self, outcome: Outcome, can_refresh: bool) -> AuthState {
        use AuthState::*;
        use Outcome::*;

        match (self, outcome) {
            (Initial, Success) => Done,
            (Initial, Unauthorized) if can_refresh => Refreshing,
            (Initial, Unauthorized | Failure) => Failed,
            (Refreshing, RefreshSucceeded) => Retrying,
            (Refreshing, RefreshFailed) => Failed,
            (Retrying, Success) => Done,
            (Retrying, Unauthorized | Failure) => Failed,
            (Done, _) => Done,
            (Failed, _) => Failed,
            _ => Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AuthState::Done | AuthState::Failed)
    }

    /// Whether this state sends the caller's request.
    pub fn sends_request(self) -> bool {
        matches!(self, AuthState::Initial | AuthState::Retrying)
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: Option<String>,
}

/// Extract the new access token from a refresh response body.
pub fn parse_access_token(body: &[u8]) -> Result<String, String> {
    let response: RefreshResponse =
        serde_json::from_slice(body).map_err(|e| format!("invalid refresh response: {e}"))?;
    match response.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err("no access token in response".to_string()),
    }
}
