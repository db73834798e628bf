//! Transparent access-token refresh around a transport.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::http::{HttpClient, HttpRequest, HttpResponse};
use super::response::{SMALL_BODY_LIMIT, collect_at_most, into_request_error};
use crate::core::paths::REFRESH_PATH;
use crate::core::{AuthState, Outcome, error_message, parse_access_token};
use crate::error::{Error, Result};

pub const AUTHORIZATION: &str = "authorization";

/// Wraps a transport so that an expired access token is refreshed and the
/// request replayed, at most once per request.
///
/// The refresh call goes straight to the transport, never back through
/// [`execute`](Self::execute), so a server that rejects everything cannot
/// make the interceptor recurse.
pub struct AuthRetryInterceptor<C: HttpClient> {
    transport: C,
    credential: Credential,
    api_token: Option<String>,
    // Serializes refreshes; waiters re-check the credential generation.
    refresh_gate: Mutex<()>,
}

impl<C: HttpClient> AuthRetryInterceptor<C> {
    pub fn new(transport: C, credential: Credential, api_token: Option<String>) -> Self {
        Self {
            transport,
            credential,
            api_token,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// Send `request`, refreshing the access token once on a 401.
    ///
    /// Returns the response for any 2xx status with its body unread. Any
    /// other status becomes [`Error::Request`]; a failed refresh becomes
    /// [`Error::AuthRefresh`].
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse<Error>> {
        let can_refresh = self.api_token.is_some();
        let mut state = AuthState::Initial;
        let mut response = None;
        let mut failure = None;
        let mut sent_generation = 0;

        while !state.is_terminal() {
            state = if state.sends_request() {
                let (token, generation) = self.credential.snapshot();
                sent_generation = generation;

                let outcome = match self.attempt(&request, token.as_deref(), state).await {
                    Ok(resp) => {
                        let outcome = Outcome::from_status(resp.status);
                        if outcome == Outcome::Success {
                            response = Some(resp);
                        } else {
                            failure = Some(into_request_error(resp).await);
                        }
                        outcome
                    }
                    Err(err) => {
                        failure = Some(err);
                        Outcome::Failure
                    }
                };

                if outcome == Outcome::Unauthorized && can_refresh {
                    warn!(path = %request.path, "access token rejected, refreshing");
                }
                state.advance(outcome, can_refresh)
            } else {
                let outcome = match self.refresh(sent_generation).await {
                    Ok(()) => Outcome::RefreshSucceeded,
                    Err(reason) => {
                        warn!(%reason, "access token refresh failed");
                        let (status, message) = match failure.take() {
                            Some(Error::Request { status, message }) => (status, message),
                            Some(other) => (401, other.to_string()),
                            None => (401, "Unauthorized".to_string()),
                        };
                        failure = Some(Error::AuthRefresh {
                            status,
                            message,
                            reason,
                        });
                        Outcome::RefreshFailed
                    }
                };
                state.advance(outcome, can_refresh)
            };
        }

        match (state, response) {
            (AuthState::Done, Some(response)) => Ok(response),
            (AuthState::Done, None) => {
                Err(Error::InvalidState("request done without response".into()))
            }
            _ => Err(failure
                .unwrap_or_else(|| Error::InvalidState("request failed without error".into()))),
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        token: Option<&str>,
        state: AuthState,
    ) -> Result<HttpResponse<Error>> {
        let mut request = request.clone();
        if let Some(token) = token {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }

        debug!(
            method = %request.method,
            path = %request.path,
            replay = state == AuthState::Retrying,
            "sending request"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Error::Transport(Box::new(e)))?;
        Ok(response.map_err(|e: C::Error| Error::Stream(e.to_string())))
    }

    /// Obtain a new access token with the API token and install it.
    ///
    /// If another request refreshed the token after `sent_generation` was
    /// read, that token is reused instead of refreshing again.
    async fn refresh(&self, sent_generation: u64) -> std::result::Result<(), String> {
        let api_token = self
            .api_token
            .as_deref()
            .ok_or_else(|| "no API token configured".to_string())?;

        let _gate = self.refresh_gate.lock().await;
        if self.credential.generation() != sent_generation {
            debug!("access token already refreshed by a concurrent request");
            return Ok(());
        }

        let request =
            HttpRequest::post(REFRESH_PATH).header(AUTHORIZATION, format!("Bearer {api_token}"));
        let mut response = self
            .transport
            .send(request)
            .await
            .map_err(|e| format!("refresh request failed: {e}"))?;

        let body = collect_at_most(&mut response.body, SMALL_BODY_LIMIT)
            .await
            .map_err(|e| format!("failed to read refresh response: {e}"))?;
        if !response.is_success() {
            return Err(format!(
                "refresh returned {}: {}",
                response.status,
                error_message(response.status, &response.headers, &body)
            ));
        }

        let token = parse_access_token(&body)?;
        let generation = self.credential.install(token);
        info!(generation, "access token refreshed");
        Ok(())
    }
}
