use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared short-lived access token.
///
/// Cloning yields another handle to the same cell. Tokens are swapped whole
/// under a lock, so readers see either the old or the new token and never a
/// mix. Every install bumps a generation counter that lets the interceptor
/// tell whether the token changed since a request was sent.
#[derive(Clone, Default)]
pub struct Credential {
    inner: Arc<RwLock<Slot>>,
}

#[derive(Default)]
struct Slot {
    token: Option<Arc<str>>,
    generation: u64,
}

impl Credential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<Arc<str>>) -> Self {
        let credential = Self::new();
        credential.install(token);
        credential
    }

    /// Current token and the generation it belongs to.
    pub fn snapshot(&self) -> (Option<Arc<str>>, u64) {
        let slot = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (slot.token.clone(), slot.generation)
    }

    pub fn token(&self) -> Option<Arc<str>> {
        self.snapshot().0
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().1
    }

    /// Replace the token, returning the new generation.
    pub fn install(&self, token: impl Into<Arc<str>>) -> u64 {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.token = Some(token.into());
        slot.generation += 1;
        slot.generation
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (token, generation) = self.snapshot();
        f.debug_struct("Credential")
            .field("token", &token.map(|_| "***"))
            .field("generation", &generation)
            .finish()
    }
}
