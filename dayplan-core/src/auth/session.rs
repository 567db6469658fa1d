use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::{AuthProvider, Credentials, Identity};
use crate::error::AuthResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Unauthenticated => None,
        }
    }
}

/// Holds the current identity and moves it through sign-in and sign-out.
///
/// Nothing is persisted: a fresh manager always starts unauthenticated.
pub struct SessionManager<A> {
    provider: A,
    state: RwLock<SessionState>,
}

impl<A: AuthProvider> SessionManager<A> {
    pub fn new(provider: A) -> Self {
        SessionManager {
            provider,
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    pub fn provider(&self) -> &A {
        &self.provider
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity().cloned()
    }

    /// Run the provider's sign-in flow.
    ///
    /// On failure the state is left as it was. On success any previous
    /// identity is replaced and its remote session ended (best effort).
    pub async fn sign_in(&self, credentials: Credentials) -> AuthResult<Identity> {
        let identity = match self.provider.sign_in(credentials).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "sign-in failed");
                return Err(e);
            }
        };

        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut *state, SessionState::Authenticated(identity.clone()))
        };

        if let SessionState::Authenticated(previous) = previous {
            if previous != identity {
                self.end_remote_session(&previous).await;
            }
        }

        info!(provider = self.provider.name(), uid = %identity.uid, "signed in");
        Ok(identity)
    }

    /// Drop the local identity and end the remote session (best effort).
    /// Always leaves the manager unauthenticated.
    pub async fn sign_out(&self) -> Option<Identity> {
        let identity = self.take_identity().await?;
        self.finish_sign_out(&identity).await;
        Some(identity)
    }

    /// Drop the local identity without contacting the provider.
    ///
    /// Pair with [`SessionManager::finish_sign_out`] when local state tied to
    /// the identity has to be cleared before the provider answers.
    pub async fn take_identity(&self) -> Option<Identity> {
        match std::mem::take(&mut *self.state.write().await) {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Unauthenticated => None,
        }
    }

    /// End the remote session of an identity already taken locally.
    pub async fn finish_sign_out(&self, identity: &Identity) {
        self.end_remote_session(identity).await;
        info!(provider = self.provider.name(), uid = %identity.uid, "signed out");
    }

    async fn end_remote_session(&self, identity: &Identity) {
        if let Err(e) = self.provider.sign_out(identity).await {
            warn!(
                provider = self.provider.name(),
                uid = %identity.uid,
                error = %e,
                "remote sign-out failed, local session cleared anyway"
            );
        }
    }
}
