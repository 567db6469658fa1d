//! Identity providers and the session they produce.

pub mod external;
pub mod protocol;
mod session;

pub use external::ExternalProvider;
pub use session::{SessionManager, SessionState};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::AuthResult;

/// Provider-specific sign-in input (e.g. `username` and `password`).
pub type Credentials = serde_json::Map<String, serde_json::Value>;

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Identity {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }
}

/// Anything that can run an interactive sign-in and end a session.
pub trait AuthProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run the provider's sign-in flow. A cancelled or blocked flow is an error.
    fn sign_in(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = AuthResult<Identity>> + Send;

    /// End the remote session for `identity`.
    fn sign_out(&self, identity: &Identity) -> impl Future<Output = AuthResult<()>> + Send;
}
