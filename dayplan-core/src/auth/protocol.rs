//! JSON protocol spoken between dayplan and auth provider binaries over
//! stdin/stdout. One request line in, one response line out.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::auth::{Credentials, Identity};

pub trait AuthCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    SignIn,
    SignOut,
}

/// Request sent from dayplan to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to dayplan.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap_or_else(|e| {
            Response::<()>::error(&format!("Failed to serialize response: {e}"))
        })
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

/// Run the provider's sign-in flow with the given credentials.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignIn {
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl AuthCommand for SignIn {
    type Response = Identity;
    fn command() -> Command {
        Command::SignIn
    }
}

/// End the provider-side session for an identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignOut {
    pub identity: Identity,
}

impl AuthCommand for SignOut {
    type Response = ();
    fn command() -> Command {
        Command::SignOut
    }
}
