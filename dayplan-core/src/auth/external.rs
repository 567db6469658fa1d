//! Auth provider subprocess.
//!
//! Sign-in is delegated to an external binary named `dayplan-auth-{name}`
//! found on `PATH`, which speaks the JSON protocol in [`crate::auth::protocol`].
//! Providers own their credentials and any remote session state.
//!
//! Failures fall in two groups. A well-formed `{"status":"error"}` reply is
//! the provider declining (wrong password, closed popup) and becomes
//! [`AuthError::Rejected`]. Everything else is the subprocess itself
//! misbehaving: binary missing ([`AuthError::ProviderNotInstalled`]), spawn
//! failure, non-zero exit, empty or unparseable output
//! ([`AuthError::Provider`]), or no answer in time ([`AuthError::Timeout`]).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::auth::protocol::{AuthCommand, Command, Request, Response, SignIn, SignOut};
use crate::auth::{AuthProvider, Credentials, Identity};
use crate::error::{AuthError, AuthResult};

/// Sign-in may wait on the user (popup, password prompt).
const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(300);
const SIGN_OUT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ExternalProvider {
    name: String,
    search_dir: Option<PathBuf>,
}

impl ExternalProvider {
    pub fn from_name(name: &str) -> Self {
        ExternalProvider {
            name: name.to_string(),
            search_dir: None,
        }
    }

    /// Look for the binary in `dir` before falling back to `PATH`.
    pub fn search_first_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn binary_name(&self) -> String {
        format!("dayplan-auth-{}", self.name)
    }

    fn binary_path(&self) -> AuthResult<PathBuf> {
        let binary_name = self.binary_name();
        let found = match &self.search_dir {
            Some(dir) => which::which_in(&binary_name, Some(dir), dir)
                .or_else(|_| which::which(&binary_name)),
            None => which::which(&binary_name),
        };
        found.map_err(|_| AuthError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command, giving up after `limit`.
    pub async fn call<C: AuthCommand>(&self, cmd: C, limit: Duration) -> AuthResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| AuthError::Timeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> AuthResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| AuthError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| AuthError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.name, command = ?command, "calling auth provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AuthError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AuthError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(AuthError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(AuthError::Provider("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(response_str.trim())
            .map_err(|e| AuthError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(AuthError::Rejected(error)),
        }
    }
}

impl AuthProvider for ExternalProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn sign_in(&self, credentials: Credentials) -> AuthResult<Identity> {
        self.call(SignIn { credentials }, SIGN_IN_TIMEOUT).await
    }

    async fn sign_out(&self, identity: &Identity) -> AuthResult<()> {
        self.call(
            SignOut {
                identity: identity.clone(),
            },
            SIGN_OUT_TIMEOUT,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let provider = ExternalProvider::from_name("definitely-not-installed-7f3a");

        let err = provider.sign_in(Credentials::new()).await.unwrap_err();
        match err {
            AuthError::ProviderNotInstalled(name) => {
                assert_eq!(name, "dayplan-auth-definitely-not-installed-7f3a")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use tokio::sync::Mutex;

        // Another test forking while a script is still open for writing
        // makes exec fail with ETXTBSY, so scripted tests run one at a time.
        static SERIAL: Mutex<()> = Mutex::const_new(());

        /// Install `body` as an executable `dayplan-auth-{name}` shell script.
        fn install(dir: &Path, name: &str, body: &str) -> ExternalProvider {
            let path = dir.join(format!("dayplan-auth-{name}"));
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            ExternalProvider::from_name(name).search_first_in(dir)
        }

        fn creds() -> Credentials {
            let mut credentials = Credentials::new();
            credentials.insert("username".into(), "alice".into());
            credentials.insert("password".into(), "hunter2".into());
            credentials
        }

        #[tokio::test]
        async fn test_sign_in_round_trip() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let request_log = dir.path().join("request.json");
            let provider = install(
                dir.path(),
                "ok",
                &format!(
                    "#!/bin/sh\n\
                     read -r line\n\
                     printf '%s\\n' \"$line\" > '{}'\n\
                     printf '%s\\n' '{{\"status\":\"success\",\"data\":{{\"uid\":\"u-1\",\"display_name\":\"Alice\"}}}}'\n",
                    request_log.display()
                ),
            );

            let identity = provider.sign_in(creds()).await.unwrap();
            assert_eq!(identity.uid, "u-1");
            assert_eq!(identity.display_name.as_deref(), Some("Alice"));

            let request: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(&request_log).unwrap()).unwrap();
            assert_eq!(request["command"], "sign_in");
            assert_eq!(request["params"]["username"], "alice");
            assert_eq!(request["params"]["password"], "hunter2");
        }

        #[tokio::test]
        async fn test_sign_out_round_trip() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(
                dir.path(),
                "bye",
                "#!/bin/sh\nread -r line\necho '{\"status\":\"success\",\"data\":null}'\n",
            );

            provider.sign_out(&Identity::new("u-1")).await.unwrap();
        }

        #[tokio::test]
        async fn test_error_response_is_a_rejection() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(
                dir.path(),
                "deny",
                "#!/bin/sh\nread -r line\necho '{\"status\":\"error\",\"error\":\"wrong password\"}'\n",
            );

            match provider.sign_in(creds()).await.unwrap_err() {
                AuthError::Rejected(reason) => assert_eq!(reason, "wrong password"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_a_provider_error() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(
                dir.path(),
                "crash",
                "#!/bin/sh\nread -r line\necho '{\"status\":\"success\",\"data\":null}'\nexit 3\n",
            );

            match provider.sign_in(creds()).await.unwrap_err() {
                AuthError::Provider(message) => assert!(message.contains('3'), "{message}"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_empty_output_is_a_provider_error() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(dir.path(), "silent", "#!/bin/sh\nread -r line\nexit 0\n");

            match provider.sign_in(creds()).await.unwrap_err() {
                AuthError::Provider(message) => assert!(message.contains("no response"), "{message}"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_garbage_output_is_a_provider_error() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(dir.path(), "noisy", "#!/bin/sh\nread -r line\necho 'hello'\n");

            match provider.sign_in(creds()).await.unwrap_err() {
                AuthError::Provider(message) => assert!(message.contains("parse"), "{message}"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_unrunnable_binary_is_a_spawn_error() {
            let _serial = SERIAL.lock().await;
            let dir = tempfile::tempdir().unwrap();
            let provider = install(
                dir.path(),
                "broken",
                "#!/nonexistent/dayplan-interpreter\n",
            );

            match provider.sign_in(creds()).await.unwrap_err() {
                AuthError::Provider(message) => {
                    assert!(message.starts_with("Failed to spawn"), "{message}")
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
