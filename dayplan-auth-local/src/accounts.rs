//! Local account list for the provider.
//!
//! Accounts are stored in:
//!   ~/.config/dayplan/providers/local/accounts.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dayplan_core::auth::Identity;
use serde::Deserialize;
use sha2::{Digest, Sha256};

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("dayplan")
        .join("providers")
        .join("local"))
}

/// Lowercase hex SHA-256 of a password, as stored in `password_sha256`.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_sha256: String,
}

impl Account {
    fn matches_username(&self, username: &str) -> bool {
        self.uid == username || self.email.as_deref() == Some(username)
    }

    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            display_name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Accounts {
    #[serde(default, rename = "account")]
    accounts: Vec<Account>,
}

impl Accounts {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?.join("accounts.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No local accounts configured.\n\n\
                Create {} with:\n\n\
                [[account]]\n\
                uid = \"student\"\n\
                name = \"Your Name\"\n\
                password_sha256 = \"<output of: printf '%s' 'password' | sha256sum>\"",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read accounts from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse accounts from {}", path.display()))
    }

    /// Identity for `username` (uid or email) if the password matches.
    pub fn verify(&self, username: &str, password: &str) -> Option<Identity> {
        let hash = hash_password(password);

        self.accounts
            .iter()
            .find(|account| account.matches_username(username))
            .filter(|account| account.password_sha256.eq_ignore_ascii_case(&hash))
            .map(Account::identity)
    }
}
