//! Global dayplan configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::links::{QuickLink, default_links};

static DEFAULT_DATA_DIR: &str = "~/.local/share/dayplan";
static DEFAULT_AUTH_PROVIDER: &str = "local";
pub const DEFAULT_PORT: u16 = 4097;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_auth_provider() -> String {
    DEFAULT_AUTH_PROVIDER.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Configuration at ~/.config/dayplan/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Root of the document store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the auth provider binary, without the `dayplan-auth-` prefix.
    #[serde(default = "default_auth_provider")]
    pub auth_provider: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory searched for the auth provider binary before `PATH`.
    #[serde(default)]
    pub provider_dir: Option<PathBuf>,

    #[serde(default = "default_links")]
    pub links: Vec<QuickLink>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            data_dir: default_data_dir(),
            auth_provider: default_auth_provider(),
            port: default_port(),
            provider_dir: None,
            links: default_links(),
        }
    }
}

impl PlannerConfig {
    pub fn config_dir() -> PlannerResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| PlannerError::Config("Could not determine config directory".into()))?
            .join("dayplan"))
    }

    pub fn config_path() -> PlannerResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if there is no config file yet.
    pub fn load() -> PlannerResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> PlannerResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| PlannerError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// `provider_dir` with `~` expanded, if set.
    pub fn provider_path(&self) -> Option<PathBuf> {
        self.provider_dir.as_ref().map(|dir| {
            PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned())
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PlannerResult<()> {
        let contents = format!(
            "\
# dayplan configuration

# Where day records are stored:
# data_dir = \"{}\"

# Auth provider binary (dayplan-auth-<name>) used for sign-in:
# auth_provider = \"{}\"

# Port the local server listens on:
# port = {}

# Extra directory searched for the provider binary before PATH:
# provider_dir = \"~/.local/bin\"
",
            DEFAULT_DATA_DIR, DEFAULT_AUTH_PROVIDER, DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlannerError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PlannerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
