use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TagStrategy;
use crate::error::{FlowError, Result};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "githubflow.toml";

/// Represents the complete configuration for github-flow.
///
/// Contains the remote to sync with, GitHub connection settings and release options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from(".githubtoken")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version.txt")
}

fn default_true() -> bool {
    true
}

/// GitHub connection settings.
///
/// `owner` and `repo` may be left out, in which case they are derived from the
/// remote URL. A relative `token_file` is resolved against the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Open newly created pull requests in the browser
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            owner: None,
            repo: None,
            api_url: default_api_url(),
            token_file: default_token_file(),
            timeout_secs: default_timeout_secs(),
            open_browser: default_true(),
        }
    }
}

/// Release flow settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub tag_strategy: TagStrategy,

    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    /// Also merge staging into master when finishing a release
    #[serde(default = "default_true")]
    pub merge_staging_first: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            tag_strategy: TagStrategy::default(),
            version_file: default_version_file(),
            merge_staging_first: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            github: GitHubConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Config {
    /// Resolve a possibly relative path against the repository root
    pub fn resolve(&self, root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `githubflow.toml` in current directory
/// 3. `.githubflow.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE).exists() {
        PathBuf::from(CONFIG_FILE)
    } else if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join(format!(".{}", CONFIG_FILE));
        if candidate.exists() {
            candidate
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        FlowError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| FlowError::config(e.to_string()))
}
