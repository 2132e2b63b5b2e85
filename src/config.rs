use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub admin: AdminConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub teardown: TeardownConfig,
  #[serde(default)]
  pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the portfolio backend (e.g. "http://localhost/myportfolio")
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub endpoints: EndpointsConfig,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
      endpoints: EndpointsConfig::default(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// Paths of the backend scripts, relative to `base_url`.
///
/// The stock PHP backend serves these as `projects.php`, `auth.php` and so on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
  pub projects: String,
  pub auth: String,
  pub contact: String,
  pub newsletter: String,
  pub resources: String,
}

impl Default for EndpointsConfig {
  fn default() -> Self {
    Self {
      projects: "projects".to_string(),
      auth: "auth".to_string(),
      contact: "contact".to_string(),
      newsletter: "newsletter".to_string(),
      resources: "api".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
  pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// Override for the snapshot database (default: $XDG_DATA_HOME/folio/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeardownConfig {
  /// Use the beacon transport for the shutdown logout
  pub beacon: bool,
  /// Upper bound on the shutdown logout, in milliseconds
  pub deadline_ms: u64,
}

impl Default for TeardownConfig {
  fn default() -> Self {
    Self {
      beacon: true,
      deadline_ms: 1500,
    }
  }
}

impl TeardownConfig {
  pub fn deadline(&self) -> Duration {
    Duration::from_millis(self.deadline_ms)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
  #[serde(default)]
  pub dark_mode: bool,
}

fn default_base_url() -> String {
  "http://localhost/myportfolio".to_string()
}

fn default_timeout_secs() -> u64 {
  15
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => {
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty document deserializes to unit, not to an empty map
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Get the admin password from the environment.
  ///
  /// Checks FOLIO_ADMIN_PASSWORD.
  pub fn get_password() -> Result<String> {
    std::env::var("FOLIO_ADMIN_PASSWORD").map_err(|_| {
      eyre!("Admin password not found. Set FOLIO_ADMIN_PASSWORD environment variable.")
    })
  }

  /// Directory for the snapshot database and log files.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("folio"))
  }
}
