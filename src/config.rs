use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MiSalud";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when `MISALUD_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://misalud-back.onrender.com/v1";

/// Request timeout used when `MISALUD_HTTP_TIMEOUT` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name of the add-medication scratch list.
pub const SCRATCH_FILE: &str = "selectedMedicamentos.json";

/// File name of the saved login.
pub const SESSION_FILE: &str = "session.json";

/// Get the application data directory
/// (platform data dir, falling back to the working directory)
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "misalud_lib=info,misalud=info,warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Connection settings for the MiSalud backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Read `MISALUD_API_URL` and `MISALUD_HTTP_TIMEOUT`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("MISALUD_API_URL").ok(),
            std::env::var("MISALUD_HTTP_TIMEOUT").ok(),
        )
    }

    fn from_vars(url: Option<String>, timeout: Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = match timeout {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                var: "MISALUD_HTTP_TIMEOUT",
                value: raw.clone(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self::new(url.trim(), timeout_secs))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS)
    }
}
