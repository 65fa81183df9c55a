use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub dataflow: DataflowConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub python: PythonConfig,
}

/// Retry settings applied to every wrapped client call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed wait between attempts in milliseconds (default: 1000).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// Google API endpoints and HTTP timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataflowConfig {
    /// Base URL of the Dataflow REST API.
    #[serde(default = "default_dataflow_endpoint")]
    pub endpoint: String,
    /// Base URL of the Cloud Storage JSON API, used to stage `gs://` files.
    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Where the OAuth access token comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding a bearer access token.
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,
}

/// Python toolchain used to run the Beam module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_dataflow_endpoint() -> String {
    "https://dataflow.googleapis.com".to_string()
}

fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_timeout() -> u32 {
    60
}

fn default_connect_timeout() -> u32 {
    10
}

fn default_token_env_var() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl DataflowConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds as u64)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds as u64)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for DataflowConfig {
    fn default() -> Self {
        Self {
            endpoint: default_dataflow_endpoint(),
            storage_endpoint: default_storage_endpoint(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env_var: default_token_env_var(),
        }
    }
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
        }
    }
}
