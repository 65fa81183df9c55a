mod credentials;
mod loader;
mod types;

pub use credentials::{CredentialStatus, SecureString};
pub use loader::{ConfigError, CONFIG_PATH_ENV};
pub use types::{AuthConfig, Config, DataflowConfig, PythonConfig, RetryConfig};
