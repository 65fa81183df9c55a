//! Credential resolution from configuration.
//!
//! The access token is read from the environment at call time and wrapped
//! in a `SecureString` so it never reaches the logs.

use super::types::AuthConfig;

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Status of access token resolution.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
    /// Token resolved successfully.
    Configured(SecureString),
    /// Token is missing or empty.
    Unconfigured {
        /// Reason for missing configuration.
        reason: String,
    },
}

impl CredentialStatus {
    /// The resolved token, if any.
    pub fn token(&self) -> Option<SecureString> {
        match self {
            CredentialStatus::Configured(token) => Some(token.clone()),
            CredentialStatus::Unconfigured { .. } => None,
        }
    }
}

impl AuthConfig {
    /// Resolve the access token from the configured environment variable.
    ///
    /// Not cached: a token refreshed between runs is picked up without
    /// touching the config file.
    pub fn resolve_credential(&self) -> CredentialStatus {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> CredentialStatus {
        match lookup(&self.token_env_var) {
            Some(token) if !token.trim().is_empty() => {
                CredentialStatus::Configured(SecureString::new(token.trim().to_string()))
            }
            Some(_) => CredentialStatus::Unconfigured {
                reason: format!("{} is empty", self.token_env_var),
            },
            None => CredentialStatus::Unconfigured {
                reason: format!("{} is not set", self.token_env_var),
            },
        }
    }
}
