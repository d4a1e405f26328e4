//! Credential sourcing for the import request.
//!
//! The target's import API wants forge credentials in a format the scraping
//! session does not produce, so they are supplied by a dedicated provider
//! chosen once at pipeline start (interactive prompt, environment, or fixed
//! values) rather than prompted for in the middle of a run.

use thiserror::Error;

/// Environment variable holding the forge username for the import request.
pub const USERNAME_VAR: &str = "EXODUS_VCS_USERNAME";
/// Environment variable holding the forge password for the import request.
pub const PASSWORD_VAR: &str = "EXODUS_VCS_PASSWORD";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("failed to read credentials: {0}")]
    Io(#[from] std::io::Error),
}

/// A username/password pair for the source repository checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsCredentials {
    pub username: String,
    pub password: String,
}

/// Source of VCS credentials for the import request.
///
/// Only consulted for git projects; subversion imports go through the
/// forge's anonymous read-only endpoint.
pub trait CredentialProvider: Send + Sync {
    fn vcs_credentials(&self) -> Result<VcsCredentials, CredentialError>;
}

/// Fixed credentials known up front.
pub struct StaticCredentials {
    credentials: VcsCredentials,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: VcsCredentials {
                username: username.into(),
                password: password.into(),
            },
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn vcs_credentials(&self) -> Result<VcsCredentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

/// Credentials read from the environment at the moment they are needed.
pub struct EnvCredentials {
    username_var: String,
    password_var: String,
}

impl EnvCredentials {
    pub fn from_vars(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Whether both variables are present in the environment.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        std::env::var(&self.username_var).is_ok() && std::env::var(&self.password_var).is_ok()
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::from_vars(USERNAME_VAR, PASSWORD_VAR)
    }
}

impl CredentialProvider for EnvCredentials {
    fn vcs_credentials(&self) -> Result<VcsCredentials, CredentialError> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| CredentialError::MissingEnv(var.to_string()))
        };
        Ok(VcsCredentials {
            username: read(&self.username_var)?,
            password: read(&self.password_var)?,
        })
    }
}
