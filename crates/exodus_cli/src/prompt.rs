//! Interactive credential prompt for the import request.

use std::io::{self, Write};

use exodus::credentials::{CredentialError, CredentialProvider, VcsCredentials};

/// Prompts on the terminal, once, when the import request is being built.
pub struct PromptCredentials {
    host: String,
}

impl PromptCredentials {
    /// `host` is shown in the prompt so the operator knows which account
    /// is being asked for.
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl CredentialProvider for PromptCredentials {
    fn vcs_credentials(&self) -> Result<VcsCredentials, CredentialError> {
        print!("{} username: ", self.host);
        io::stdout().flush()?;
        let mut username = String::new();
        io::stdin().read_line(&mut username)?;

        let password = rpassword::prompt_password(format!("{} password: ", self.host))?;

        Ok(VcsCredentials {
            username: username.trim().to_string(),
            password,
        })
    }
}
