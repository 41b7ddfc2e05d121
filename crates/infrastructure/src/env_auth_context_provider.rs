use std::env;

use async_trait::async_trait;

use elevar_application::AuthContextProvider;
use elevar_core::{AppError, AppResult, AuthContext};

const ACCESS_TOKEN_VAR: &str = "AZURE_ACCESS_TOKEN";
const PRINCIPAL_ID_VAR: &str = "AZURE_PRINCIPAL_OBJECT_ID";
const USER_NAME_VAR: &str = "AZURE_USER_NAME";
const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";

/// Auth context provider backed by environment variables.
///
/// Token acquisition itself is out of scope; an outer login flow exports
/// the credential and principal identity before the agent runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvAuthContextProvider;

impl EnvAuthContextProvider {
    /// Creates the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthContextProvider for EnvAuthContextProvider {
    async fn acquire(&self) -> AppResult<AuthContext> {
        let credential = required_var(ACCESS_TOKEN_VAR)?;
        let principal_id = required_var(PRINCIPAL_ID_VAR)?;

        Ok(AuthContext::new(
            credential,
            principal_id,
            optional_var(USER_NAME_VAR),
            optional_var(TENANT_ID_VAR),
        ))
    }
}

fn required_var(name: &str) -> AppResult<String> {
    optional_var(name)
        .ok_or_else(|| AppError::Unauthorized(format!("{name} is not set; login first")))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
