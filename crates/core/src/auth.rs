use std::fmt::{Debug, Formatter};

/// Authenticated principal context threaded through every control-plane call.
///
/// Carries the bearer credential together with the identity it belongs to.
/// Always passed explicitly; services never reach for an ambient session.
#[derive(Clone)]
pub struct AuthContext {
    credential: String,
    principal_id: String,
    user_name: Option<String>,
    tenant_id: Option<String>,
}

impl AuthContext {
    /// Creates an auth context from an acquired credential and principal data.
    #[must_use]
    pub fn new(
        credential: impl Into<String>,
        principal_id: impl Into<String>,
        user_name: Option<String>,
        tenant_id: Option<String>,
    ) -> Self {
        Self {
            credential: credential.into(),
            principal_id: principal_id.into(),
            user_name,
            tenant_id,
        }
    }

    /// Returns the bearer credential for control-plane requests.
    #[must_use]
    pub fn credential(&self) -> &str {
        self.credential.as_str()
    }

    /// Returns the object id of the current principal.
    #[must_use]
    pub fn principal_id(&self) -> &str {
        self.principal_id.as_str()
    }

    /// Returns the user principal name, if the provider returned one.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Returns the tenant the credential was issued for, if known.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}

impl Debug for AuthContext {
    // Credential stays out of logs and panic output.
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthContext")
            .field("credential", &"<redacted>")
            .field("principal_id", &self.principal_id)
            .field("user_name", &self.user_name)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}
