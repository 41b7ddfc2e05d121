use std::sync::Arc;

use elevar_core::AuthContext;

use crate::caches::RoleNameCache;
use crate::elevation_ports::ControlPlaneClient;

const BUILTIN_ROLE_DEFINITION_PREFIX: &str = "/providers/Microsoft.Authorization/roleDefinitions";

/// Resolves opaque role-definition identifiers to display names, with a
/// per-run cache.
#[derive(Clone)]
pub struct RoleCatalogResolver {
    control_plane: Arc<dyn ControlPlaneClient>,
    cache: Arc<RoleNameCache>,
}

impl RoleCatalogResolver {
    /// Creates a resolver over a control-plane client and an injected cache.
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlaneClient>, cache: Arc<RoleNameCache>) -> Self {
        Self {
            control_plane,
            cache,
        }
    }

    /// Resolves a role-definition identifier to its display name.
    ///
    /// Tries the exact identifier path first, then the generic built-in
    /// path for the identifier's final segment (covers built-in roles
    /// referenced through a scoped alias). Resolution failure is degraded,
    /// never fatal: the raw final segment stands in for the name.
    pub async fn resolve(&self, ctx: &AuthContext, role_definition_id: &str) -> String {
        if let Some(role_name) = self.cache.get(role_definition_id) {
            return role_name;
        }

        let role_name = self.lookup(ctx, role_definition_id).await;
        self.cache.insert(role_definition_id, &role_name);
        role_name
    }

    async fn lookup(&self, ctx: &AuthContext, role_definition_id: &str) -> String {
        if let Ok(record) = self
            .control_plane
            .get_role_definition(ctx, role_definition_id)
            .await
        {
            return record.role_name;
        }

        let suffix = final_path_segment(role_definition_id);
        let builtin_id = format!("{BUILTIN_ROLE_DEFINITION_PREFIX}/{suffix}");
        if builtin_id != role_definition_id {
            if let Ok(record) = self.control_plane.get_role_definition(ctx, &builtin_id).await {
                return record.role_name;
            }
        }

        suffix.to_owned()
    }
}

fn final_path_segment(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::final_path_segment;

    #[test]
    fn final_segment_handles_paths_and_bare_values() {
        assert_eq!(
            final_path_segment("/subscriptions/S1/providers/Microsoft.Authorization/roleDefinitions/abc-123"),
            "abc-123"
        );
        assert_eq!(final_path_segment("abc-123"), "abc-123");
        assert_eq!(final_path_segment("/roleDefinitions/abc-123/"), "abc-123");
    }
}
