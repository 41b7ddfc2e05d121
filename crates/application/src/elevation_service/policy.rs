use std::sync::Arc;

use elevar_core::AuthContext;
use elevar_domain::{DEFAULT_MAX_ACTIVATION_HOURS, parse_activation_duration};

use crate::elevation_ports::{ControlPlaneClient, PolicyRule};

/// Rule identifier carrying the end-user activation expiration constraint.
const END_USER_EXPIRATION_RULE_ID: &str = "Expiration_EndUser_Assignment";

/// Resolves the maximum allowed activation duration for a role at a scope.
#[derive(Clone)]
pub struct PolicyDurationResolver {
    control_plane: Arc<dyn ControlPlaneClient>,
}

impl PolicyDurationResolver {
    /// Creates a resolver over a control-plane client.
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlaneClient>) -> Self {
        Self { control_plane }
    }

    /// Returns the policy maximum activation duration in whole hours.
    ///
    /// Prefers a direct policy fetch when a policy reference is known, then
    /// falls back to the policy assignments published at the scope. Duration
    /// caps are advisory, so every lookup or parse failure degrades to
    /// [`DEFAULT_MAX_ACTIVATION_HOURS`] instead of propagating.
    pub async fn max_hours(
        &self,
        ctx: &AuthContext,
        scope: &str,
        role_definition_id: &str,
        policy_id: Option<&str>,
    ) -> u32 {
        if let Some(policy_id) = policy_id {
            if let Some(hours) = self.hours_from_policy(ctx, policy_id).await {
                return hours;
            }
        }

        if let Some(hours) = self
            .hours_from_scope_assignments(ctx, scope, role_definition_id)
            .await
        {
            return hours;
        }

        DEFAULT_MAX_ACTIVATION_HOURS
    }

    async fn hours_from_policy(&self, ctx: &AuthContext, policy_id: &str) -> Option<u32> {
        let policy = self.control_plane.get_policy(ctx, policy_id).await.ok()?;
        expiration_hours(&policy.effective_rules)
    }

    async fn hours_from_scope_assignments(
        &self,
        ctx: &AuthContext,
        scope: &str,
        role_definition_id: &str,
    ) -> Option<u32> {
        let assignments = self
            .control_plane
            .list_policy_assignments(ctx, scope, role_definition_id)
            .await
            .ok()?;
        let assignment = assignments.into_iter().next()?;
        self.hours_from_policy(ctx, &assignment.policy_id).await
    }
}

fn expiration_hours(rules: &[PolicyRule]) -> Option<u32> {
    rules
        .iter()
        .find(|rule| rule.id == END_USER_EXPIRATION_RULE_ID)
        .and_then(|rule| rule.maximum_duration.as_deref())
        .and_then(parse_activation_duration)
}
