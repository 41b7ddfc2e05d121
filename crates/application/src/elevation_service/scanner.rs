use std::collections::BTreeSet;
use std::sync::Arc;

use elevar_core::{AppResult, AuthContext};
use elevar_domain::{EligibleRoleAssignment, ScopeDetails, scope_matches_filter};

use crate::caches::SubscriptionNameCache;
use crate::elevation_ports::ControlPlaneClient;

use super::RoleCatalogResolver;

/// Enumerates role-eligibility records for the current principal.
#[derive(Clone)]
pub struct EligibilityScanner {
    control_plane: Arc<dyn ControlPlaneClient>,
    catalog: RoleCatalogResolver,
    subscription_names: Arc<SubscriptionNameCache>,
}

impl EligibilityScanner {
    /// Creates a scanner over a control-plane client.
    #[must_use]
    pub fn new(
        control_plane: Arc<dyn ControlPlaneClient>,
        catalog: RoleCatalogResolver,
        subscription_names: Arc<SubscriptionNameCache>,
    ) -> Self {
        Self {
            control_plane,
            catalog,
            subscription_names,
        }
    }

    /// Scans eligibility records, optionally filtered by scope and role
    /// name, optionally enriched with scope-hierarchy metadata.
    ///
    /// Scope filters match equality or strict path descendants; role-name
    /// filters are exact and case-sensitive. Zero eligible roles is an
    /// empty list, not an error. No ordering is guaranteed; callers sort
    /// and deduplicate.
    pub async fn scan(
        &self,
        ctx: &AuthContext,
        filter_scopes: Option<&BTreeSet<String>>,
        filter_role_names: Option<&BTreeSet<String>>,
        include_scope_details: bool,
    ) -> AppResult<Vec<EligibleRoleAssignment>> {
        let instances = self.control_plane.list_eligibility_instances(ctx).await?;

        let mut assignments = Vec::with_capacity(instances.len());
        for instance in instances {
            let role_name = self.catalog.resolve(ctx, &instance.role_definition_id).await;

            if let Some(filter) = filter_role_names {
                if !filter.contains(role_name.as_str()) {
                    continue;
                }
            }

            if let Some(filters) = filter_scopes {
                if !filters
                    .iter()
                    .any(|filter| scope_matches_filter(&instance.scope, filter))
                {
                    continue;
                }
            }

            let mut assignment = EligibleRoleAssignment {
                role_name,
                role_definition_id: instance.role_definition_id,
                scope: instance.scope,
                eligibility_schedule_id: instance.eligibility_schedule_id,
                policy_id: instance.policy_id,
                principal_id: instance.principal_id,
                membership_type: instance.membership_type,
                scope_level: None,
                subscription_id: None,
                subscription_name: None,
                resource_group_name: None,
                resource_name: None,
                max_hours: None,
            };

            if include_scope_details {
                self.attach_scope_details(ctx, &mut assignment).await;
            }

            assignments.push(assignment);
        }

        Ok(assignments)
    }

    async fn attach_scope_details(&self, ctx: &AuthContext, assignment: &mut EligibleRoleAssignment) {
        let details = ScopeDetails::parse(&assignment.scope);
        assignment.scope_level = Some(details.level);
        assignment.resource_group_name = details.resource_group_name;
        assignment.resource_name = details.resource_name;

        if let Some(subscription_id) = details.subscription_id {
            assignment.subscription_name =
                self.subscription_display_name(ctx, &subscription_id).await;
            assignment.subscription_id = Some(subscription_id);
        }
    }

    // Display names are enrichment only; a failed lookup leaves the field
    // unset instead of failing the scan.
    async fn subscription_display_name(
        &self,
        ctx: &AuthContext,
        subscription_id: &str,
    ) -> Option<String> {
        if let Some(display_name) = self.subscription_names.get(subscription_id) {
            return Some(display_name);
        }

        match self.control_plane.get_subscription(ctx, subscription_id).await {
            Ok(record) => {
                self.subscription_names
                    .insert(subscription_id, &record.display_name);
                Some(record.display_name)
            }
            Err(_) => None,
        }
    }
}
