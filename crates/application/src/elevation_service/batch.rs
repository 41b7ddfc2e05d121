use std::collections::BTreeSet;

use elevar_core::{AppError, AppResult, AuthContext};
use elevar_domain::{BatchActivationReport, EligibleRoleAssignment, dedupe_by_role_and_scope};

use super::{ActivateEligibleRolesInput, ElevationService};

impl ElevationService {
    /// Lists the current principal's eligible roles, enriched with scope
    /// metadata and the policy maximum duration per entry.
    ///
    /// Sorted by `(scope, role name)` for stable output.
    pub async fn list_eligible(
        &self,
        ctx: &AuthContext,
        include_scope_details: bool,
    ) -> AppResult<Vec<EligibleRoleAssignment>> {
        let mut assignments = self
            .scanner
            .scan(ctx, None, None, include_scope_details)
            .await?;

        assignments.sort_by(|left, right| {
            left.scope
                .cmp(&right.scope)
                .then_with(|| left.role_name.cmp(&right.role_name))
        });

        for assignment in &mut assignments {
            let hours = self
                .policy
                .max_hours(
                    ctx,
                    &assignment.scope,
                    &assignment.role_definition_id,
                    assignment.policy_id.as_deref(),
                )
                .await;
            assignment.max_hours = Some(hours);
        }

        Ok(assignments)
    }

    /// Activates the eligible roles selected by the input, strictly
    /// sequentially, and reports every outcome.
    ///
    /// Validation and the eligibility scan are fail-fast; once the batch
    /// starts, a failing role is recorded and processing continues. Result
    /// order matches the deduplicated scan order.
    pub async fn activate_eligible(
        &self,
        ctx: &AuthContext,
        input: ActivateEligibleRolesInput,
    ) -> AppResult<BatchActivationReport> {
        validate_input(&input)?;

        let filter_scopes: Option<BTreeSet<String>> = if input.activate_all || input.scopes.is_empty()
        {
            None
        } else {
            Some(input.scopes.iter().cloned().collect())
        };
        let filter_role_names: Option<BTreeSet<String>> = if input.role_names.is_empty() {
            None
        } else {
            Some(input.role_names.iter().cloned().collect())
        };

        let scanned = self
            .scanner
            .scan(ctx, filter_scopes.as_ref(), filter_role_names.as_ref(), false)
            .await?;
        let roles = dedupe_by_role_and_scope(scanned);

        if roles.is_empty() {
            return Ok(BatchActivationReport::empty(
                "no eligible role assignments matched the request",
            ));
        }

        let mut activations = Vec::with_capacity(roles.len());
        for role in &roles {
            let result = self
                .engine
                .activate(ctx, role, input.justification.trim(), input.duration_hours)
                .await;
            activations.push(result);
        }

        Ok(BatchActivationReport::tally(activations))
    }
}

fn validate_input(input: &ActivateEligibleRolesInput) -> AppResult<()> {
    if input.justification.trim().is_empty() {
        return Err(AppError::Validation(
            "justification is required for role activation".to_owned(),
        ));
    }

    if !input.activate_all && input.scopes.is_empty() && input.role_names.is_empty() {
        return Err(AppError::Validation(
            "either activate_all or at least one scope or role-name filter is required".to_owned(),
        ));
    }

    Ok(())
}
