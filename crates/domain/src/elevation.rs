use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scope::ScopeLevel;

/// How a principal came to hold an eligibility grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipType {
    /// Eligibility granted to the principal directly.
    Direct,
    /// Eligibility inherited through a group membership.
    Group,
}

impl MembershipType {
    /// Parses a transport value; anything that is not a group grant counts
    /// as direct.
    #[must_use]
    pub fn from_transport(value: &str) -> Self {
        if value.eq_ignore_ascii_case("group") {
            Self::Group
        } else {
            Self::Direct
        }
    }
}

/// One (principal, role definition, scope) eligibility grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleRoleAssignment {
    /// Resolved role display name; falls back to the raw identifier suffix.
    pub role_name: String,
    /// Stable opaque role-definition identifier.
    pub role_definition_id: String,
    /// Hierarchical scope path the grant applies to.
    pub scope: String,
    /// Identifier of the eligibility schedule backing this grant.
    pub eligibility_schedule_id: String,
    /// Reference to the governing management policy, when the control plane
    /// returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Principal the grant targets.
    pub principal_id: String,
    /// Direct grant or group-derived grant.
    pub membership_type: MembershipType,
    /// Depth of the scope path, when decomposition was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_level: Option<ScopeLevel>,
    /// Subscription id extracted from the scope path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Subscription display name, when it could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_name: Option<String>,
    /// Resource group name extracted from the scope path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
    /// Resource name extracted from the scope path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Policy-resolved maximum activation duration, populated by listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hours: Option<u32>,
}

/// Removes duplicate grants sharing a `(role name, scope)` key.
///
/// First occurrence wins and input order is otherwise preserved, so batch
/// results stay aligned with the scan order.
#[must_use]
pub fn dedupe_by_role_and_scope(
    assignments: Vec<EligibleRoleAssignment>,
) -> Vec<EligibleRoleAssignment> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(assignments.len());
    assignments
        .into_iter()
        .filter(|assignment| {
            seen.insert((assignment.role_name.clone(), assignment.scope.clone()))
        })
        .collect()
}

/// Outcome category of one activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationStatus {
    /// Activation request accepted and granted.
    Success,
    /// Activation request accepted but waiting on an approver.
    PendingApproval,
    /// Nothing submitted; the role was already active.
    Skipped,
    /// Submission failed.
    Failed,
}

impl ActivationStatus {
    /// Returns whether the attempt counts as a successful submission.
    ///
    /// Pending approvals count: the request was accepted even though the
    /// grant itself is deferred.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Success | Self::PendingApproval)
    }
}

/// Outcome of one activation attempt within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    /// Role display name the attempt was for.
    pub role_name: String,
    /// Scope the attempt was for.
    pub scope: String,
    /// Outcome category.
    pub status: ActivationStatus,
    /// Human-readable outcome detail; raw error text on failure.
    pub message: String,
    /// Activation duration that was requested from the control plane.
    pub duration_iso8601: String,
    /// Identifier of the submitted request, when one was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Aggregate counts over one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSummary {
    /// Number of roles attempted.
    pub total: usize,
    /// Successful submissions, pending approvals included.
    pub successful: usize,
    /// Roles skipped because they were already active.
    pub skipped: usize,
    /// Roles whose submission failed.
    pub failed: usize,
}

/// Structured result of one batch activation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchActivationReport {
    /// Aggregate counts.
    pub summary: ActivationSummary,
    /// Per-role outcomes in input order.
    pub activations: Vec<ActivationResult>,
    /// Set when there was nothing to do, distinguishing an empty batch from
    /// an attempted-but-unsuccessful one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchActivationReport {
    /// Builds a report by tallying per-role outcomes.
    #[must_use]
    pub fn tally(activations: Vec<ActivationResult>) -> Self {
        let mut summary = ActivationSummary {
            total: activations.len(),
            ..ActivationSummary::default()
        };

        for activation in &activations {
            match activation.status {
                ActivationStatus::Success | ActivationStatus::PendingApproval => {
                    summary.successful += 1;
                }
                ActivationStatus::Skipped => summary.skipped += 1,
                ActivationStatus::Failed => summary.failed += 1,
            }
        }

        Self {
            summary,
            activations,
            message: None,
        }
    }

    /// Builds an all-zero report for a run that had nothing to activate.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            summary: ActivationSummary::default(),
            activations: Vec::new(),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActivationResult, ActivationStatus, BatchActivationReport, EligibleRoleAssignment,
        MembershipType, dedupe_by_role_and_scope,
    };

    fn assignment(role_name: &str, scope: &str) -> EligibleRoleAssignment {
        EligibleRoleAssignment {
            role_name: role_name.to_owned(),
            role_definition_id: format!("/providers/Microsoft.Authorization/roleDefinitions/{role_name}"),
            scope: scope.to_owned(),
            eligibility_schedule_id: "sched-1".to_owned(),
            policy_id: None,
            principal_id: "principal-1".to_owned(),
            membership_type: MembershipType::Direct,
            scope_level: None,
            subscription_id: None,
            subscription_name: None,
            resource_group_name: None,
            resource_name: None,
            max_hours: None,
        }
    }

    fn result(role_name: &str, status: ActivationStatus) -> ActivationResult {
        ActivationResult {
            role_name: role_name.to_owned(),
            scope: "/subscriptions/S1".to_owned(),
            status,
            message: String::new(),
            duration_iso8601: "PT8H".to_owned(),
            request_id: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_per_role_and_scope() {
        let deduped = dedupe_by_role_and_scope(vec![
            assignment("RoleA", "/subscriptions/X"),
            assignment("RoleA", "/subscriptions/X"),
            assignment("RoleB", "/subscriptions/Y"),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].role_name, "RoleA");
        assert_eq!(deduped[1].role_name, "RoleB");
    }

    #[test]
    fn same_role_on_different_scopes_is_not_a_duplicate() {
        let deduped = dedupe_by_role_and_scope(vec![
            assignment("RoleA", "/subscriptions/X"),
            assignment("RoleA", "/subscriptions/Y"),
        ]);

        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn tally_counts_pending_approval_as_successful() {
        let report = BatchActivationReport::tally(vec![
            result("RoleA", ActivationStatus::Success),
            result("RoleB", ActivationStatus::PendingApproval),
            result("RoleC", ActivationStatus::Skipped),
            result("RoleD", ActivationStatus::Failed),
        ]);

        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.message, None);
    }

    #[test]
    fn statuses_serialize_with_stable_names() {
        let rendered = serde_json::to_string(&ActivationStatus::PendingApproval)
            .unwrap_or_default();
        assert_eq!(rendered, "\"PendingApproval\"");
    }

    #[test]
    fn empty_report_carries_a_message_and_zero_counts() {
        let report = BatchActivationReport::empty("no eligible roles");
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.message.as_deref(), Some("no eligible roles"));
    }
}
