use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use elevar_core::{AppError, AuthContext};
use elevar_domain::{ActivationResult, ActivationStatus, EligibleRoleAssignment, format_hours};

use crate::elevation_ports::{ActivationRequest, ControlPlaneClient};

use super::PolicyDurationResolver;

const PENDING_APPROVAL_STATUS: &str = "PendingApproval";
const ALREADY_ACTIVE_MESSAGE: &str = "Already active";
const PENDING_APPROVAL_MESSAGE: &str = "Activation pending approval";

/// One classification rule applied to control-plane failure text.
struct OutcomeRule {
    needles: &'static [&'static str],
    status: ActivationStatus,
    message: &'static str,
}

/// Ordered rules matched case-insensitively against the failure text; the
/// first match wins and anything unmatched stays `Failed` with the raw
/// text. Status-code classification happens upstream in the adapter; these
/// needles cover the provider's error codes plus free-text fallbacks.
const OUTCOME_RULES: &[OutcomeRule] = &[
    OutcomeRule {
        needles: &[
            "roleassignmentexists",
            "activedurationtooshort",
            "already active",
            "assignment already exists",
        ],
        status: ActivationStatus::Skipped,
        message: ALREADY_ACTIVE_MESSAGE,
    },
    OutcomeRule {
        needles: &["pendingapproval", "pending approval"],
        status: ActivationStatus::PendingApproval,
        message: PENDING_APPROVAL_MESSAGE,
    },
];

/// Drives one role activation through its state machine.
#[derive(Clone)]
pub struct ActivationEngine {
    control_plane: Arc<dyn ControlPlaneClient>,
    policy: PolicyDurationResolver,
}

impl ActivationEngine {
    /// Creates an engine over a control-plane client and policy resolver.
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlaneClient>, policy: PolicyDurationResolver) -> Self {
        Self {
            control_plane,
            policy,
        }
    }

    /// Attempts to activate one eligible role and classifies the outcome.
    ///
    /// Never returns an error: per-role failures are recorded in the result
    /// so a batch always runs to completion. Each role is attempted exactly
    /// once per invocation.
    pub async fn activate(
        &self,
        ctx: &AuthContext,
        role: &EligibleRoleAssignment,
        justification: &str,
        requested_hours: i64,
    ) -> ActivationResult {
        if self.currently_active(ctx, role).await {
            return ActivationResult {
                role_name: role.role_name.clone(),
                scope: role.scope.clone(),
                status: ActivationStatus::Skipped,
                message: ALREADY_ACTIVE_MESSAGE.to_owned(),
                duration_iso8601: format_hours(0),
                request_id: None,
            };
        }

        let policy_max = self
            .policy
            .max_hours(ctx, &role.scope, &role.role_definition_id, role.policy_id.as_deref())
            .await;
        let (resolved_hours, capped) = resolve_requested_hours(requested_hours, policy_max);
        let duration = format_hours(resolved_hours);

        let request_id = Uuid::new_v4().to_string();
        let request = ActivationRequest {
            principal_id: role.principal_id.clone(),
            role_definition_id: role.role_definition_id.clone(),
            linked_eligibility_schedule_id: Some(role.eligibility_schedule_id.clone()),
            justification: justification.to_owned(),
            start_date_time: Utc::now(),
            duration: duration.clone(),
        };

        match self
            .control_plane
            .put_activation_request(ctx, &role.scope, &request_id, request)
            .await
        {
            Ok(response) if response.status.as_deref() == Some(PENDING_APPROVAL_STATUS) => {
                ActivationResult {
                    role_name: role.role_name.clone(),
                    scope: role.scope.clone(),
                    status: ActivationStatus::PendingApproval,
                    message: PENDING_APPROVAL_MESSAGE.to_owned(),
                    duration_iso8601: duration,
                    request_id: Some(request_id),
                }
            }
            Ok(_) => ActivationResult {
                role_name: role.role_name.clone(),
                scope: role.scope.clone(),
                status: ActivationStatus::Success,
                message: if capped {
                    format!(
                        "Activation submitted (requested {requested_hours}h capped to policy maximum {policy_max}h)"
                    )
                } else {
                    "Activation submitted".to_owned()
                },
                duration_iso8601: duration,
                request_id: Some(request_id),
            },
            Err(error) => {
                let (status, message) = classify_submission_failure(&error);
                ActivationResult {
                    role_name: role.role_name.clone(),
                    scope: role.scope.clone(),
                    status,
                    message,
                    duration_iso8601: duration,
                    request_id: Some(request_id),
                }
            }
        }
    }

    // Best-effort race reduction; the check and the submission are not
    // atomic against the control plane, so submission-time classification
    // remains the second line of defense. A failed check falls through to
    // submission.
    async fn currently_active(&self, ctx: &AuthContext, role: &EligibleRoleAssignment) -> bool {
        match self
            .control_plane
            .list_active_assignment_instances(ctx, &role.scope)
            .await
        {
            Ok(instances) => instances.iter().any(|instance| {
                instance.role_definition_id == role.role_definition_id
                    && instance.scope == role.scope
            }),
            Err(_) => false,
        }
    }
}

fn resolve_requested_hours(requested_hours: i64, policy_max: u32) -> (u32, bool) {
    if requested_hours <= 0 {
        return (policy_max, false);
    }

    let requested = u32::try_from(requested_hours).unwrap_or(u32::MAX);
    if requested > policy_max {
        (policy_max, true)
    } else {
        (requested, false)
    }
}

fn classify_submission_failure(error: &AppError) -> (ActivationStatus, String) {
    let text = error.to_string();
    let lowered = text.to_lowercase();

    for rule in OUTCOME_RULES {
        if rule.needles.iter().any(|needle| lowered.contains(needle)) {
            return (rule.status, rule.message.to_owned());
        }
    }

    (ActivationStatus::Failed, text)
}
