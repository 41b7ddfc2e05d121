use async_trait::async_trait;
use chrono::{DateTime, Utc};

use elevar_core::{AppResult, AuthContext};
use elevar_domain::MembershipType;

/// Raw role-eligibility record as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityInstance {
    /// Opaque role-definition identifier.
    pub role_definition_id: String,
    /// Scope path the eligibility applies to.
    pub scope: String,
    /// Principal the eligibility targets.
    pub principal_id: String,
    /// Identifier of the backing eligibility schedule.
    pub eligibility_schedule_id: String,
    /// Governing management policy reference, when the control plane
    /// returned one.
    pub policy_id: Option<String>,
    /// Direct grant or group-derived grant.
    pub membership_type: MembershipType,
}

/// Role-definition lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinitionRecord {
    /// Human-readable role display name.
    pub role_name: String,
}

/// One effective rule of a role management policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    /// Stable rule identifier within the policy.
    pub id: String,
    /// Maximum-duration value carried by expiration rules.
    pub maximum_duration: Option<String>,
}

/// Role management policy with its effective rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    /// Effective rules after policy inheritance.
    pub effective_rules: Vec<PolicyRule>,
}

/// Link between a (scope, role definition) pair and its governing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyAssignmentRecord {
    /// Reference to the governing policy resource.
    pub policy_id: String,
}

/// Currently active role-assignment instance at a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAssignmentInstance {
    /// Role definition the active assignment grants.
    pub role_definition_id: String,
    /// Scope the active assignment applies to.
    pub scope: String,
}

/// Subscription metadata used for scope enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    /// Subscription display name.
    pub display_name: String,
}

/// Self-activation request submitted to the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    /// Principal requesting the elevation.
    pub principal_id: String,
    /// Role definition being activated.
    pub role_definition_id: String,
    /// Eligibility schedule the activation is linked to.
    pub linked_eligibility_schedule_id: Option<String>,
    /// Human-supplied justification for the elevation.
    pub justification: String,
    /// Requested activation start.
    pub start_date_time: DateTime<Utc>,
    /// Requested activation duration as an ISO-8601 string.
    pub duration: String,
}

/// Control-plane response to an activation submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationResponse {
    /// Provisioning status reported by the control plane.
    pub status: Option<String>,
}

/// Port for the role-management surface of the cloud control plane.
///
/// Every call threads the caller's [`AuthContext`] explicitly; adapters own
/// transport, pagination and wire formats.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Lists eligibility records targeting the current principal, fully
    /// paginated.
    async fn list_eligibility_instances(
        &self,
        ctx: &AuthContext,
    ) -> AppResult<Vec<EligibilityInstance>>;

    /// Fetches a role definition by its identifier path.
    async fn get_role_definition(
        &self,
        ctx: &AuthContext,
        role_definition_id: &str,
    ) -> AppResult<RoleDefinitionRecord>;

    /// Fetches a role management policy with its effective rules.
    async fn get_policy(&self, ctx: &AuthContext, policy_id: &str) -> AppResult<PolicyRecord>;

    /// Lists policy assignments governing a role definition at a scope.
    async fn list_policy_assignments(
        &self,
        ctx: &AuthContext,
        scope: &str,
        role_definition_id: &str,
    ) -> AppResult<Vec<PolicyAssignmentRecord>>;

    /// Lists the current principal's active role-assignment instances at a
    /// scope.
    async fn list_active_assignment_instances(
        &self,
        ctx: &AuthContext,
        scope: &str,
    ) -> AppResult<Vec<ActiveAssignmentInstance>>;

    /// Submits a self-activation request as an idempotent PUT keyed by
    /// `request_id`.
    async fn put_activation_request(
        &self,
        ctx: &AuthContext,
        scope: &str,
        request_id: &str,
        request: ActivationRequest,
    ) -> AppResult<ActivationResponse>;

    /// Fetches subscription metadata for scope enrichment.
    async fn get_subscription(
        &self,
        ctx: &AuthContext,
        subscription_id: &str,
    ) -> AppResult<SubscriptionRecord>;
}

/// Port supplying the authenticated principal context.
#[async_trait]
pub trait AuthContextProvider: Send + Sync {
    /// Acquires a credential and the identity it belongs to.
    async fn acquire(&self) -> AppResult<AuthContext>;
}
