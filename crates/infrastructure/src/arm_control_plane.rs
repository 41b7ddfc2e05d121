use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use elevar_application::{
    ActivationRequest, ActivationResponse, ActiveAssignmentInstance, ControlPlaneClient,
    EligibilityInstance, PolicyAssignmentRecord, PolicyRecord, PolicyRule, RoleDefinitionRecord,
    SubscriptionRecord,
};
use elevar_core::{AppError, AppResult, AuthContext};
use elevar_domain::MembershipType;

const ROLE_MANAGEMENT_API_VERSION: &str = "2020-10-01";
const ROLE_DEFINITIONS_API_VERSION: &str = "2022-04-01";
const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";

/// Azure Resource Manager implementation of the control-plane port.
///
/// Owns the wire formats: bearer authentication, `nextLink` pagination and
/// the standard error envelope. The HTTP client is built by the caller so
/// the timeout policy stays in one place.
pub struct ArmControlPlane {
    http_client: reqwest::Client,
    base_url: String,
}

impl ArmControlPlane {
    /// Creates an adapter against the given management endpoint.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http_client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, ctx: &AuthContext, url: &str) -> AppResult<T> {
        debug!(url, "control-plane GET");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(ctx.credential())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("control-plane request failed: {error}"))
            })?;

        decode_response(response).await
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        ctx: &AuthContext,
        first_url: String,
    ) -> AppResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next_url = Some(first_url);

        while let Some(url) = next_url {
            let page: PagedResponse<T> = self.get_json(ctx, &url).await?;
            items.extend(page.value);
            next_url = page.next_link;
        }

        Ok(items)
    }
}

#[async_trait]
impl ControlPlaneClient for ArmControlPlane {
    async fn list_eligibility_instances(
        &self,
        ctx: &AuthContext,
    ) -> AppResult<Vec<EligibilityInstance>> {
        let url = format!(
            "{}/providers/Microsoft.Authorization/roleEligibilityScheduleInstances?api-version={ROLE_MANAGEMENT_API_VERSION}&$filter=asTarget()",
            self.base_url
        );
        let resources: Vec<EligibilityInstanceResource> = self.get_all_pages(ctx, url).await?;

        Ok(resources
            .into_iter()
            .map(EligibilityInstanceResource::into_record)
            .collect())
    }

    async fn get_role_definition(
        &self,
        ctx: &AuthContext,
        role_definition_id: &str,
    ) -> AppResult<RoleDefinitionRecord> {
        let url = format!(
            "{}{role_definition_id}?api-version={ROLE_DEFINITIONS_API_VERSION}",
            self.base_url
        );
        let resource: RoleDefinitionResource = self.get_json(ctx, &url).await?;

        Ok(RoleDefinitionRecord {
            role_name: resource.properties.role_name,
        })
    }

    async fn get_policy(&self, ctx: &AuthContext, policy_id: &str) -> AppResult<PolicyRecord> {
        let url = format!(
            "{}{policy_id}?api-version={ROLE_MANAGEMENT_API_VERSION}",
            self.base_url
        );
        let resource: PolicyResource = self.get_json(ctx, &url).await?;

        Ok(PolicyRecord {
            effective_rules: resource
                .properties
                .effective_rules
                .into_iter()
                .map(|rule| PolicyRule {
                    id: rule.id,
                    maximum_duration: rule.maximum_duration,
                })
                .collect(),
        })
    }

    async fn list_policy_assignments(
        &self,
        ctx: &AuthContext,
        scope: &str,
        role_definition_id: &str,
    ) -> AppResult<Vec<PolicyAssignmentRecord>> {
        let url = format!(
            "{}{scope}/providers/Microsoft.Authorization/roleManagementPolicyAssignments?api-version={ROLE_MANAGEMENT_API_VERSION}&$filter=roleDefinitionId%20eq%20'{role_definition_id}'",
            self.base_url
        );
        let resources: Vec<PolicyAssignmentResource> = self.get_all_pages(ctx, url).await?;

        Ok(resources
            .into_iter()
            .map(|resource| PolicyAssignmentRecord {
                policy_id: resource.properties.policy_id,
            })
            .collect())
    }

    async fn list_active_assignment_instances(
        &self,
        ctx: &AuthContext,
        scope: &str,
    ) -> AppResult<Vec<ActiveAssignmentInstance>> {
        let url = format!(
            "{}{scope}/providers/Microsoft.Authorization/roleAssignmentScheduleInstances?api-version={ROLE_MANAGEMENT_API_VERSION}&$filter=asTarget()",
            self.base_url
        );
        let resources: Vec<ActiveAssignmentResource> = self.get_all_pages(ctx, url).await?;

        Ok(resources
            .into_iter()
            .map(|resource| ActiveAssignmentInstance {
                role_definition_id: resource.properties.role_definition_id,
                scope: resource.properties.scope.unwrap_or_else(|| scope.to_owned()),
            })
            .collect())
    }

    async fn put_activation_request(
        &self,
        ctx: &AuthContext,
        scope: &str,
        request_id: &str,
        request: ActivationRequest,
    ) -> AppResult<ActivationResponse> {
        let url = format!(
            "{}{scope}/providers/Microsoft.Authorization/roleAssignmentScheduleRequests/{request_id}?api-version={ROLE_MANAGEMENT_API_VERSION}",
            self.base_url
        );
        let body = json!({
            "properties": {
                "principalId": request.principal_id,
                "roleDefinitionId": request.role_definition_id,
                "requestType": "SelfActivate",
                "justification": request.justification,
                "linkedRoleEligibilityScheduleId": request.linked_eligibility_schedule_id,
                "scheduleInfo": {
                    "startDateTime": request.start_date_time.to_rfc3339(),
                    "expiration": {
                        "type": "AfterDuration",
                        "duration": request.duration,
                    },
                },
            },
        });

        debug!(url, "control-plane PUT");
        let response = self
            .http_client
            .put(url)
            .bearer_auth(ctx.credential())
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("control-plane request failed: {error}"))
            })?;

        let resource: ActivationRequestResource = decode_response(response).await?;
        Ok(ActivationResponse {
            status: resource.properties.status,
        })
    }

    async fn get_subscription(
        &self,
        ctx: &AuthContext,
        subscription_id: &str,
    ) -> AppResult<SubscriptionRecord> {
        let url = format!(
            "{}/subscriptions/{subscription_id}?api-version={SUBSCRIPTIONS_API_VERSION}",
            self.base_url
        );
        let resource: SubscriptionResource = self.get_json(ctx, &url).await?;

        Ok(SubscriptionRecord {
            display_name: resource.display_name,
        })
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        let error = map_error(status, &body);
        warn!(status = status.as_u16(), %error, "control-plane request rejected");
        return Err(error);
    }

    response.json::<T>().await.map_err(|error| {
        AppError::Internal(format!("failed to parse control-plane response body: {error}"))
    })
}

fn map_error(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ArmErrorEnvelope>(body)
        .map(|envelope| format!("{}: {}", envelope.error.code, envelope.error.message))
        .unwrap_or_else(|_| body.trim().to_owned());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        _ => AppError::Internal(format!(
            "control plane returned status {}: {detail}",
            status.as_u16()
        )),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArmErrorEnvelope {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct EligibilityInstanceResource {
    properties: EligibilityInstanceProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EligibilityInstanceProperties {
    role_definition_id: String,
    scope: String,
    principal_id: String,
    #[serde(default)]
    role_eligibility_schedule_id: String,
    #[serde(default)]
    policy_id: Option<String>,
    #[serde(default)]
    member_type: Option<String>,
}

impl EligibilityInstanceResource {
    fn into_record(self) -> EligibilityInstance {
        let properties = self.properties;
        EligibilityInstance {
            role_definition_id: properties.role_definition_id,
            scope: properties.scope,
            principal_id: properties.principal_id,
            eligibility_schedule_id: properties.role_eligibility_schedule_id,
            policy_id: properties.policy_id,
            membership_type: properties
                .member_type
                .as_deref()
                .map_or(MembershipType::Direct, MembershipType::from_transport),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoleDefinitionResource {
    properties: RoleDefinitionProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleDefinitionProperties {
    role_name: String,
}

#[derive(Debug, Deserialize)]
struct PolicyResource {
    properties: PolicyProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyProperties {
    #[serde(default = "Vec::new")]
    effective_rules: Vec<PolicyRuleResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyRuleResource {
    id: String,
    #[serde(default)]
    maximum_duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PolicyAssignmentResource {
    properties: PolicyAssignmentProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyAssignmentProperties {
    policy_id: String,
}

#[derive(Debug, Deserialize)]
struct ActiveAssignmentResource {
    properties: ActiveAssignmentProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveAssignmentProperties {
    role_definition_id: String,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivationRequestResource {
    properties: ActivationRequestProperties,
}

#[derive(Debug, Deserialize)]
struct ActivationRequestProperties {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResource {
    display_name: String,
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use elevar_core::AppError;
    use elevar_domain::MembershipType;

    use super::{EligibilityInstanceResource, PagedResponse, map_error};

    #[test]
    fn forbidden_responses_map_to_unauthorized_with_envelope_detail() {
        let body = json!({
            "error": {
                "code": "AuthorizationFailed",
                "message": "The client does not have authorization."
            }
        })
        .to_string();

        let error = map_error(StatusCode::FORBIDDEN, &body);
        assert!(matches!(error, AppError::Unauthorized(_)));
        assert!(error.to_string().contains("AuthorizationFailed"));
    }

    #[test]
    fn unparseable_error_bodies_fall_back_to_the_raw_text() {
        let error = map_error(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert!(matches!(error, AppError::Internal(_)));
        assert!(error.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn missing_resources_map_to_not_found() {
        let error = map_error(StatusCode::NOT_FOUND, "{}");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn eligibility_wire_records_decode_and_convert() {
        let raw = json!({
            "id": "/subscriptions/S1/providers/Microsoft.Authorization/roleEligibilityScheduleInstances/i-1",
            "properties": {
                "roleDefinitionId": "/providers/Microsoft.Authorization/roleDefinitions/abc",
                "scope": "/subscriptions/S1",
                "principalId": "principal-1",
                "roleEligibilityScheduleId": "/subscriptions/S1/providers/Microsoft.Authorization/roleEligibilitySchedules/s-1",
                "memberType": "Group"
            }
        });

        let resource: Result<EligibilityInstanceResource, _> = serde_json::from_value(raw);
        let Ok(resource) = resource else {
            panic!("wire record must decode");
        };
        let record = resource.into_record();
        assert_eq!(record.scope, "/subscriptions/S1");
        assert_eq!(record.membership_type, MembershipType::Group);
        assert_eq!(record.policy_id, None);
    }

    #[test]
    fn pages_without_a_value_array_decode_as_empty() {
        let page: Result<PagedResponse<EligibilityInstanceResource>, _> =
            serde_json::from_value(json!({ "nextLink": null }));
        let Ok(page) = page else {
            panic!("page must decode");
        };
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }
}
