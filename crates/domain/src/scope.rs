use serde::{Deserialize, Serialize};

/// Depth of a role-assignment scope within the resource hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeLevel {
    /// Scope targets a whole subscription.
    Subscription,
    /// Scope targets a resource group.
    ResourceGroup,
    /// Scope targets an individual resource.
    Resource,
    /// Scope path did not match any known shape.
    Unknown,
}

impl ScopeLevel {
    /// Returns a stable transport value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::ResourceGroup => "resourceGroup",
            Self::Resource => "resource",
            Self::Unknown => "unknown",
        }
    }
}

/// Decomposition of a hierarchical scope path.
///
/// A missing suffix leaves the decomposition at the deepest level that did
/// resolve; a path that is not subscription-rooted is `Unknown` throughout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDetails {
    /// Deepest hierarchy level the path resolved to.
    pub level: ScopeLevel,
    /// Subscription id segment, when present.
    pub subscription_id: Option<String>,
    /// Resource group name segment, when present.
    pub resource_group_name: Option<String>,
    /// Resource name segment, when present.
    pub resource_name: Option<String>,
}

impl ScopeDetails {
    /// Decomposes a scope path of the form
    /// `/subscriptions/{id}[/resourceGroups/{rg}[/providers/{p}/{type}/{name}]]`.
    #[must_use]
    pub fn parse(scope: &str) -> Self {
        let segments: Vec<&str> = scope.split('/').filter(|part| !part.is_empty()).collect();

        let unknown = Self {
            level: ScopeLevel::Unknown,
            subscription_id: None,
            resource_group_name: None,
            resource_name: None,
        };

        if segments.len() < 2 || !segments[0].eq_ignore_ascii_case("subscriptions") {
            return unknown;
        }

        let mut details = Self {
            level: ScopeLevel::Subscription,
            subscription_id: Some(segments[1].to_owned()),
            resource_group_name: None,
            resource_name: None,
        };

        if segments.len() < 4 || !segments[2].eq_ignore_ascii_case("resourcegroups") {
            return details;
        }

        details.level = ScopeLevel::ResourceGroup;
        details.resource_group_name = Some(segments[3].to_owned());

        // Resource shape is providers/{namespace}/{type}/{name}; deeper child
        // resources keep extending in (type, name) pairs, so the resource
        // name is always the final segment.
        if segments.len() < 8 || !segments[4].eq_ignore_ascii_case("providers") {
            return details;
        }

        details.level = ScopeLevel::Resource;
        details.resource_name = segments.last().map(|segment| (*segment).to_owned());

        details
    }
}

/// Returns whether `scope` equals the filter scope or is a strict path
/// descendant of it.
///
/// Matching is segment-aware: a sibling scope sharing a raw string prefix
/// (`/subscriptions/S11` against filter `/subscriptions/S1`) never matches.
#[must_use]
pub fn scope_matches_filter(scope: &str, filter: &str) -> bool {
    let scope = scope.trim_end_matches('/');
    let filter = filter.trim_end_matches('/');

    if filter.is_empty() {
        return false;
    }

    scope == filter
        || (scope.len() > filter.len()
            && scope.starts_with(filter)
            && scope.as_bytes()[filter.len()] == b'/')
}
