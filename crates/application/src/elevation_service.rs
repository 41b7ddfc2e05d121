use std::sync::Arc;

use crate::caches::{RoleNameCache, SubscriptionNameCache};
use crate::elevation_ports::ControlPlaneClient;

mod batch;
mod catalog;
mod engine;
mod policy;
mod scanner;

pub use catalog::RoleCatalogResolver;
pub use engine::ActivationEngine;
pub use policy::PolicyDurationResolver;
pub use scanner::EligibilityScanner;

/// Input payload for batch role activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateEligibleRolesInput {
    /// Activate every eligible role, ignoring the scope filter.
    pub activate_all: bool,
    /// Scope filters; a record matches when its scope equals a filter or is
    /// a strict path descendant of one.
    pub scopes: Vec<String>,
    /// Exact, case-sensitive role display-name filters.
    pub role_names: Vec<String>,
    /// Human-supplied justification; required and non-empty.
    pub justification: String,
    /// Requested activation duration in hours; zero or negative requests
    /// the policy maximum.
    pub duration_hours: i64,
}

/// Application service driving the elevation workflow end to end.
#[derive(Clone)]
pub struct ElevationService {
    scanner: EligibilityScanner,
    policy: PolicyDurationResolver,
    engine: ActivationEngine,
}

impl ElevationService {
    /// Creates the full service graph over one control-plane client, with
    /// fresh per-run caches.
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlaneClient>) -> Self {
        let role_names = Arc::new(RoleNameCache::new());
        let subscription_names = Arc::new(SubscriptionNameCache::new());
        let catalog = RoleCatalogResolver::new(control_plane.clone(), role_names);
        let scanner =
            EligibilityScanner::new(control_plane.clone(), catalog, subscription_names);
        let policy = PolicyDurationResolver::new(control_plane.clone());
        let engine = ActivationEngine::new(control_plane, policy.clone());

        Self {
            scanner,
            policy,
            engine,
        }
    }
}
