//! Application services and ports.

#![forbid(unsafe_code)]

mod caches;
mod elevation_ports;
mod elevation_service;

pub use caches::{RoleNameCache, SubscriptionNameCache};
pub use elevation_ports::{
    ActivationRequest, ActivationResponse, ActiveAssignmentInstance, AuthContextProvider,
    ControlPlaneClient, EligibilityInstance, PolicyAssignmentRecord, PolicyRecord, PolicyRule,
    RoleDefinitionRecord, SubscriptionRecord,
};
pub use elevation_service::{
    ActivateEligibleRolesInput, ActivationEngine, EligibilityScanner, ElevationService,
    PolicyDurationResolver, RoleCatalogResolver,
};
