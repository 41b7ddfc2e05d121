//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod duration;
mod elevation;
mod scope;

pub use duration::{DEFAULT_MAX_ACTIVATION_HOURS, format_hours, parse_activation_duration};
pub use elevation::{
    ActivationResult, ActivationStatus, ActivationSummary, BatchActivationReport,
    EligibleRoleAssignment, MembershipType, dedupe_by_role_and_scope,
};
pub use scope::{ScopeDetails, ScopeLevel, scope_matches_filter};
