//! Adapter implementations for external services.

#![forbid(unsafe_code)]

mod arm_control_plane;
mod env_auth_context_provider;

pub use arm_control_plane::ArmControlPlane;
pub use env_auth_context_provider::EnvAuthContextProvider;
