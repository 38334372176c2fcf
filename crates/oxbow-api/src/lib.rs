//! Oxbow Control-Plane API
//!
//! Typed client layer for the Oxbow control plane. The API is
//! asynchronous and eventually consistent: mutating calls return
//! immediately with a batch of in-flight [`Operation`]s, and callers are
//! expected to wait for those to reach a terminal status (see the
//! `oxbow-ops` crate) before acting on the result.
//!
//! Resources without a single-field primary key on the backend (roles,
//! databases, permission grants, VPC endpoint links) are addressed
//! through the composite identifiers in [`id`].

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod models;

// Re-exports
pub use client::{Api, OperationSource};
pub use config::{ApiConfig, DEFAULT_API_BASE};
pub use error::{ApiError, Result};
pub use id::{DatabaseId, OrgVpcEndpointId, ProjectPermissionId, ProjectVpcEndpointId, RoleId};
pub use models::{Branch, Operation, OperationStatus, Role};
