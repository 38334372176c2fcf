//! Wire types for the control-plane API
//!
//! Mutating endpoints return their primary result together with the batch
//! of asynchronous operations the backend scheduled for it; see
//! [`crate::client::Api`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of asynchronous backend work spawned by a mutating call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Operation identifier, unique within its project
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Branch the operation acts on, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,

    /// What the backend is doing (e.g. "create_branch", "apply_config")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Current lifecycle state, server-owned
    pub status: OperationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of an [`Operation`]
///
/// Transitions happen entirely server-side; clients only observe
/// snapshots. Statuses this client does not know about are folded into
/// [`OperationStatus::Other`] and treated as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Queued, not yet picked up by a worker
    Scheduling,
    /// In progress
    Running,
    /// Completed successfully
    Finished,
    /// Completed with an error
    Failed,
    /// Any status value this client does not recognize
    #[serde(other)]
    Other,
}

impl OperationStatus {
    /// Whether no further state transition can occur.
    ///
    /// Only `scheduling` and `running` are non-terminal; everything else,
    /// including unrecognized values, counts as finished for tracking.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationStatus::Scheduling | OperationStatus::Running)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Scheduling => write!(f, "scheduling"),
            OperationStatus::Running => write!(f, "running"),
            OperationStatus::Finished => write!(f, "finished"),
            OperationStatus::Failed => write!(f, "failed"),
            OperationStatus::Other => write!(f, "other"),
        }
    }
}

/// A compute branch within a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub project_id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A database role scoped to a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub branch_id: String,
    pub name: String,

    #[serde(default)]
    pub protected: bool,
}

/// Request body for branch creation
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateBranchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Request body for role creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

/// Envelope returned by branch mutations
#[derive(Debug, Clone, Deserialize)]
pub struct BranchResponse {
    pub branch: Branch,

    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Envelope returned by role mutations
#[derive(Debug, Clone, Deserialize)]
pub struct RoleResponse {
    pub role: Role,

    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Envelope returned by the operation-status lookup
#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    pub operation: Operation,
}

/// Envelope returned by the operation list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct OperationsResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
}
