//! Control-plane API client
//!
//! Thin typed wrapper over the REST API using Bearer token
//! authentication. Mutating endpoints return the primary result together
//! with the asynchronous [`Operation`]s the backend scheduled; callers
//! hand those to `oxbow-ops` to wait for completion.

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    Branch, BranchResponse, CreateBranchRequest, CreateRoleRequest, Operation, OperationResponse,
    OperationsResponse, Role, RoleResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Status lookup used by the operation completion tracker
#[async_trait]
pub trait OperationSource: Send + Sync {
    /// Fetch the current snapshot of one operation
    async fn get_operation(&self, project_id: &str, operation_id: &str) -> Result<Operation>;
}

/// Typed control-plane API client
pub struct Api {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Api {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
        }
    }

    /// Create a branch in a project
    pub async fn create_branch(
        &self,
        project_id: &str,
        request: &CreateBranchRequest,
    ) -> Result<(Branch, Vec<Operation>)> {
        let url = format!("{}/projects/{}/branches", self.base_url, project_id);
        let response: BranchResponse = self
            .execute(self.client.post(&url).json(&serde_json::json!({ "branch": request })))
            .await?;
        Ok((response.branch, response.operations))
    }

    /// Delete a branch
    pub async fn delete_branch(
        &self,
        project_id: &str,
        branch_id: &str,
    ) -> Result<(Branch, Vec<Operation>)> {
        let url = format!(
            "{}/projects/{}/branches/{}",
            self.base_url, project_id, branch_id
        );
        let response: BranchResponse = self.execute(self.client.delete(&url)).await?;
        Ok((response.branch, response.operations))
    }

    /// Create a role on a branch
    pub async fn create_role(
        &self,
        project_id: &str,
        branch_id: &str,
        name: &str,
    ) -> Result<(Role, Vec<Operation>)> {
        let url = format!(
            "{}/projects/{}/branches/{}/roles",
            self.base_url, project_id, branch_id
        );
        let body = CreateRoleRequest {
            name: name.to_string(),
        };
        let response: RoleResponse = self
            .execute(self.client.post(&url).json(&serde_json::json!({ "role": body })))
            .await?;
        Ok((response.role, response.operations))
    }

    /// Delete a role from a branch
    pub async fn delete_role(
        &self,
        project_id: &str,
        branch_id: &str,
        name: &str,
    ) -> Result<(Role, Vec<Operation>)> {
        let url = format!(
            "{}/projects/{}/branches/{}/roles/{}",
            self.base_url, project_id, branch_id, name
        );
        let response: RoleResponse = self.execute(self.client.delete(&url)).await?;
        Ok((response.role, response.operations))
    }

    /// List operations for a project, newest first
    pub async fn list_operations(&self, project_id: &str) -> Result<Vec<Operation>> {
        let url = format!("{}/projects/{}/operations", self.base_url, project_id);
        let response: OperationsResponse = self.execute(self.client.get(&url)).await?;
        Ok(response.operations)
    }

    /// Send a request and decode the response body, mapping non-success
    /// statuses to [`ApiError::Http`] with the backend's message.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(body);
            tracing::debug!("API request failed with {}: {}", status, message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl OperationSource for Api {
    async fn get_operation(&self, project_id: &str, operation_id: &str) -> Result<Operation> {
        let url = format!(
            "{}/projects/{}/operations/{}",
            self.base_url, project_id, operation_id
        );
        let response: OperationResponse = self.execute(self.client.get(&url)).await?;
        Ok(response.operation)
    }
}
