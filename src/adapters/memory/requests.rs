//! Request bodies accepted by the in-memory controller.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::registry::{MemberRole, UploadStatus};
use crate::ports::ControllerError;

/// Deserializes a required JSON body.
pub fn parse_body<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ControllerError> {
    let body = body.ok_or_else(|| ControllerError::bad_request("request body is required"))?;
    serde_json::from_value(body).map_err(|e| ControllerError::bad_request(format!("invalid request body: {}", e)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub name_or_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDescriptionRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMembersRequest {
    pub usernames: Vec<String>,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMemberRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClusterRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kube_config: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClusterRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kube_config: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBundleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBundleVersionRequest {
    pub version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinishUploadRequest {
    pub status: UploadStatus,
    #[serde(default)]
    pub reason: Option<String>,
}
