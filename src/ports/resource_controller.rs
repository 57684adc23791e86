//! Controller port - the collaborator every route dispatches into.
//!
//! The router resolves identity and path parameters, then hands the call to
//! a `ResourceController`. Path parameters are forwarded verbatim: the
//! router never checks that a cluster belongs to the organization named in
//! the path, or that either exists. That check, if any, is the controller's.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::RequestContext;

/// Every operation the route tree can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // OAuth bootstrap
    GithubOAuthLogin,
    GithubOAuthCallback,

    // Auth
    Register,
    Login,
    GetCurrentUser,

    // Users
    ListUsers,
    GetUser,

    // Organizations
    ListOrganizations,
    CreateOrganization,
    GetOrganization,
    UpdateOrganization,
    ListOrganizationMembers,
    CreateOrganizationMember,
    DeleteOrganizationMember,

    // Clusters
    ListClusters,
    CreateCluster,
    GetCluster,
    UpdateCluster,
    ListClusterMembers,
    CreateClusterMember,
    DeleteClusterMember,

    // Bundles
    ListBundles,
    CreateBundle,
    GetBundle,
    UpdateBundle,

    // Bundle versions
    ListBundleVersions,
    CreateBundleVersion,
    GetBundleVersion,
    StartBundleVersionUpload,
    FinishBundleVersionUpload,
}

impl Operation {
    /// Snake-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GithubOAuthLogin => "github_oauth_login",
            Operation::GithubOAuthCallback => "github_oauth_callback",
            Operation::Register => "register",
            Operation::Login => "login",
            Operation::GetCurrentUser => "get_current_user",
            Operation::ListUsers => "list_users",
            Operation::GetUser => "get_user",
            Operation::ListOrganizations => "list_organizations",
            Operation::CreateOrganization => "create_organization",
            Operation::GetOrganization => "get_organization",
            Operation::UpdateOrganization => "update_organization",
            Operation::ListOrganizationMembers => "list_organization_members",
            Operation::CreateOrganizationMember => "create_organization_member",
            Operation::DeleteOrganizationMember => "delete_organization_member",
            Operation::ListClusters => "list_clusters",
            Operation::CreateCluster => "create_cluster",
            Operation::GetCluster => "get_cluster",
            Operation::UpdateCluster => "update_cluster",
            Operation::ListClusterMembers => "list_cluster_members",
            Operation::CreateClusterMember => "create_cluster_member",
            Operation::DeleteClusterMember => "delete_cluster_member",
            Operation::ListBundles => "list_bundles",
            Operation::CreateBundle => "create_bundle",
            Operation::GetBundle => "get_bundle",
            Operation::UpdateBundle => "update_bundle",
            Operation::ListBundleVersions => "list_bundle_versions",
            Operation::CreateBundleVersion => "create_bundle_version",
            Operation::GetBundleVersion => "get_bundle_version",
            Operation::StartBundleVersionUpload => "start_bundle_version_upload",
            Operation::FinishBundleVersionUpload => "finish_bundle_version_upload",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path parameters captured by the route template, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns a parameter the route template guarantees, or a bad request.
    pub fn require(&self, name: &str) -> Result<&str, ControllerError> {
        self.get(name)
            .ok_or_else(|| ControllerError::bad_request(format!("missing path parameter {}", name)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for PathParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PathParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Everything a controller receives for one request.
#[derive(Debug, Clone, Default)]
pub struct OperationCall {
    pub params: PathParams,
    pub context: RequestContext,
    /// Parsed JSON body, `None` when the request had no body.
    pub body: Option<Value>,
}

/// Successful controller result.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub body: Value,
    /// Set when the operation logged a user in; the dispatcher issues the
    /// session cookie for this username.
    pub established_session: Option<String>,
}

impl OperationOutcome {
    pub fn json(body: Value) -> Self {
        Self {
            body,
            established_session: None,
        }
    }

    pub fn with_session(mut self, username: impl Into<String>) -> Self {
        self.established_session = Some(username.into());
        self
    }
}

/// Controller failures, mapped to HTTP statuses by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    Internal(String),
}

impl ControllerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Serves the operations bound in the route tree.
#[async_trait]
pub trait ResourceController: Send + Sync {
    async fn invoke(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError>;
}
