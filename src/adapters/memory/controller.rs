//! In-memory resource controller.
//!
//! Serves every bound operation over nested maps. The parent chain of a
//! request (organization, cluster, bundle) is resolved here; a cluster name
//! that does not exist under the named organization is a 404 from this
//! controller, not from the router.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::requests::{
    parse_body, CreateBundleRequest, CreateBundleVersionRequest, CreateClusterRequest,
    CreateMembersRequest, CreateOrganizationRequest, DeleteMemberRequest, FinishUploadRequest,
    LoginRequest, RegisterRequest, UpdateClusterRequest, UpdateDescriptionRequest,
};
use super::InMemoryUserStore;
use crate::domain::foundation::{LookupError, ValidationError};
use crate::domain::registry::{
    validate_name, Bundle, BundleVersion, Cluster, Member, MemberRole, Organization,
    RegistryError,
};
use crate::domain::user::User;
use crate::ports::{
    ControllerError, Operation, OperationCall, OperationOutcome, PathParams, ResourceController,
    UserStore,
};

#[derive(Debug)]
struct OrganizationEntry {
    organization: Organization,
    members: BTreeMap<String, Member>,
    clusters: BTreeMap<String, ClusterEntry>,
}

#[derive(Debug)]
struct ClusterEntry {
    cluster: Cluster,
    members: BTreeMap<String, Member>,
    bundles: BTreeMap<String, BundleEntry>,
}

#[derive(Debug)]
struct BundleEntry {
    bundle: Bundle,
    versions: BTreeMap<String, BundleVersion>,
}

type Registry = BTreeMap<String, OrganizationEntry>;

/// Controller backed by process memory.
#[derive(Debug)]
pub struct InMemoryResourceController {
    users: Arc<InMemoryUserStore>,
    registry: RwLock<Registry>,
}

impl InMemoryResourceController {
    pub fn new(users: Arc<InMemoryUserStore>) -> Self {
        Self {
            users,
            registry: RwLock::new(Registry::new()),
        }
    }

    async fn register(&self, body: Option<Value>) -> Result<OperationOutcome, ControllerError> {
        let req: RegisterRequest = parse_body(body)?;
        validate_name("name", &req.name).map_err(invalid)?;
        if req.password.is_empty() {
            return Err(invalid(ValidationError::empty_field("password")));
        }

        let token = Uuid::new_v4().simple().to_string();
        let user = User::new(req.name.clone(), req.email)
            .with_api_token(token.clone())
            .with_password(&req.password);
        let body = json!({ "user": to_json(&user)?, "api_token": token });

        self.users
            .insert(user)
            .await
            .map_err(|conflict| ControllerError::conflict(conflict.to_string()))?;
        tracing::info!(username = %req.name, "user registered");
        Ok(OperationOutcome::json(body).with_session(req.name))
    }

    async fn login(&self, body: Option<Value>) -> Result<OperationOutcome, ControllerError> {
        let req: LoginRequest = parse_body(body)?;
        let user = self
            .users
            .find_by_name_or_email(&req.name_or_email)
            .await
            .filter(|user| user.verify_password(&req.password))
            .ok_or_else(|| ControllerError::Unauthorized("invalid name or password".to_string()))?;

        let name = user.name.clone();
        Ok(OperationOutcome::json(to_json(&user)?).with_session(name))
    }

    async fn get_user(&self, params: &PathParams) -> Result<OperationOutcome, ControllerError> {
        let name = params.require("userName")?;
        match self.users.get_by_name(name).await {
            Ok(user) => reply(&user),
            Err(LookupError::NotFound) => {
                Err(ControllerError::not_found(format!("user {} not found", name)))
            }
            Err(e) => Err(ControllerError::Internal(e.to_string())),
        }
    }

    async fn build_members(
        &self,
        req: CreateMembersRequest,
        creator: &str,
    ) -> Result<Vec<Member>, ControllerError> {
        if req.usernames.is_empty() {
            return Err(invalid(ValidationError::empty_field("usernames")));
        }
        let mut members = Vec::with_capacity(req.usernames.len());
        for username in req.usernames {
            if self.users.get_by_name(&username).await.is_err() {
                return Err(ControllerError::not_found(format!("user {} not found", username)));
            }
            members.push(Member::new(username, req.role, creator));
        }
        Ok(members)
    }

    async fn organizations(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError> {
        let username = current_user(&call)?;
        let params = &call.params;

        match operation {
            Operation::ListOrganizations => {
                let registry = self.registry.read().await;
                let orgs: Vec<&Organization> =
                    registry.values().map(|entry| &entry.organization).collect();
                reply(&orgs)
            }
            Operation::CreateOrganization => {
                let req: CreateOrganizationRequest = parse_body(call.body)?;
                let organization =
                    Organization::new(req.name, req.description, &username).map_err(invalid)?;
                let mut registry = self.registry.write().await;
                if registry.contains_key(&organization.name) {
                    return Err(ControllerError::conflict(format!(
                        "organization {} already exists",
                        organization.name
                    )));
                }
                let name = organization.name.clone();
                let body = to_json(&organization)?;
                registry.insert(
                    name,
                    OrganizationEntry {
                        organization,
                        members: creator_membership(&username),
                        clusters: BTreeMap::new(),
                    },
                );
                Ok(OperationOutcome::json(body))
            }
            Operation::GetOrganization => {
                let registry = self.registry.read().await;
                reply(&find_org(&registry, params)?.organization)
            }
            Operation::UpdateOrganization => {
                let req: UpdateDescriptionRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_org_mut(&mut registry, params)?;
                if let Some(description) = req.description {
                    entry.organization.set_description(description);
                }
                reply(&entry.organization)
            }
            Operation::ListOrganizationMembers => {
                let registry = self.registry.read().await;
                reply(&find_org(&registry, params)?.members.values().collect::<Vec<_>>())
            }
            Operation::CreateOrganizationMember => {
                let req: CreateMembersRequest = parse_body(call.body)?;
                let members = self.build_members(req, &username).await?;
                let mut registry = self.registry.write().await;
                let entry = find_org_mut(&mut registry, params)?;
                insert_members(&mut entry.members, &members)?;
                reply(&members)
            }
            Operation::DeleteOrganizationMember => {
                let req: DeleteMemberRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_org_mut(&mut registry, params)?;
                remove_member(&mut entry.members, &req.username)
            }
            _ => Err(unsupported(operation)),
        }
    }

    async fn clusters(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError> {
        let username = current_user(&call)?;
        let params = &call.params;

        match operation {
            Operation::ListClusters => {
                let registry = self.registry.read().await;
                let org = find_org(&registry, params)?;
                reply(&org.clusters.values().map(|c| &c.cluster).collect::<Vec<_>>())
            }
            Operation::CreateCluster => {
                let req: CreateClusterRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let org = find_org_mut(&mut registry, params)?;
                let cluster = Cluster::new(
                    org.organization.name.clone(),
                    req.name,
                    req.description,
                    &username,
                )
                .map_err(invalid)?
                .with_kube_config(req.kube_config);
                if org.clusters.contains_key(&cluster.name) {
                    return Err(ControllerError::conflict(format!(
                        "cluster {} already exists",
                        cluster.name
                    )));
                }
                let body = to_json(&cluster)?;
                org.clusters.insert(
                    cluster.name.clone(),
                    ClusterEntry {
                        cluster,
                        members: creator_membership(&username),
                        bundles: BTreeMap::new(),
                    },
                );
                Ok(OperationOutcome::json(body))
            }
            Operation::GetCluster => {
                let registry = self.registry.read().await;
                reply(&find_cluster(&registry, params)?.cluster)
            }
            Operation::UpdateCluster => {
                let req: UpdateClusterRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_cluster_mut(&mut registry, params)?;
                entry.cluster.update(req.description, req.kube_config);
                reply(&entry.cluster)
            }
            Operation::ListClusterMembers => {
                let registry = self.registry.read().await;
                reply(&find_cluster(&registry, params)?.members.values().collect::<Vec<_>>())
            }
            Operation::CreateClusterMember => {
                let req: CreateMembersRequest = parse_body(call.body)?;
                let members = self.build_members(req, &username).await?;
                let mut registry = self.registry.write().await;
                let entry = find_cluster_mut(&mut registry, params)?;
                insert_members(&mut entry.members, &members)?;
                reply(&members)
            }
            Operation::DeleteClusterMember => {
                let req: DeleteMemberRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_cluster_mut(&mut registry, params)?;
                remove_member(&mut entry.members, &req.username)
            }
            _ => Err(unsupported(operation)),
        }
    }

    async fn bundles(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError> {
        let username = current_user(&call)?;
        let params = &call.params;

        match operation {
            Operation::ListBundles => {
                let registry = self.registry.read().await;
                let cluster = find_cluster(&registry, params)?;
                reply(&cluster.bundles.values().map(|b| &b.bundle).collect::<Vec<_>>())
            }
            Operation::CreateBundle => {
                let req: CreateBundleRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_cluster_mut(&mut registry, params)?;
                let bundle = Bundle::new(
                    entry.cluster.organization.clone(),
                    entry.cluster.name.clone(),
                    req.name,
                    req.description,
                    &username,
                )
                .map_err(invalid)?;
                if entry.bundles.contains_key(&bundle.name) {
                    return Err(ControllerError::conflict(format!(
                        "bundle {} already exists",
                        bundle.name
                    )));
                }
                let body = to_json(&bundle)?;
                entry.bundles.insert(
                    bundle.name.clone(),
                    BundleEntry {
                        bundle,
                        versions: BTreeMap::new(),
                    },
                );
                Ok(OperationOutcome::json(body))
            }
            Operation::GetBundle => {
                let registry = self.registry.read().await;
                reply(&find_bundle(&registry, params)?.bundle)
            }
            Operation::UpdateBundle => {
                let req: UpdateDescriptionRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_bundle_mut(&mut registry, params)?;
                if let Some(description) = req.description {
                    entry.bundle.set_description(description);
                }
                reply(&entry.bundle)
            }
            _ => Err(unsupported(operation)),
        }
    }

    async fn bundle_versions(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError> {
        let username = current_user(&call)?;
        let params = &call.params;

        match operation {
            Operation::ListBundleVersions => {
                let registry = self.registry.read().await;
                reply(&find_bundle(&registry, params)?.versions.values().collect::<Vec<_>>())
            }
            Operation::CreateBundleVersion => {
                let req: CreateBundleVersionRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let entry = find_bundle_mut(&mut registry, params)?;
                let version = BundleVersion::new(
                    entry.bundle.organization.clone(),
                    entry.bundle.cluster.clone(),
                    entry.bundle.name.clone(),
                    req.version,
                    req.description,
                    &username,
                )
                .map_err(registry_error)?;
                if entry.versions.contains_key(&version.version) {
                    return Err(ControllerError::conflict(format!(
                        "version {} already exists",
                        version.version
                    )));
                }
                let body = to_json(&version)?;
                entry.versions.insert(version.version.clone(), version);
                Ok(OperationOutcome::json(body))
            }
            Operation::GetBundleVersion => {
                let registry = self.registry.read().await;
                reply(find_version(&registry, params)?)
            }
            Operation::StartBundleVersionUpload => {
                let mut registry = self.registry.write().await;
                let version = find_version_mut(&mut registry, params)?;
                version.start_upload().map_err(registry_error)?;
                tracing::info!(version = %version.version, "bundle version upload started");
                reply(&*version)
            }
            Operation::FinishBundleVersionUpload => {
                let req: FinishUploadRequest = parse_body(call.body)?;
                let mut registry = self.registry.write().await;
                let version = find_version_mut(&mut registry, params)?;
                version
                    .finish_upload(req.status, req.reason)
                    .map_err(registry_error)?;
                tracing::info!(
                    version = %version.version,
                    status = %version.upload_status,
                    "bundle version upload finished"
                );
                reply(&*version)
            }
            _ => Err(unsupported(operation)),
        }
    }
}

#[async_trait]
impl ResourceController for InMemoryResourceController {
    async fn invoke(
        &self,
        operation: Operation,
        call: OperationCall,
    ) -> Result<OperationOutcome, ControllerError> {
        use Operation::*;

        match operation {
            GithubOAuthLogin | GithubOAuthCallback => Err(ControllerError::Unsupported(
                "oauth provider not configured".to_string(),
            )),
            Register => self.register(call.body).await,
            Login => self.login(call.body).await,
            GetCurrentUser => {
                let user = call
                    .context
                    .user()
                    .ok_or_else(|| ControllerError::Unauthorized("login required".to_string()))?;
                reply(user)
            }
            ListUsers => {
                current_user(&call)?;
                reply(&self.users.list().await)
            }
            GetUser => self.get_user(&call.params).await,
            ListOrganizations | CreateOrganization | GetOrganization | UpdateOrganization
            | ListOrganizationMembers | CreateOrganizationMember | DeleteOrganizationMember => {
                self.organizations(operation, call).await
            }
            ListClusters | CreateCluster | GetCluster | UpdateCluster | ListClusterMembers
            | CreateClusterMember | DeleteClusterMember => self.clusters(operation, call).await,
            ListBundles | CreateBundle | GetBundle | UpdateBundle => {
                self.bundles(operation, call).await
            }
            ListBundleVersions | CreateBundleVersion | GetBundleVersion
            | StartBundleVersionUpload | FinishBundleVersionUpload => {
                self.bundle_versions(operation, call).await
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn current_user(call: &OperationCall) -> Result<String, ControllerError> {
    call.context
        .username()
        .map(str::to_string)
        .ok_or_else(|| ControllerError::Unauthorized("login required".to_string()))
}

fn creator_membership(username: &str) -> BTreeMap<String, Member> {
    let mut members = BTreeMap::new();
    members.insert(
        username.to_string(),
        Member::new(username, MemberRole::Admin, username),
    );
    members
}

fn insert_members(
    existing: &mut BTreeMap<String, Member>,
    members: &[Member],
) -> Result<(), ControllerError> {
    if let Some(dup) = members.iter().find(|m| existing.contains_key(&m.username)) {
        return Err(ControllerError::conflict(format!(
            "user {} is already a member",
            dup.username
        )));
    }
    for member in members {
        existing.insert(member.username.clone(), member.clone());
    }
    Ok(())
}

fn remove_member(
    members: &mut BTreeMap<String, Member>,
    username: &str,
) -> Result<OperationOutcome, ControllerError> {
    members
        .remove(username)
        .ok_or_else(|| ControllerError::not_found(format!("member {} not found", username)))?;
    Ok(OperationOutcome::json(json!({ "message": "success" })))
}

fn find_org<'a>(
    registry: &'a Registry,
    params: &PathParams,
) -> Result<&'a OrganizationEntry, ControllerError> {
    let name = params.require("orgName")?;
    registry
        .get(name)
        .ok_or_else(|| ControllerError::not_found(format!("organization {} not found", name)))
}

fn find_org_mut<'a>(
    registry: &'a mut Registry,
    params: &PathParams,
) -> Result<&'a mut OrganizationEntry, ControllerError> {
    let name = params.require("orgName")?;
    registry
        .get_mut(name)
        .ok_or_else(|| ControllerError::not_found(format!("organization {} not found", name)))
}

fn find_cluster<'a>(
    registry: &'a Registry,
    params: &PathParams,
) -> Result<&'a ClusterEntry, ControllerError> {
    let name = params.require("clusterName")?;
    find_org(registry, params)?
        .clusters
        .get(name)
        .ok_or_else(|| ControllerError::not_found(format!("cluster {} not found", name)))
}

fn find_cluster_mut<'a>(
    registry: &'a mut Registry,
    params: &PathParams,
) -> Result<&'a mut ClusterEntry, ControllerError> {
    let name = params.require("clusterName")?;
    find_org_mut(registry, params)?
        .clusters
        .get_mut(name)
        .ok_or_else(|| ControllerError::not_found(format!("cluster {} not found", name)))
}

fn find_bundle<'a>(
    registry: &'a Registry,
    params: &PathParams,
) -> Result<&'a BundleEntry, ControllerError> {
    let name = params.require("bundleName")?;
    find_cluster(registry, params)?
        .bundles
        .get(name)
        .ok_or_else(|| ControllerError::not_found(format!("bundle {} not found", name)))
}

fn find_bundle_mut<'a>(
    registry: &'a mut Registry,
    params: &PathParams,
) -> Result<&'a mut BundleEntry, ControllerError> {
    let name = params.require("bundleName")?;
    find_cluster_mut(registry, params)?
        .bundles
        .get_mut(name)
        .ok_or_else(|| ControllerError::not_found(format!("bundle {} not found", name)))
}

fn find_version<'a>(
    registry: &'a Registry,
    params: &PathParams,
) -> Result<&'a BundleVersion, ControllerError> {
    let name = params.require("version")?;
    find_bundle(registry, params)?
        .versions
        .get(name)
        .ok_or_else(|| ControllerError::not_found(format!("version {} not found", name)))
}

fn find_version_mut<'a>(
    registry: &'a mut Registry,
    params: &PathParams,
) -> Result<&'a mut BundleVersion, ControllerError> {
    let name = params.require("version")?;
    find_bundle_mut(registry, params)?
        .versions
        .get_mut(name)
        .ok_or_else(|| ControllerError::not_found(format!("version {} not found", name)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, ControllerError> {
    serde_json::to_value(value).map_err(|e| ControllerError::Internal(e.to_string()))
}

fn reply<T: Serialize + ?Sized>(value: &T) -> Result<OperationOutcome, ControllerError> {
    to_json(value).map(OperationOutcome::json)
}

fn invalid(error: ValidationError) -> ControllerError {
    ControllerError::bad_request(error.to_string())
}

fn registry_error(error: RegistryError) -> ControllerError {
    match error {
        RegistryError::Validation(e) => invalid(e),
        e @ RegistryError::InvalidUploadTransition { .. } => ControllerError::conflict(e.to_string()),
    }
}

fn unsupported(operation: Operation) -> ControllerError {
    ControllerError::Unsupported(format!("operation {} is not supported here", operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RequestContext;

    fn controller() -> InMemoryResourceController {
        let users = InMemoryUserStore::new()
            .with_user(User::new("alice", None).with_password("pw"))
            .with_user(User::new("bob", None));
        InMemoryResourceController::new(Arc::new(users))
    }

    fn as_alice(params: PathParams, body: Option<Value>) -> OperationCall {
        OperationCall {
            params,
            context: RequestContext::logged_in(User::new("alice", None)),
            body,
        }
    }

    async fn seed(controller: &InMemoryResourceController) {
        controller
            .invoke(
                Operation::CreateOrganization,
                as_alice(PathParams::default(), Some(json!({"name": "acme"}))),
            )
            .await
            .unwrap();
        controller
            .invoke(
                Operation::CreateCluster,
                as_alice(PathParams::from([("orgName", "acme")]), Some(json!({"name": "prod"}))),
            )
            .await
            .unwrap();
        controller
            .invoke(
                Operation::CreateBundle,
                as_alice(
                    PathParams::from([("orgName", "acme"), ("clusterName", "prod")]),
                    Some(json!({"name": "mymodel"})),
                ),
            )
            .await
            .unwrap();
    }

    fn bundle_params() -> PathParams {
        PathParams::from([("orgName", "acme"), ("clusterName", "prod"), ("bundleName", "mymodel")])
    }

    fn version_params() -> PathParams {
        PathParams::from([
            ("orgName", "acme"),
            ("clusterName", "prod"),
            ("bundleName", "mymodel"),
            ("version", "v1"),
        ])
    }

    // ════════════════════════════════════════════════════════════════════════
    // Auth operations
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn register_establishes_session_and_returns_token() {
        let controller = controller();
        let outcome = controller
            .invoke(
                Operation::Register,
                OperationCall {
                    body: Some(json!({"name": "carol", "password": "secret"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.established_session.as_deref(), Some("carol"));
        assert_eq!(outcome.body["user"]["name"], "carol");
        let token = outcome.body["api_token"].as_str().unwrap();
        assert_eq!(controller.users.get_by_api_token(token).await.unwrap().name, "carol");
    }

    #[tokio::test]
    async fn register_rejects_taken_name() {
        let err = controller()
            .invoke(
                Operation::Register,
                OperationCall {
                    body: Some(json!({"name": "alice", "password": "x"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::conflict("user alice already exists"));
    }

    fn register_call(name: &str, email: &str) -> OperationCall {
        OperationCall {
            body: Some(json!({"name": name, "email": email, "password": "pw"})),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let controller = controller();
        controller
            .invoke(Operation::Register, register_call("carol", "shared@example.com"))
            .await
            .unwrap();
        let err = controller
            .invoke(Operation::Register, register_call("dave", "shared@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::conflict("email shared@example.com already registered"));
        assert!(controller.users.get_by_name("dave").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_cannot_share_an_email() {
        for _ in 0..300 {
            let controller = Arc::new(controller());
            let handles: Vec<_> = ["u1", "u2"]
                .into_iter()
                .map(|name| {
                    let controller = Arc::clone(&controller);
                    tokio::spawn(async move {
                        controller
                            .invoke(Operation::Register, register_call(name, "same@example.com"))
                            .await
                    })
                })
                .collect();

            let mut registered = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    registered += 1;
                }
            }
            assert_eq!(registered, 1);
            let holder = controller.users.find_by_name_or_email("same@example.com").await;
            assert!(holder.is_some_and(|u| u.name == "u1" || u.name == "u2"));
        }
    }

    #[tokio::test]
    async fn login_checks_password() {
        let controller = controller();
        let ok = controller
            .invoke(
                Operation::Login,
                OperationCall {
                    body: Some(json!({"name_or_email": "alice", "password": "pw"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.established_session.as_deref(), Some("alice"));

        let err = controller
            .invoke(
                Operation::Login,
                OperationCall {
                    body: Some(json!({"name_or_email": "alice", "password": "wrong"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn oauth_operations_are_unsupported() {
        let err = controller()
            .invoke(Operation::GithubOAuthLogin, OperationCall::default())
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::Unsupported("oauth provider not configured".to_string()));
    }

    #[tokio::test]
    async fn gated_operation_without_context_is_unauthorized() {
        let err = controller()
            .invoke(Operation::ListOrganizations, OperationCall::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Unauthorized(_)));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Registry hierarchy
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creator_becomes_admin_member() {
        let controller = controller();
        seed(&controller).await;

        let outcome = controller
            .invoke(
                Operation::ListOrganizationMembers,
                as_alice(PathParams::from([("orgName", "acme")]), None),
            )
            .await
            .unwrap();
        assert_eq!(outcome.body[0]["username"], "alice");
        assert_eq!(outcome.body[0]["role"], "admin");
    }

    #[tokio::test]
    async fn cluster_lookup_is_scoped_to_its_organization() {
        let controller = controller();
        seed(&controller).await;
        controller
            .invoke(
                Operation::CreateOrganization,
                as_alice(PathParams::default(), Some(json!({"name": "other"}))),
            )
            .await
            .unwrap();

        let err = controller
            .invoke(
                Operation::GetCluster,
                as_alice(PathParams::from([("orgName", "other"), ("clusterName", "prod")]), None),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::not_found("cluster prod not found"));
    }

    #[tokio::test]
    async fn members_must_be_registered_users() {
        let controller = controller();
        seed(&controller).await;

        let err = controller
            .invoke(
                Operation::CreateClusterMember,
                as_alice(
                    PathParams::from([("orgName", "acme"), ("clusterName", "prod")]),
                    Some(json!({"usernames": ["nobody"]})),
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::not_found("user nobody not found"));

        controller
            .invoke(
                Operation::CreateClusterMember,
                as_alice(
                    PathParams::from([("orgName", "acme"), ("clusterName", "prod")]),
                    Some(json!({"usernames": ["bob"], "role": "developer"})),
                ),
            )
            .await
            .unwrap();
        controller
            .invoke(
                Operation::DeleteClusterMember,
                as_alice(
                    PathParams::from([("orgName", "acme"), ("clusterName", "prod")]),
                    Some(json!({"username": "bob"})),
                ),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_lifecycle_follows_status_transitions() {
        let controller = controller();
        seed(&controller).await;
        controller
            .invoke(
                Operation::CreateBundleVersion,
                as_alice(bundle_params(), Some(json!({"version": "v1"}))),
            )
            .await
            .unwrap();

        let err = controller
            .invoke(
                Operation::FinishBundleVersionUpload,
                as_alice(version_params(), Some(json!({"status": "success"}))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Conflict(_)));

        let started = controller
            .invoke(Operation::StartBundleVersionUpload, as_alice(version_params(), None))
            .await
            .unwrap();
        assert_eq!(started.body["upload_status"], "uploading");

        let finished = controller
            .invoke(
                Operation::FinishBundleVersionUpload,
                as_alice(version_params(), Some(json!({"status": "success"}))),
            )
            .await
            .unwrap();
        assert_eq!(finished.body["upload_status"], "success");
    }

    #[tokio::test]
    async fn duplicate_bundle_is_conflict() {
        let controller = controller();
        seed(&controller).await;
        let err = controller
            .invoke(
                Operation::CreateBundle,
                as_alice(
                    PathParams::from([("orgName", "acme"), ("clusterName", "prod")]),
                    Some(json!({"name": "mymodel"})),
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::conflict("bundle mymodel already exists"));
    }
}
