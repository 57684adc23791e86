//! The static route tree.
//!
//! Declared once in [`RouteTree::standard`] and immutable afterwards: nodes
//! are built by value and the tree exposes no mutating methods. Every bound
//! operation carries its HTTP method, guard list and documentation metadata.
//!
//! ```text
//! /oauth/github                                  GET  (open)
//! /callback/github                               GET  (open)
//! /api/v1/auth/{register,login}                  POST (open)
//! /api/v1/auth/current                           GET
//! /api/v1/users[/:userName]                      GET
//! /api/v1/orgs[/:orgName[/members]]              ...
//!   /clusters[/:clusterName[/members]]
//!     /bundles[/:bundleName]
//!       /versions[/:version[/start_upload|/finish_upload]]
//! ```
//!
//! Path parameters are opaque. The tree records their names so the
//! dispatcher can forward them; it never looks values up.

use std::collections::HashSet;
use std::fmt;

use axum::routing::MethodFilter;
use thiserror::Error;

use crate::ports::Operation;

/// Prefix shared by every API route.
pub const API_PREFIX: &str = "/api/";

/// One path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// A check the dispatcher runs before the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    RequireLogin,
}

const LOGIN: &[GuardKind] = &[GuardKind::RequireLogin];
const OPEN: &[GuardKind] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn filter(&self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documentation attached to a bound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDoc {
    pub id: &'static str,
    pub summary: &'static str,
}

/// Name and description of a grouping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub name: &'static str,
    pub description: &'static str,
}

/// An operation bound to a node under one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundOperation {
    pub method: HttpMethod,
    pub operation: Operation,
    pub guards: Vec<GuardKind>,
    pub doc: OperationDoc,
}

/// A node of the tree.
#[derive(Debug, Clone)]
pub struct RouteNode {
    segment: Option<Segment>,
    tag: Option<Tag>,
    operations: Vec<BoundOperation>,
    children: Vec<RouteNode>,
}

impl RouteNode {
    fn root() -> Self {
        Self {
            segment: None,
            tag: None,
            operations: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn literal(name: &'static str) -> Self {
        Self {
            segment: Some(Segment::Literal(name)),
            ..Self::root()
        }
    }

    pub fn param(name: &'static str) -> Self {
        Self {
            segment: Some(Segment::Param(name)),
            ..Self::root()
        }
    }

    pub fn tagged(mut self, name: &'static str, description: &'static str) -> Self {
        self.tag = Some(Tag { name, description });
        self
    }

    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    fn bind(
        mut self,
        method: HttpMethod,
        operation: Operation,
        summary: (&'static str, &'static str),
        guards: &[GuardKind],
    ) -> Self {
        self.operations.push(BoundOperation {
            method,
            operation,
            guards: guards.to_vec(),
            doc: OperationDoc {
                id: summary.0,
                summary: summary.1,
            },
        });
        self
    }

    pub fn get(self, op: Operation, doc: (&'static str, &'static str), guards: &[GuardKind]) -> Self {
        self.bind(HttpMethod::Get, op, doc, guards)
    }

    pub fn post(self, op: Operation, doc: (&'static str, &'static str), guards: &[GuardKind]) -> Self {
        self.bind(HttpMethod::Post, op, doc, guards)
    }

    pub fn patch(self, op: Operation, doc: (&'static str, &'static str), guards: &[GuardKind]) -> Self {
        self.bind(HttpMethod::Patch, op, doc, guards)
    }

    pub fn delete(self, op: Operation, doc: (&'static str, &'static str), guards: &[GuardKind]) -> Self {
        self.bind(HttpMethod::Delete, op, doc, guards)
    }

    pub fn segment(&self) -> Option<Segment> {
        self.segment
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    pub fn operations(&self) -> &[BoundOperation] {
        &self.operations
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }
}

/// A flattened, dispatchable route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Path in router syntax, e.g. `/api/v1/orgs/:orgName`.
    pub path: String,
    /// Path in documentation syntax, e.g. `/api/v1/orgs/{orgName}`.
    pub template: String,
    /// Parameter names in path order.
    pub params: Vec<&'static str>,
    /// Tag of the nearest tagged ancestor.
    pub tag: Option<Tag>,
    pub bound: BoundOperation,
}

impl RouteEntry {
    pub fn requires_login(&self) -> bool {
        self.bound.guards.contains(&GuardKind::RequireLogin)
    }
}

/// Inconsistencies detected while flattening the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTreeError {
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: HttpMethod, path: String },

    #[error("path parameter {name} repeats in {path}")]
    RepeatedParam { name: &'static str, path: String },

    #[error("empty path segment under {path}")]
    EmptySegment { path: String },
}

/// The whole route tree.
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: RouteNode,
}

impl RouteTree {
    pub fn new(root_children: Vec<RouteNode>) -> Self {
        let mut root = RouteNode::root();
        root.children = root_children;
        Self { root }
    }

    /// The bundle registry's routes.
    pub fn standard() -> Self {
        Self::new(vec![
            RouteNode::literal("oauth").child(RouteNode::literal("github").get(
                Operation::GithubOAuthLogin,
                ("Github OAuth login", "Start a Github OAuth login"),
                OPEN,
            )),
            RouteNode::literal("callback").child(RouteNode::literal("github").get(
                Operation::GithubOAuthCallback,
                ("Github OAuth callback", "Finish a Github OAuth login"),
                OPEN,
            )),
            RouteNode::literal("api").child(
                RouteNode::literal("v1")
                    .tagged("api v1", "api v1")
                    .child(auth_routes())
                    .child(user_routes())
                    .child(organization_routes()),
            ),
        ])
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Flattens the tree into one entry per bound operation.
    pub fn entries(&self) -> Result<Vec<RouteEntry>, RouteTreeError> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut walk = Walk {
            path: String::new(),
            template: String::new(),
            params: Vec::new(),
            tag: None,
        };
        collect(&self.root, &mut walk, &mut seen, &mut entries)?;
        Ok(entries)
    }
}

struct Walk {
    path: String,
    template: String,
    params: Vec<&'static str>,
    tag: Option<Tag>,
}

fn collect(
    node: &RouteNode,
    walk: &mut Walk,
    seen: &mut HashSet<(HttpMethod, String)>,
    out: &mut Vec<RouteEntry>,
) -> Result<(), RouteTreeError> {
    let saved = (walk.path.len(), walk.template.len(), walk.params.len(), walk.tag);

    match node.segment {
        Some(Segment::Literal(name)) | Some(Segment::Param(name)) if name.is_empty() => {
            return Err(RouteTreeError::EmptySegment {
                path: display_path(&walk.template),
            });
        }
        Some(Segment::Literal(name)) => {
            walk.path.push('/');
            walk.path.push_str(name);
            walk.template.push('/');
            walk.template.push_str(name);
        }
        Some(Segment::Param(name)) => {
            walk.path.push_str("/:");
            walk.path.push_str(name);
            walk.template.push_str("/{");
            walk.template.push_str(name);
            walk.template.push('}');
            if walk.params.contains(&name) {
                return Err(RouteTreeError::RepeatedParam {
                    name,
                    path: walk.template.clone(),
                });
            }
            walk.params.push(name);
        }
        None => {}
    }
    if node.tag.is_some() {
        walk.tag = node.tag;
    }

    for bound in &node.operations {
        let path = display_path(&walk.path);
        if !seen.insert((bound.method, path.clone())) {
            return Err(RouteTreeError::DuplicateRoute {
                method: bound.method,
                path,
            });
        }
        out.push(RouteEntry {
            path,
            template: display_path(&walk.template),
            params: walk.params.clone(),
            tag: walk.tag,
            bound: bound.clone(),
        });
    }

    for child in &node.children {
        collect(child, walk, seen, out)?;
    }

    walk.path.truncate(saved.0);
    walk.template.truncate(saved.1);
    walk.params.truncate(saved.2);
    walk.tag = saved.3;
    Ok(())
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Route declarations
// ════════════════════════════════════════════════════════════════════════════

fn auth_routes() -> RouteNode {
    RouteNode::literal("auth")
        .tagged("auth", "auth")
        .child(RouteNode::literal("register").post(
            Operation::Register,
            ("Register an user", "Register an user"),
            OPEN,
        ))
        .child(RouteNode::literal("login").post(
            Operation::Login,
            ("Login an user", "Login an user"),
            OPEN,
        ))
        .child(RouteNode::literal("current").get(
            Operation::GetCurrentUser,
            ("Get current user", "Get current user"),
            LOGIN,
        ))
}

fn user_routes() -> RouteNode {
    RouteNode::literal("users")
        .tagged("users", "users api")
        .get(Operation::ListUsers, ("List users", "List users"), LOGIN)
        .child(
            RouteNode::param("userName")
                .tagged("user resource", "user resource")
                .get(Operation::GetUser, ("Get an user", "Get an user"), LOGIN),
        )
}

fn organization_routes() -> RouteNode {
    RouteNode::literal("orgs")
        .tagged("organizations", "organizations")
        .get(
            Operation::ListOrganizations,
            ("List organizations", "List organizations"),
            LOGIN,
        )
        .post(
            Operation::CreateOrganization,
            ("Create organization", "Create organization"),
            LOGIN,
        )
        .child(
            RouteNode::param("orgName")
                .tagged("organization resource", "organization resource")
                .get(
                    Operation::GetOrganization,
                    ("Get an organization", "Get an organization"),
                    LOGIN,
                )
                .patch(
                    Operation::UpdateOrganization,
                    ("Update an organization", "Update an organization"),
                    LOGIN,
                )
                .child(
                    RouteNode::literal("members")
                        .get(
                            Operation::ListOrganizationMembers,
                            ("List organization members", "Get organization members"),
                            LOGIN,
                        )
                        .post(
                            Operation::CreateOrganizationMember,
                            ("Create an organization member", "Create an organization member"),
                            LOGIN,
                        )
                        .delete(
                            Operation::DeleteOrganizationMember,
                            ("Remove an organization member", "Remove an organization member"),
                            LOGIN,
                        ),
                )
                .child(cluster_routes()),
        )
}

fn cluster_routes() -> RouteNode {
    RouteNode::literal("clusters")
        .tagged("clusters", "clusters")
        .get(Operation::ListClusters, ("List clusters", "List clusters"), LOGIN)
        .post(Operation::CreateCluster, ("Create cluster", "Create cluster"), LOGIN)
        .child(
            RouteNode::param("clusterName")
                .tagged("cluster resource", "cluster resource")
                .get(Operation::GetCluster, ("Get a cluster", "Get a cluster"), LOGIN)
                .patch(Operation::UpdateCluster, ("Update a cluster", "Update a cluster"), LOGIN)
                .child(
                    RouteNode::literal("members")
                        .get(
                            Operation::ListClusterMembers,
                            ("List cluster members", "List cluster members"),
                            LOGIN,
                        )
                        .post(
                            Operation::CreateClusterMember,
                            ("Create a cluster member", "Create a cluster member"),
                            LOGIN,
                        )
                        .delete(
                            Operation::DeleteClusterMember,
                            ("Remove a cluster member", "Remove a cluster member"),
                            LOGIN,
                        ),
                )
                .child(bundle_routes()),
        )
}

fn bundle_routes() -> RouteNode {
    RouteNode::literal("bundles")
        .tagged("bundles", "bundles")
        .get(Operation::ListBundles, ("List bundles", "List bundles"), LOGIN)
        .post(Operation::CreateBundle, ("Create bundle", "Create bundle"), LOGIN)
        .child(
            RouteNode::param("bundleName")
                .tagged("bundle resource", "bundle resource")
                .get(Operation::GetBundle, ("Get a bundle", "Get a bundle"), LOGIN)
                .patch(Operation::UpdateBundle, ("Update a bundle", "Update a bundle"), LOGIN)
                .child(bundle_version_routes()),
        )
}

fn bundle_version_routes() -> RouteNode {
    RouteNode::literal("versions")
        .tagged("bundle versions", "bundle versions")
        .get(
            Operation::ListBundleVersions,
            ("List bundle versions", "List bundle versions"),
            LOGIN,
        )
        .post(
            Operation::CreateBundleVersion,
            ("Create bundle version", "Create bundle version"),
            LOGIN,
        )
        .child(
            RouteNode::param("version")
                .tagged("bundle version resource", "bundle version resource")
                .get(
                    Operation::GetBundleVersion,
                    ("Get a bundle version", "Get a bundle version"),
                    LOGIN,
                )
                .child(RouteNode::literal("start_upload").patch(
                    Operation::StartBundleVersionUpload,
                    ("Start upload a bundle version", "Start upload a bundle version"),
                    LOGIN,
                ))
                .child(RouteNode::literal("finish_upload").patch(
                    Operation::FinishBundleVersionUpload,
                    ("Finish upload a bundle version", "Finish upload a bundle version"),
                    LOGIN,
                )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<RouteEntry> {
        RouteTree::standard().entries().unwrap()
    }

    fn find(method: HttpMethod, path: &str) -> RouteEntry {
        entries()
            .into_iter()
            .find(|e| e.bound.method == method && e.path == path)
            .unwrap_or_else(|| panic!("no route {} {}", method, path))
    }

    #[test]
    fn standard_tree_binds_every_operation_once() {
        let entries = entries();
        assert_eq!(entries.len(), 30);
        let operations: HashSet<Operation> = entries.iter().map(|e| e.bound.operation).collect();
        assert_eq!(operations.len(), 30);
    }

    #[test]
    fn only_bootstrap_routes_are_open() {
        let open: Vec<Operation> = entries()
            .into_iter()
            .filter(|e| !e.requires_login())
            .map(|e| e.bound.operation)
            .collect();
        assert_eq!(
            open,
            vec![
                Operation::GithubOAuthLogin,
                Operation::GithubOAuthCallback,
                Operation::Register,
                Operation::Login,
            ]
        );
    }

    #[test]
    fn nested_bundle_route_collects_params_in_order() {
        let entry = find(
            HttpMethod::Get,
            "/api/v1/orgs/:orgName/clusters/:clusterName/bundles/:bundleName",
        );
        assert_eq!(entry.params, vec!["orgName", "clusterName", "bundleName"]);
        assert_eq!(
            entry.template,
            "/api/v1/orgs/{orgName}/clusters/{clusterName}/bundles/{bundleName}"
        );
        assert_eq!(entry.bound.operation, Operation::GetBundle);
        assert_eq!(entry.tag.map(|t| t.name), Some("bundle resource"));
    }

    #[test]
    fn upload_transitions_are_patch_children_of_version() {
        let base = "/api/v1/orgs/:orgName/clusters/:clusterName/bundles/:bundleName/versions/:version";
        let start = find(HttpMethod::Patch, &format!("{}/start_upload", base));
        let finish = find(HttpMethod::Patch, &format!("{}/finish_upload", base));
        assert_eq!(start.bound.operation, Operation::StartBundleVersionUpload);
        assert_eq!(finish.bound.operation, Operation::FinishBundleVersionUpload);
        assert_eq!(start.params.len(), 4);
    }

    #[test]
    fn members_route_serves_three_methods() {
        let methods: Vec<HttpMethod> = entries()
            .into_iter()
            .filter(|e| e.path == "/api/v1/orgs/:orgName/members")
            .map(|e| e.bound.method)
            .collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]);
    }

    #[test]
    fn untagged_literal_inherits_parent_tag() {
        let entry = find(HttpMethod::Get, "/api/v1/orgs/:orgName/members");
        assert_eq!(entry.tag.map(|t| t.name), Some("organization resource"));
    }

    #[test]
    fn top_level_nodes_are_literals() {
        let tree = RouteTree::standard();
        let top: Vec<Option<Segment>> = tree.root().children().iter().map(RouteNode::segment).collect();
        assert_eq!(
            top,
            vec![
                Some(Segment::Literal("oauth")),
                Some(Segment::Literal("callback")),
                Some(Segment::Literal("api")),
            ]
        );
        assert!(tree.root().operations().is_empty());
        assert!(tree.root().tag().is_none());
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let tree = RouteTree::new(vec![RouteNode::literal("x")
            .get(Operation::ListUsers, ("a", "a"), LOGIN)
            .get(Operation::GetUser, ("b", "b"), LOGIN)]);
        assert_eq!(
            tree.entries().unwrap_err(),
            RouteTreeError::DuplicateRoute {
                method: HttpMethod::Get,
                path: "/x".to_string()
            }
        );
    }

    #[test]
    fn repeated_param_is_rejected() {
        let tree = RouteTree::new(vec![RouteNode::param("id").child(
            RouteNode::param("id").get(Operation::GetUser, ("a", "a"), OPEN),
        )]);
        assert!(matches!(
            tree.entries().unwrap_err(),
            RouteTreeError::RepeatedParam { name: "id", .. }
        ));
    }

    #[test]
    fn same_param_name_on_sibling_branches_is_allowed() {
        let tree = RouteTree::new(vec![
            RouteNode::literal("a").child(RouteNode::param("id").get(Operation::GetUser, ("a", "a"), OPEN)),
            RouteNode::literal("b").child(RouteNode::param("id").get(Operation::GetOrganization, ("b", "b"), OPEN)),
        ]);
        assert_eq!(tree.entries().unwrap().len(), 2);
    }
}
