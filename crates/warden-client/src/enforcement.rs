//! Permission enforcement.
//!
//! The decision engine: given a check request, fetch the acting user's role
//! assignments, expand each assigned role's inheritance closure, match the
//! required permission, and assemble a decision with explainability
//! metadata. All I/O goes through the [`RoleStore`] seam so the engine can
//! be exercised against the HTTP client or an in-memory store alike.

use async_trait::async_trait;
use futures::future;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use warden_rbac::{resolve_permissions, Permission, PermissionSet, RoleTable};

use crate::error::ClientError;

/// A role held by a user, optionally scoped to a tenant and/or resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Key of the user holding the role.
    pub user: String,

    /// Key of the assigned role.
    pub role: String,

    /// Tenant the assignment is scoped to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Resource type the assignment is scoped to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Resource instance the assignment is scoped to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_instance: Option<String>,
}

/// Read operations the engine needs from the authorization store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// List a user's role assignments, filtered by tenant when given.
    async fn list_role_assignments(
        &self,
        user: &str,
        tenant: Option<&str>,
    ) -> Result<Vec<RoleAssignment>, ClientError>;

    /// Fetch the full role-definition table.
    async fn list_roles(&self) -> Result<RoleTable, ClientError>;
}

/// The user a check is about: a bare key or an object with attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    /// Just the user key.
    Key(String),
    /// User key plus free-form attributes.
    Object {
        /// Unique user key.
        key: String,
        /// Free-form user attributes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<serde_json::Value>,
    },
}

impl UserRef {
    /// The user's key.
    pub fn key(&self) -> &str {
        match self {
            UserRef::Key(key) => key,
            UserRef::Object { key, .. } => key,
        }
    }
}

impl From<&str> for UserRef {
    fn from(key: &str) -> Self {
        UserRef::Key(key.to_string())
    }
}

impl From<String> for UserRef {
    fn from(key: String) -> Self {
        UserRef::Key(key)
    }
}

/// The resource a check targets.
///
/// A bare string is the resource type, or `"type:instanceKey"` when it
/// contains a colon; the structured form carries the type plus optional
/// instance key, tenant, and attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    /// `"type"` or `"type:instanceKey"`.
    Text(String),
    /// Structured resource.
    Object {
        /// Resource type.
        #[serde(rename = "type")]
        resource_type: String,
        /// Resource instance key.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Tenant the resource belongs to.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tenant: Option<String>,
        /// Free-form resource attributes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<serde_json::Value>,
    },
}

impl ResourceRef {
    /// The resource type.
    pub fn resource_type(&self) -> &str {
        match self {
            ResourceRef::Text(s) => s.split_once(':').map(|(t, _)| t).unwrap_or(s),
            ResourceRef::Object { resource_type, .. } => resource_type,
        }
    }

    /// The resource instance key, when given.
    pub fn instance_key(&self) -> Option<&str> {
        match self {
            ResourceRef::Text(s) => s.split_once(':').map(|(_, k)| k),
            ResourceRef::Object { key, .. } => key.as_deref(),
        }
    }

    /// Human-readable resource identifier for error messages.
    pub fn describe(&self) -> String {
        match self.instance_key() {
            Some(key) => format!("{}:{}", self.resource_type(), key),
            None => self.resource_type().to_string(),
        }
    }
}

impl From<&str> for ResourceRef {
    fn from(s: &str) -> Self {
        ResourceRef::Text(s.to_string())
    }
}

impl From<String> for ResourceRef {
    fn from(s: String) -> Self {
        ResourceRef::Text(s)
    }
}

/// One permission check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// The acting user.
    pub user: UserRef,

    /// The action to perform.
    pub action: String,

    /// The resource the action targets.
    pub resource: ResourceRef,

    /// Restrict the check to assignments within this tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Free-form context for the check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl CheckRequest {
    /// Create a check request.
    pub fn new(
        user: impl Into<UserRef>,
        action: impl Into<String>,
        resource: impl Into<ResourceRef>,
    ) -> Self {
        Self {
            user: user.into(),
            action: action.into(),
            resource: resource.into(),
            tenant: None,
            context: None,
        }
    }

    /// Scope the check to a tenant.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Attach free-form context.
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Explainability metadata attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionDebug {
    /// Keys of the roles that granted the permission, in assignment order.
    pub matched_roles: Vec<String>,

    /// The permission string satisfied, once per matching role.
    pub matched_permissions: Vec<String>,

    /// Wall-clock evaluation time in milliseconds.
    pub evaluation_time_ms: f64,
}

/// The outcome of one permission check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action is allowed.
    pub allowed: bool,

    /// Human-readable explanation.
    pub reason: String,

    /// Explainability metadata.
    pub debug: DecisionDebug,
}

/// A request paired with its decision, as returned by `bulk_check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCheckItem {
    /// The originating request.
    pub request: CheckRequest,
    /// The decision for that request.
    pub response: Decision,
}

/// Query for a user's full permission listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionQuery {
    /// The user to list permissions for.
    pub user: UserRef,
    /// Restrict to assignments within this tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl PermissionQuery {
    /// Create a query for the given user.
    pub fn new(user: impl Into<UserRef>) -> Self {
        Self {
            user: user.into(),
            tenant: None,
        }
    }

    /// Scope the query to a tenant.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }
}

/// Everything a user can do: assigned roles and their combined permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPermissions {
    /// Keys of the user's assigned roles, in assignment order.
    pub roles: Vec<String>,
    /// De-duplicated union of every assigned role's permission closure.
    pub permissions: Vec<String>,
}

/// The decision engine.
///
/// Stateless beyond its store handle and error policy: every check
/// re-fetches assignments and role definitions, trading efficiency for
/// freshness.
pub struct Enforcer {
    store: Arc<dyn RoleStore>,
    raise_errors: bool,
}

impl Enforcer {
    /// Create an enforcer over a role store.
    ///
    /// With `raise_errors` set, upstream failures surface as errors from
    /// every operation; otherwise they degrade to denied decisions.
    pub fn new(store: Arc<dyn RoleStore>, raise_errors: bool) -> Self {
        Self {
            store,
            raise_errors,
        }
    }

    /// Check a permission, returning only the allowed flag.
    pub async fn check(&self, request: &CheckRequest) -> Result<bool, ClientError> {
        Ok(self.check_with_details(request).await?.allowed)
    }

    /// Check a permission, returning the full decision.
    #[instrument(skip(self, request), fields(user = %request.user.key(), action = %request.action))]
    pub async fn check_with_details(
        &self,
        request: &CheckRequest,
    ) -> Result<Decision, ClientError> {
        let started = Instant::now();

        match self.evaluate(request, started).await {
            Ok(decision) => Ok(decision),
            Err(err) if !self.raise_errors => {
                warn!(error = %err, "Permission check failed, denying");
                Ok(Self::decision(
                    false,
                    format!("Error during permission check: {}", err),
                    Vec::new(),
                    Vec::new(),
                    started,
                ))
            }
            Err(err) => Err(err),
        }
    }

    /// Check a batch of permissions concurrently.
    ///
    /// Individual checks complete in any order, but each decision is paired
    /// with its originating request and the returned items keep the input
    /// order.
    pub async fn bulk_check(
        &self,
        requests: Vec<CheckRequest>,
    ) -> Result<Vec<BulkCheckItem>, ClientError> {
        let checks = requests.into_iter().map(|request| async move {
            let response = self.check_with_details(&request).await;
            (request, response)
        });

        let mut items = Vec::new();
        for (request, response) in future::join_all(checks).await {
            items.push(BulkCheckItem {
                request,
                response: response?,
            });
        }
        Ok(items)
    }

    /// List everything a user can do: assigned roles plus the union of
    /// their permission closures.
    #[instrument(skip(self, query), fields(user = %query.user.key()))]
    pub async fn get_permissions(
        &self,
        query: &PermissionQuery,
    ) -> Result<UserPermissions, ClientError> {
        match self.collect_permissions(query).await {
            Ok(permissions) => Ok(permissions),
            Err(err) if !self.raise_errors => {
                warn!(error = %err, "Permission listing failed, returning empty");
                Ok(UserPermissions::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Check a permission and fail when it is denied.
    ///
    /// The [`ClientError::AccessDenied`] error carries the full decision so
    /// callers can log or forward the explanation.
    pub async fn check_and_throw(&self, request: &CheckRequest) -> Result<Decision, ClientError> {
        let decision = self.check_with_details(request).await?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(ClientError::AccessDenied {
                user: request.user.key().to_string(),
                action: request.action.clone(),
                resource: request.resource.describe(),
                decision: Box::new(decision),
            })
        }
    }

    /// The check pipeline, up to but not including error-policy handling.
    async fn evaluate(
        &self,
        request: &CheckRequest,
        started: Instant,
    ) -> Result<Decision, ClientError> {
        let user_key = request.user.key();
        let required = Permission::new(request.resource.resource_type(), request.action.as_str());

        let assignments = self
            .store
            .list_role_assignments(user_key, request.tenant.as_deref())
            .await?;
        if assignments.is_empty() {
            debug!(user = %user_key, "No role assignments, denying");
            return Ok(Self::decision(
                false,
                format!("User {} has no role assignments", user_key),
                Vec::new(),
                Vec::new(),
                started,
            ));
        }

        let role_keys = assigned_role_keys(&assignments);
        let table = self.store.list_roles().await?;

        let mut matched_roles = Vec::new();
        let mut matched_permissions = Vec::new();
        for key in &role_keys {
            // Closures are computed independently per assigned role so the
            // matched-roles listing reflects each role on its own.
            let closure = resolve_permissions(key, &table);
            if closure.grants(&required) {
                matched_roles.push(key.clone());
                matched_permissions.push(required.to_string());
            }
        }

        let allowed = !matched_roles.is_empty();
        let reason = if allowed {
            format!("Granted by role(s): {}", matched_roles.join(", "))
        } else {
            format!("No role grants permission {}", required)
        };
        Ok(Self::decision(
            allowed,
            reason,
            matched_roles,
            matched_permissions,
            started,
        ))
    }

    /// The listing pipeline behind `get_permissions`.
    async fn collect_permissions(
        &self,
        query: &PermissionQuery,
    ) -> Result<UserPermissions, ClientError> {
        let assignments = self
            .store
            .list_role_assignments(query.user.key(), query.tenant.as_deref())
            .await?;
        if assignments.is_empty() {
            return Ok(UserPermissions::default());
        }

        let roles = assigned_role_keys(&assignments);
        let table = self.store.list_roles().await?;

        let mut union = PermissionSet::new();
        for key in &roles {
            union.merge(&resolve_permissions(key, &table));
        }

        Ok(UserPermissions {
            roles,
            permissions: union.iter().map(str::to_string).collect(),
        })
    }

    fn decision(
        allowed: bool,
        reason: String,
        matched_roles: Vec<String>,
        matched_permissions: Vec<String>,
        started: Instant,
    ) -> Decision {
        Decision {
            allowed,
            reason,
            debug: DecisionDebug {
                matched_roles,
                matched_permissions,
                evaluation_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            },
        }
    }
}

/// De-duplicated role keys from a set of assignments, in assignment order.
///
/// Assignments carrying a resource scope are included like any other: the
/// engine does not filter on the assignment's `resource` fields, matching
/// the service's own evaluation behavior.
fn assigned_role_keys(assignments: &[RoleAssignment]) -> Vec<String> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .filter(|a| seen.insert(a.role.as_str()))
        .map(|a| a.role.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use warden_rbac::RoleDef;

    /// In-memory store that filters like the real service and counts calls.
    struct MockStore {
        assignments: Vec<RoleAssignment>,
        roles: Vec<RoleDef>,
        assignment_calls: AtomicU32,
        role_calls: AtomicU32,
        fail_roles: bool,
    }

    impl MockStore {
        fn new(assignments: Vec<RoleAssignment>, roles: Vec<RoleDef>) -> Self {
            Self {
                assignments,
                roles,
                assignment_calls: AtomicU32::new(0),
                role_calls: AtomicU32::new(0),
                fail_roles: false,
            }
        }

        fn failing_roles(mut self) -> Self {
            self.fail_roles = true;
            self
        }
    }

    #[async_trait]
    impl RoleStore for MockStore {
        async fn list_role_assignments(
            &self,
            user: &str,
            tenant: Option<&str>,
        ) -> Result<Vec<RoleAssignment>, ClientError> {
            self.assignment_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .assignments
                .iter()
                .filter(|a| a.user == user)
                .filter(|a| tenant.map_or(true, |t| a.tenant.as_deref() == Some(t)))
                .cloned()
                .collect())
        }

        async fn list_roles(&self) -> Result<RoleTable, ClientError> {
            self.role_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_roles {
                return Err(ClientError::Api {
                    status: 503,
                    message: "roles unavailable".to_string(),
                });
            }
            Ok(self.roles.iter().cloned().collect())
        }
    }

    fn assignment(user: &str, role: &str) -> RoleAssignment {
        RoleAssignment {
            user: user.to_string(),
            role: role.to_string(),
            tenant: None,
            resource: None,
            resource_instance: None,
        }
    }

    fn editor_admin_store() -> MockStore {
        MockStore::new(
            vec![assignment("u1", "admin")],
            vec![
                RoleDef::new("editor").with_permissions(["document:read", "document:write"]),
                RoleDef::new("admin")
                    .with_permissions(["document:delete"])
                    .with_extends(["editor"]),
            ],
        )
    }

    fn enforcer(store: MockStore) -> (Enforcer, Arc<MockStore>) {
        let store = Arc::new(store);
        (Enforcer::new(store.clone(), false), store)
    }

    #[tokio::test]
    async fn test_direct_permission_allows() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "delete", "document");
        assert!(enforcer.check(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_inherited_permission_allows() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "read", "document");
        assert!(enforcer.check(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_action_denies() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "archive", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "No role grants permission document:archive");
        assert!(decision.debug.matched_roles.is_empty());
    }

    #[tokio::test]
    async fn test_allowed_decision_explains_roles() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "read", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.reason, "Granted by role(s): admin");
        assert_eq!(decision.debug.matched_roles, vec!["admin"]);
        assert_eq!(decision.debug.matched_permissions, vec!["document:read"]);
    }

    #[tokio::test]
    async fn test_no_assignments_short_circuits() {
        let (enforcer, store) = enforcer(editor_admin_store());
        let request = CheckRequest::new("stranger", "read", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, "User stranger has no role assignments");
        // The role table must never be fetched on this path.
        assert_eq!(store.role_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.assignment_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_role_table_fetched_once_per_check() {
        let store = MockStore::new(
            vec![assignment("u1", "admin"), assignment("u1", "editor")],
            vec![
                RoleDef::new("editor").with_permissions(["document:read"]),
                RoleDef::new("admin").with_extends(["editor"]),
            ],
        );
        let (enforcer, store) = enforcer(store);
        let request = CheckRequest::new("u1", "read", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();

        assert_eq!(decision.debug.matched_roles, vec!["admin", "editor"]);
        assert_eq!(store.role_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_assignments_deduplicated() {
        let store = MockStore::new(
            vec![assignment("u1", "admin"), assignment("u1", "admin")],
            vec![RoleDef::new("admin").with_permissions(["document:read"])],
        );
        let (enforcer, _) = enforcer(store);
        let request = CheckRequest::new("u1", "read", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();
        assert_eq!(decision.debug.matched_roles, vec!["admin"]);
    }

    #[tokio::test]
    async fn test_wildcard_role_grants_everything() {
        let store = MockStore::new(
            vec![assignment("root", "superuser")],
            vec![RoleDef::new("superuser").with_permissions(["*:*"])],
        );
        let (enforcer, _) = enforcer(store);
        let request = CheckRequest::new("root", "obliterate", "anything");
        assert!(enforcer.check(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_tenant_filter_restricts_assignments() {
        let mut tenant_assignment = assignment("u1", "admin");
        tenant_assignment.tenant = Some("acme".to_string());
        let store = MockStore::new(
            vec![tenant_assignment],
            vec![RoleDef::new("admin").with_permissions(["document:read"])],
        );
        let (enforcer, _) = enforcer(store);

        let in_tenant = CheckRequest::new("u1", "read", "document").with_tenant("acme");
        assert!(enforcer.check(&in_tenant).await.unwrap());

        let other_tenant = CheckRequest::new("u1", "read", "document").with_tenant("globex");
        let decision = enforcer.check_with_details(&other_tenant).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "User u1 has no role assignments");
    }

    #[tokio::test]
    async fn test_resource_scoped_assignment_still_grants() {
        // The engine does not filter assignments on their resource scope;
        // an assignment pinned to another resource type still counts.
        let mut scoped = assignment("u1", "admin");
        scoped.resource = Some("image".to_string());
        let store = MockStore::new(
            vec![scoped],
            vec![RoleDef::new("admin").with_permissions(["document:read"])],
        );
        let (enforcer, _) = enforcer(store);
        let request = CheckRequest::new("u1", "read", "document");
        assert!(enforcer.check(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_resource_instance_parsing() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "read", "document:doc-123");
        assert!(enforcer.check(&request).await.unwrap());

        let resource = ResourceRef::from("document:doc-123");
        assert_eq!(resource.resource_type(), "document");
        assert_eq!(resource.instance_key(), Some("doc-123"));
        assert_eq!(resource.describe(), "document:doc-123");
    }

    #[tokio::test]
    async fn test_error_policy_degrades_by_default() {
        let (enforcer, _) = enforcer(editor_admin_store().failing_roles());
        let request = CheckRequest::new("u1", "read", "document");
        let decision = enforcer.check_with_details(&request).await.unwrap();

        assert!(!decision.allowed);
        assert!(decision
            .reason
            .starts_with("Error during permission check:"));
    }

    #[tokio::test]
    async fn test_error_policy_raises_when_configured() {
        let store = Arc::new(editor_admin_store().failing_roles());
        let enforcer = Enforcer::new(store, true);
        let request = CheckRequest::new("u1", "read", "document");

        let result = enforcer.check_with_details(&request).await;
        assert!(matches!(result, Err(ClientError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_bulk_check_preserves_request_order() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let requests = vec![
            CheckRequest::new("u1", "delete", "document"),
            CheckRequest::new("u1", "archive", "document"),
            CheckRequest::new("stranger", "read", "document"),
        ];

        let items = enforcer.bulk_check(requests).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].response.allowed);
        assert!(!items[1].response.allowed);
        assert!(!items[2].response.allowed);
        assert_eq!(items[0].request.action, "delete");
        assert_eq!(items[1].request.action, "archive");
        assert_eq!(items[2].request.user.key(), "stranger");
    }

    #[tokio::test]
    async fn test_bulk_check_raises_when_configured() {
        let store = Arc::new(editor_admin_store().failing_roles());
        let enforcer = Enforcer::new(store, true);
        let requests = vec![
            CheckRequest::new("u1", "read", "document"),
            CheckRequest::new("u1", "write", "document"),
        ];

        assert!(enforcer.bulk_check(requests).await.is_err());
    }

    #[tokio::test]
    async fn test_check_is_idempotent() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "read", "document");

        let first = enforcer.check_with_details(&request).await.unwrap();
        let second = enforcer.check_with_details(&request).await.unwrap();

        assert_eq!(first.allowed, second.allowed);
        assert_eq!(first.reason, second.reason);
        assert_eq!(first.debug.matched_roles, second.debug.matched_roles);
        assert_eq!(
            first.debug.matched_permissions,
            second.debug.matched_permissions
        );
    }

    #[tokio::test]
    async fn test_get_permissions_unions_closures() {
        let store = MockStore::new(
            vec![assignment("u1", "admin"), assignment("u1", "auditor")],
            vec![
                RoleDef::new("editor").with_permissions(["document:read", "document:write"]),
                RoleDef::new("admin")
                    .with_permissions(["document:delete"])
                    .with_extends(["editor"]),
                RoleDef::new("auditor").with_permissions(["document:read", "audit:read"]),
            ],
        );
        let (enforcer, _) = enforcer(store);
        let listing = enforcer
            .get_permissions(&PermissionQuery::new("u1"))
            .await
            .unwrap();

        assert_eq!(listing.roles, vec!["admin", "auditor"]);
        assert_eq!(
            listing.permissions,
            vec![
                "audit:read",
                "document:delete",
                "document:read",
                "document:write"
            ]
        );
    }

    #[tokio::test]
    async fn test_get_permissions_empty_for_unknown_user() {
        let (enforcer, store) = enforcer(editor_admin_store());
        let listing = enforcer
            .get_permissions(&PermissionQuery::new("stranger"))
            .await
            .unwrap();

        assert_eq!(listing, UserPermissions::default());
        assert_eq!(store.role_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_check_and_throw_carries_decision() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "archive", "document:doc-9");

        let err = enforcer.check_and_throw(&request).await.unwrap_err();
        match err {
            ClientError::AccessDenied {
                user,
                action,
                resource,
                decision,
            } => {
                assert_eq!(user, "u1");
                assert_eq!(action, "archive");
                assert_eq!(resource, "document:doc-9");
                assert!(!decision.allowed);
            }
            other => panic!("expected AccessDenied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_and_throw_passes_when_allowed() {
        let (enforcer, _) = enforcer(editor_admin_store());
        let request = CheckRequest::new("u1", "delete", "document");
        let decision = enforcer.check_and_throw(&request).await.unwrap();
        assert!(decision.allowed);
    }

    #[test]
    fn test_user_ref_shapes_deserialize() {
        let key: UserRef = serde_json::from_str(r#""u1""#).unwrap();
        assert_eq!(key.key(), "u1");

        let object: UserRef =
            serde_json::from_str(r#"{"key": "u1", "attributes": {"plan": "pro"}}"#).unwrap();
        assert_eq!(object.key(), "u1");
    }

    #[test]
    fn test_resource_ref_shapes_deserialize() {
        let text: ResourceRef = serde_json::from_str(r#""document:doc-1""#).unwrap();
        assert_eq!(text.resource_type(), "document");

        let object: ResourceRef =
            serde_json::from_str(r#"{"type": "document", "key": "doc-1", "tenant": "acme"}"#)
                .unwrap();
        assert_eq!(object.resource_type(), "document");
        assert_eq!(object.instance_key(), Some("doc-1"));
    }
}
