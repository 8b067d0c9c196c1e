//! # Roles
//!
//! Role definitions and the inheritance-closure resolver.
//!
//! Roles form a directed graph: each role carries the set of permissions it
//! grants directly, plus the keys of parent roles it extends. Resolving a
//! role walks the graph and collects every reachable role's direct
//! permissions into one de-duplicated set.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::permissions::PermissionSet;

/// A role definition as stored in the authorization service.
///
/// # Example
///
/// ```
/// use warden_rbac::roles::RoleDef;
///
/// let role = RoleDef::new("editor")
///     .with_permissions(["document:read", "document:write"]);
/// assert_eq!(role.permissions.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleDef {
    /// Unique role key.
    pub key: String,

    /// Human-readable role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Permission strings granted directly by this role.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Keys of parent roles this role inherits from.
    #[serde(default)]
    pub extends: Vec<String>,
}

impl RoleDef {
    /// Create a role with the given key and no permissions or parents.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Set the directly granted permissions.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the parent roles this role extends.
    pub fn with_extends<I, S>(mut self, extends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends = extends.into_iter().map(Into::into).collect();
        self
    }
}

/// Lookup table from role key to role definition.
///
/// Supplied fresh for each resolution pass; the resolver never mutates it.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, RoleDef>,
}

impl RoleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    /// Insert a role, replacing any existing definition with the same key.
    pub fn insert(&mut self, role: RoleDef) {
        self.roles.insert(role.key.clone(), role);
    }

    /// Look up a role by key.
    pub fn get(&self, key: &str) -> Option<&RoleDef> {
        self.roles.get(key)
    }

    /// Number of roles in the table.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterate over all role definitions.
    pub fn iter(&self) -> impl Iterator<Item = &RoleDef> {
        self.roles.values()
    }
}

impl FromIterator<RoleDef> for RoleTable {
    fn from_iter<T: IntoIterator<Item = RoleDef>>(iter: T) -> Self {
        let mut table = RoleTable::new();
        for role in iter {
            table.insert(role);
        }
        table
    }
}

/// Compute the full permission closure of a role.
///
/// Walks the `extends` graph with an explicit work list, collecting the
/// direct permissions of every reachable role. Each role key is expanded at
/// most once per call, so cycles and diamond inheritance terminate and
/// contribute each permission once. A key missing from the table grants
/// nothing; that is not an error.
///
/// # Example
///
/// ```
/// use warden_rbac::roles::{resolve_permissions, RoleDef, RoleTable};
///
/// let table: RoleTable = [
///     RoleDef::new("viewer").with_permissions(["document:read"]),
///     RoleDef::new("editor")
///         .with_permissions(["document:write"])
///         .with_extends(["viewer"]),
/// ]
/// .into_iter()
/// .collect();
///
/// let closure = resolve_permissions("editor", &table);
/// assert!(closure.contains("document:read"));
/// assert!(closure.contains("document:write"));
/// ```
pub fn resolve_permissions(role_key: &str, table: &RoleTable) -> PermissionSet {
    let mut closure = PermissionSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = vec![role_key];

    while let Some(key) = pending.pop() {
        if !visited.insert(key) {
            continue;
        }
        if let Some(role) = table.get(key) {
            closure.extend(role.permissions.iter().map(String::as_str));
            pending.extend(role.extends.iter().map(String::as_str));
        }
    }

    closure
}
