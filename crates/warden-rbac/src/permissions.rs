//! # Permissions
//!
//! Permission strings and wildcard-aware permission sets.
//! A permission combines a resource type with an action.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The reserved wildcard segment. `"document:*"` grants every action on
/// documents; `"*:*"` grants everything.
pub const WILDCARD: &str = "*";

/// A fully qualified permission: a resource type plus an action.
///
/// Segments are compared byte-for-byte; there is no case normalization and
/// no prefix or glob matching beyond the reserved `*` segment.
///
/// # Example
///
/// ```
/// use warden_rbac::permissions::Permission;
///
/// let perm = Permission::new("document", "read");
/// assert_eq!(perm.to_string(), "document:read");
///
/// let parsed = Permission::parse("document:read").unwrap();
/// assert_eq!(parsed, perm);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// The resource type this permission applies to.
    pub resource_type: String,
    /// The action allowed on the resource type.
    pub action: String,
}

impl Permission {
    /// Create a new permission.
    pub fn new(resource_type: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            action: action.into(),
        }
    }

    /// Parse from string form (e.g., `"document:read"`).
    ///
    /// The string is split on the first colon; anything after it belongs to
    /// the action segment. Returns `None` when either segment is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::permissions::Permission;
    ///
    /// let perm = Permission::parse("document:read").unwrap();
    /// assert_eq!(perm.resource_type, "document");
    /// assert_eq!(perm.action, "read");
    ///
    /// assert!(Permission::parse("document").is_none());
    /// assert!(Permission::parse(":read").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (resource_type, action) = s.split_once(':')?;
        if resource_type.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(resource_type, action))
    }

    /// Check whether either segment is the reserved wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.resource_type == WILDCARD || self.action == WILDCARD
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.action)
    }
}

/// A de-duplicated set of granted permission strings.
///
/// Stored as sorted strings so iteration order is deterministic, which keeps
/// decision output stable across identical inputs.
///
/// # Example
///
/// ```
/// use warden_rbac::permissions::{Permission, PermissionSet};
///
/// let mut set = PermissionSet::new();
/// set.insert("document:read");
/// set.insert("document:*");
/// set.insert("document:read"); // duplicate, ignored
///
/// assert_eq!(set.len(), 2);
/// assert!(set.grants(&Permission::new("document", "write")));
/// assert!(!set.grants(&Permission::new("image", "read")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: BTreeSet<String>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeSet::new(),
        }
    }

    /// Add a permission string to the set.
    pub fn insert(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    /// Add multiple permission strings to the set.
    pub fn extend<I, S>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for perm in permissions {
            self.insert(perm);
        }
    }

    /// Check for an exact (non-wildcard-aware) member.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Decide whether a required permission is satisfied by this set.
    ///
    /// The required permission must be fully qualified (no wildcards); the
    /// grant succeeds if the set contains the exact string, the
    /// `"<type>:*"` form, or `"*:*"`.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::permissions::{Permission, PermissionSet};
    ///
    /// let mut set = PermissionSet::new();
    /// set.insert("*:*");
    /// assert!(set.grants(&Permission::new("document", "read")));
    /// ```
    pub fn grants(&self, required: &Permission) -> bool {
        if self.permissions.contains(&required.to_string()) {
            return true;
        }
        let type_wildcard = format!("{}:{}", required.resource_type, WILDCARD);
        if self.permissions.contains(&type_wildcard) {
            return true;
        }
        self.permissions.contains("*:*")
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        for perm in &other.permissions {
            self.permissions.insert(perm.clone());
        }
    }

    /// Iterate over the permission strings in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        set.extend(iter);
        set
    }
}
