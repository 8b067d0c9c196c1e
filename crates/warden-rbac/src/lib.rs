//! # Warden RBAC
//!
//! Role-based permission resolution for the Warden SDK. This crate is the
//! pure, I/O-free core shared by the client: permission strings, permission
//! sets with wildcard matching, and the role-inheritance closure resolver.
//!
//! ## Overview
//!
//! The warden-rbac crate handles:
//! - **Permissions**: `"resourceType:action"` strings, including the two
//!   reserved wildcard forms `"resourceType:*"` and `"*:*"`
//! - **Permission Sets**: de-duplicated grant collections with wildcard-aware
//!   membership tests
//! - **Roles**: role definitions with direct permissions and inherited
//!   (`extends`) parent roles
//! - **Closure Resolution**: computing the full set of permissions a role
//!   grants once its inheritance graph is expanded
//!
//! ## Architecture
//!
//! ```text
//! Permission = ResourceType + Action
//!
//! Examples:
//!   "document:read"    - Read documents
//!   "document:*"       - Any action on documents
//!   "*:*"              - Any action on anything
//! ```
//!
//! Roles form a directed graph; edges point from a role to the parents it
//! extends. Resolving a role walks that graph once, collecting every
//! reachable role's direct permissions into a single set. Cycles and diamond
//! inheritance are contained by a visited set rather than treated as errors,
//! so one malformed role definition cannot break unrelated checks.
//!
//! ## Usage
//!
//! ```rust
//! use warden_rbac::{resolve_permissions, Permission, RoleDef, RoleTable};
//!
//! let table: RoleTable = [
//!     RoleDef::new("editor")
//!         .with_permissions(["document:read", "document:write"]),
//!     RoleDef::new("admin")
//!         .with_permissions(["document:delete"])
//!         .with_extends(["editor"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let closure = resolve_permissions("admin", &table);
//! assert_eq!(closure.len(), 3);
//! assert!(closure.grants(&Permission::new("document", "read")));
//! ```

pub mod permissions;
pub mod roles;

// Re-export main types for convenience
pub use permissions::{Permission, PermissionSet, WILDCARD};
pub use roles::{resolve_permissions, RoleDef, RoleTable};
