//! # Warden Client
//!
//! Client SDK for the Warden authorization service. Answers "may this user
//! perform this action on this resource?" by fetching the user's role
//! assignments and the role-definition table, expanding role inheritance,
//! and matching exact and wildcard permission grants.
//!
//! ## Overview
//!
//! The warden-client crate handles:
//! - **Enforcement**: `check`, `check_with_details`, `bulk_check`,
//!   `get_permissions`, and `check_and_throw`
//! - **Scope**: resolving the (project, environment) partition of the
//!   backing store, with single-flight lazy lookup
//! - **API client**: the HTTP plumbing against the Warden service,
//!   including pagination and retries
//! - **User sync**: upserting users and their initial role assignments
//!
//! The resolution and matching algorithms themselves live in
//! [`warden_rbac`]; this crate wires them to the service.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use warden_client::{CheckRequest, ClientConfig, Warden};
//!
//! async fn example() -> Result<(), warden_client::ClientError> {
//!     let warden = Warden::new(ClientConfig::new("wdn_live_abc123"))?;
//!
//!     let allowed = warden
//!         .check(&CheckRequest::new("u1", "read", "document:doc-42"))
//!         .await?;
//!     println!("allowed: {allowed}");
//!
//!     let decision = warden
//!         .check_with_details(&CheckRequest::new("u1", "delete", "document"))
//!         .await?;
//!     println!("{}: {}", decision.allowed, decision.reason);
//!     Ok(())
//! }
//! ```
//!
//! ## Error policy
//!
//! A single configuration toggle, [`ClientConfig::raise_errors`], decides
//! how upstream failures surface across the whole SDK: as errors, or
//! degraded to `allowed: false` decisions so boolean-style callers never
//! handle errors. The default is to degrade.

pub mod api;
pub mod client;
pub mod config;
pub mod enforcement;
pub mod error;
pub mod retry;
pub mod scope;

// Re-export main types
pub use api::{ApiClient, InitialAssignment, UserRead, UserSync};
pub use client::Warden;
pub use config::ClientConfig;
pub use enforcement::{
    BulkCheckItem, CheckRequest, Decision, DecisionDebug, Enforcer, PermissionQuery,
    ResourceRef, RoleAssignment, RoleStore, UserPermissions, UserRef,
};
pub use error::ClientError;
pub use retry::{with_retry_if, RetryConfig};
pub use scope::{Scope, ScopeResolver};

// Re-export the core so callers need only one dependency
pub use warden_rbac::{resolve_permissions, Permission, PermissionSet, RoleDef, RoleTable};
