//! The Warden client.
//!
//! The explicitly constructed SDK entry point. There is no process-wide
//! singleton: construct a [`Warden`] where you need one and pass it around.

use std::sync::Arc;

use crate::api::{ApiClient, UserRead, UserSync};
use crate::config::ClientConfig;
use crate::enforcement::{
    BulkCheckItem, CheckRequest, Decision, Enforcer, PermissionQuery, UserPermissions,
};
use crate::error::ClientError;

/// Client for the Warden authorization service.
///
/// # Example
///
/// ```rust,no_run
/// use warden_client::{CheckRequest, ClientConfig, Warden};
///
/// async fn example() -> Result<(), warden_client::ClientError> {
///     let warden = Warden::new(ClientConfig::new("wdn_live_abc123"))?;
///
///     let request = CheckRequest::new("u1", "read", "document");
///     if warden.check(&request).await? {
///         // proceed
///     }
///     Ok(())
/// }
/// ```
pub struct Warden {
    api: Arc<ApiClient>,
    enforcer: Enforcer,
}

impl Warden {
    /// Create a client from the given configuration.
    ///
    /// Fails with [`ClientError::Configuration`] when the API key is
    /// missing or blank.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let raise_errors = config.raise_errors;
        let api = Arc::new(ApiClient::new(config)?);
        let enforcer = Enforcer::new(api.clone(), raise_errors);
        Ok(Self { api, enforcer })
    }

    /// Create a client from `WARDEN_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        self.api.config()
    }

    /// Check a permission, returning only the allowed flag.
    pub async fn check(&self, request: &CheckRequest) -> Result<bool, ClientError> {
        self.enforcer.check(request).await
    }

    /// Check a permission, returning the full decision with explanation.
    pub async fn check_with_details(
        &self,
        request: &CheckRequest,
    ) -> Result<Decision, ClientError> {
        self.enforcer.check_with_details(request).await
    }

    /// Check a batch of permissions concurrently, preserving request order
    /// in the result.
    pub async fn bulk_check(
        &self,
        requests: Vec<CheckRequest>,
    ) -> Result<Vec<BulkCheckItem>, ClientError> {
        self.enforcer.bulk_check(requests).await
    }

    /// List a user's assigned roles and combined permissions.
    pub async fn get_permissions(
        &self,
        query: &PermissionQuery,
    ) -> Result<UserPermissions, ClientError> {
        self.enforcer.get_permissions(query).await
    }

    /// Check a permission and fail with [`ClientError::AccessDenied`] when
    /// it is denied.
    pub async fn check_and_throw(&self, request: &CheckRequest) -> Result<Decision, ClientError> {
        self.enforcer.check_and_throw(request).await
    }

    /// Synchronize a user into the service and assign its initial roles.
    pub async fn sync_user(&self, user: &UserSync) -> Result<UserRead, ClientError> {
        self.api.sync_user(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_requires_token() {
        assert!(matches!(
            Warden::new(ClientConfig::default()),
            Err(ClientError::Configuration(_))
        ));
        assert!(Warden::new(ClientConfig::new("wdn_test_key")).is_ok());
    }
}
