//! Warden API client.
//!
//! HTTP client for the Warden authorization service. Exposes the read
//! operations the decision engine consumes (role assignments, role
//! definitions, API key scope) plus the user-sync write path. Transport
//! details stay here; the engine only sees normalized domain types.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use warden_rbac::{RoleDef, RoleTable};

use crate::config::ClientConfig;
use crate::enforcement::{RoleAssignment, RoleStore};
use crate::error::ClientError;
use crate::retry::{with_retry_if, RetryConfig};
use crate::scope::{Scope, ScopeResolver};

/// Scope attached to an API key, as reported by the service.
#[derive(Debug, Clone, Deserialize)]
struct ApiKeyScope {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    environment_id: Option<String>,
}

/// A list response from the service.
///
/// Endpoints answer either with a bare JSON array or with a wrapped
/// `{"data": [...]}` object; both are normalized to a plain `Vec` before
/// anything downstream sees them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Wrapped { data } => data,
            ListResponse::Bare(items) => items,
        }
    }
}

/// A user to synchronize into the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSync {
    /// Unique user key.
    pub key: String,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Free-form user attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,

    /// Roles to assign after the upsert.
    #[serde(default)]
    pub roles: Vec<InitialAssignment>,
}

impl UserSync {
    /// Create a sync request for the given user key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Add a role to assign, optionally scoped to a tenant.
    pub fn with_role(mut self, role: impl Into<String>, tenant: Option<String>) -> Self {
        self.roles.push(InitialAssignment {
            role: role.into(),
            tenant,
        });
        self
    }
}

/// A role to assign during user sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialAssignment {
    /// Role key.
    pub role: String,
    /// Optional tenant scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

/// A synchronized user as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRead {
    /// Unique user key.
    pub key: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Upsert body for the user-sync PUT; the role list travels separately.
#[derive(Serialize)]
struct UserUpsert<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a serde_json::Value>,
}

/// Assignment creation body.
#[derive(Serialize)]
struct AssignmentCreate<'a> {
    user: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant: Option<&'a str>,
}

/// HTTP client for the Warden service.
pub struct ApiClient {
    /// HTTP client instance.
    client: Client,

    /// Client configuration.
    config: ClientConfig,

    /// Lazily resolved (project, environment) scope.
    scope: ScopeResolver,

    /// Retry policy for idempotent fetches.
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// Fails with [`ClientError::Configuration`] when the API key is missing.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to build HTTP client");
        let scope = ScopeResolver::new(config.project.clone(), config.environment.clone());
        let retry = RetryConfig::with_max_attempts(config.max_retries);

        Ok(Self {
            client,
            config,
            scope,
            retry,
        })
    }

    /// Access the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a full URL by appending a path to the configured base URL.
    fn url(&self, path: &str) -> String {
        let base = self.config.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Build a URL under the resolved scope.
    fn scoped_url(&self, scope: &Scope, resource: &str) -> String {
        let prefix = scope.path_prefix();
        if prefix.is_empty() {
            self.url(&format!("v1/{}", resource))
        } else {
            self.url(&format!("v1/{}/{}", prefix, resource))
        }
    }

    /// Resolve the client scope, fetching it from the service on first use.
    pub async fn ensure_scope(&self) -> Result<&Scope, ClientError> {
        self.scope.ensure(|| self.fetch_scope()).await
    }

    /// Fetch the scope attached to the configured API key.
    #[instrument(skip(self))]
    async fn fetch_scope(&self) -> Result<Scope, ClientError> {
        debug!("Fetching API key scope");
        let url = self.url("v1/scope");
        let scope: ApiKeyScope = self.get_json(&url, &[]).await?;
        Ok(Scope {
            project_id: scope.project_id,
            environment_id: scope.environment_id,
        })
    }

    /// List role assignments for a user, optionally filtered by tenant.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn list_role_assignments(
        &self,
        user: &str,
        tenant: Option<&str>,
    ) -> Result<Vec<RoleAssignment>, ClientError> {
        let scope = self.ensure_scope().await?;
        let url = self.scoped_url(scope, "role-assignments");

        let mut query = vec![("user".to_string(), user.to_string())];
        if let Some(tenant) = tenant {
            query.push(("tenant".to_string(), tenant.to_string()));
        }

        let response: ListResponse<RoleAssignment> = self.get_json(&url, &query).await?;
        Ok(response.into_items())
    }

    /// Fetch the full role-definition table, following pagination.
    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<RoleTable, ClientError> {
        let scope = self.ensure_scope().await?;
        let url = self.scoped_url(scope, "roles");

        let mut roles: Vec<RoleDef> = Vec::new();
        let mut page: u32 = 1;
        loop {
            let query = vec![
                ("page".to_string(), page.to_string()),
                ("per_page".to_string(), self.config.per_page.to_string()),
            ];
            let batch: Vec<RoleDef> = self
                .get_json::<ListResponse<RoleDef>>(&url, &query)
                .await?
                .into_items();
            let count = batch.len() as u32;
            roles.extend(batch);
            if count < self.config.per_page {
                break;
            }
            page += 1;
        }

        debug!(roles = roles.len(), "Fetched role definitions");
        Ok(roles.into_iter().collect())
    }

    /// Synchronize a user: upsert the user record, then assign each of the
    /// requested roles.
    #[instrument(skip(self, user), fields(user_key = %user.key))]
    pub async fn sync_user(&self, user: &UserSync) -> Result<UserRead, ClientError> {
        let scope = self.ensure_scope().await?;

        let upsert = UserUpsert {
            key: &user.key,
            email: user.email.as_deref(),
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            attributes: user.attributes.as_ref(),
        };
        let url = self.scoped_url(scope, &format!("users/{}", user.key));
        let request = self.client.put(&url).bearer_auth(&self.config.token).json(&upsert);
        let read: UserRead = self.send_json(request).await?;

        let assignments_url = self.scoped_url(scope, "role-assignments");
        for assignment in &user.roles {
            let body = AssignmentCreate {
                user: &user.key,
                role: &assignment.role,
                tenant: assignment.tenant.as_deref(),
            };
            let request = self
                .client
                .post(&assignments_url)
                .bearer_auth(&self.config.token)
                .json(&body);
            let _: serde_json::Value = self.send_json(request).await?;
        }

        Ok(read)
    }

    /// GET with retries on transient failures.
    async fn get_json<T>(&self, url: &str, query: &[(String, String)]) -> Result<T, ClientError>
    where
        T: for<'de> Deserialize<'de>,
    {
        with_retry_if(
            &self.retry,
            || {
                let request = self.client.get(url).query(query).bearer_auth(&self.config.token);
                self.send_json(request)
            },
            ClientError::is_retryable,
        )
        .await
    }

    /// Send a request and parse the JSON response.
    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ClientError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Warden API error ({}): {}", status.as_u16(), message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RoleStore for ApiClient {
    async fn list_role_assignments(
        &self,
        user: &str,
        tenant: Option<&str>,
    ) -> Result<Vec<RoleAssignment>, ClientError> {
        ApiClient::list_role_assignments(self, user, tenant).await
    }

    async fn list_roles(&self) -> Result<RoleTable, ClientError> {
        ApiClient::list_roles(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_missing_token() {
        let config = ClientConfig::default();
        assert!(matches!(
            ApiClient::new(config),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_url_building() {
        let mut config = ClientConfig::new("test-key");
        config.api_url = "https://api.example.com/".to_string();
        let client = ApiClient::new(config).unwrap();

        assert_eq!(client.url("/v1/scope"), "https://api.example.com/v1/scope");
        assert_eq!(client.url("v1/scope"), "https://api.example.com/v1/scope");

        let scope = Scope {
            project_id: Some("proj".to_string()),
            environment_id: Some("env".to_string()),
        };
        assert_eq!(
            client.scoped_url(&scope, "roles"),
            "https://api.example.com/v1/proj/env/roles"
        );
    }

    #[test]
    fn test_list_response_normalization() {
        let wrapped: ListResponse<RoleAssignment> =
            serde_json::from_str(r#"{"data": [{"user": "u1", "role": "admin"}]}"#).unwrap();
        assert_eq!(wrapped.into_items().len(), 1);

        let bare: ListResponse<RoleAssignment> =
            serde_json::from_str(r#"[{"user": "u1", "role": "admin"}]"#).unwrap();
        assert_eq!(bare.into_items().len(), 1);

        let empty: ListResponse<RoleAssignment> = serde_json::from_str("[]").unwrap();
        assert!(empty.into_items().is_empty());
    }

    #[test]
    fn test_user_sync_builder() {
        let user = UserSync::new("u1")
            .with_email("u1@example.com")
            .with_role("admin", None)
            .with_role("viewer", Some("acme".to_string()));
        assert_eq!(user.roles.len(), 2);
        assert_eq!(user.roles[1].tenant.as_deref(), Some("acme"));
    }
}
