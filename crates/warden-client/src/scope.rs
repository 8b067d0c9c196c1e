//! Scope resolution.
//!
//! The client needs a (project, environment) pair before it can address the
//! backing store. Scope can be supplied explicitly in configuration; any
//! missing part is fetched once from the API key's scope endpoint. Fetching
//! is single-flight: concurrent callers share one in-flight lookup for the
//! life of the client.

use std::future::Future;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::ClientError;

/// The (project, environment) partition of the backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Project ID, when known.
    pub project_id: Option<String>,
    /// Environment ID, when known.
    pub environment_id: Option<String>,
}

impl Scope {
    /// Both parts are known.
    pub fn is_complete(&self) -> bool {
        self.project_id.is_some() && self.environment_id.is_some()
    }

    /// At least one part is known.
    pub fn is_partial(&self) -> bool {
        self.project_id.is_some() || self.environment_id.is_some()
    }

    /// Merge a fetched scope underneath this one. Values already present
    /// here always win; only missing parts are filled in.
    pub fn merged_with(&self, fetched: Scope) -> Scope {
        Scope {
            project_id: self.project_id.clone().or(fetched.project_id),
            environment_id: self.environment_id.clone().or(fetched.environment_id),
        }
    }

    /// URL path segments addressing this scope, in project/environment
    /// order, skipping parts that are not known.
    pub fn path_prefix(&self) -> String {
        [self.project_id.as_deref(), self.environment_id.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Resolves the client's scope at most once.
#[derive(Debug)]
pub struct ScopeResolver {
    /// Scope supplied at configuration time. Never overwritten.
    explicit: Scope,
    /// The resolved scope, populated by the first successful `ensure` call.
    resolved: OnceCell<Scope>,
}

impl ScopeResolver {
    /// Create a resolver with the explicitly configured scope parts.
    pub fn new(project_id: Option<String>, environment_id: Option<String>) -> Self {
        Self {
            explicit: Scope {
                project_id,
                environment_id,
            },
            resolved: OnceCell::new(),
        }
    }

    /// Ensure the scope is known, fetching missing parts with `fetch`.
    ///
    /// Concurrent callers share a single in-flight fetch. When the fetch
    /// fails, the explicit scope is used as-is if any part of it was
    /// configured; with no explicit scope at all the failure is fatal, since
    /// the store cannot be addressed.
    pub async fn ensure<F, Fut>(&self, fetch: F) -> Result<&Scope, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Scope, ClientError>>,
    {
        self.resolved
            .get_or_try_init(|| async move {
                if self.explicit.is_complete() {
                    debug!(scope = %self.explicit.path_prefix(), "Using configured scope");
                    return Ok(self.explicit.clone());
                }

                match fetch().await {
                    Ok(fetched) => {
                        let merged = self.explicit.merged_with(fetched);
                        debug!(scope = %merged.path_prefix(), "Resolved scope from API key");
                        Ok(merged)
                    }
                    Err(err) if self.explicit.is_partial() => {
                        warn!(
                            error = %err,
                            "Scope lookup failed, proceeding with configured scope"
                        );
                        Ok(self.explicit.clone())
                    }
                    Err(err) => Err(ClientError::ScopeResolution(err.to_string())),
                }
            })
            .await
    }
}
