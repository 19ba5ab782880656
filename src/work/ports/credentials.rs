//! Credential provider port.

use crate::work::domain::AuthToken;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for credential lookups.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// What a credential will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialPurpose {
    /// Issue tracker and hosting API access.
    HostingApi,
}

impl fmt::Display for CredentialPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostingApi => f.write_str("hosting API"),
        }
    }
}

/// Credential lookup contract.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider: Send + Sync {
    /// Returns the token for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] when no token is stored.
    fn get_token(&self, purpose: CredentialPurpose) -> CredentialResult<AuthToken>;
}

/// Errors returned by credential providers.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// No credential is configured for the purpose.
    #[error("no credential configured for {0}")]
    Missing(CredentialPurpose),

    /// Credential backend failure.
    #[error("credential backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CredentialError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
