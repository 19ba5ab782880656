//! Fixed credential provider.

use std::collections::HashMap;

use crate::work::{
    domain::AuthToken,
    ports::{CredentialError, CredentialProvider, CredentialPurpose, CredentialResult},
};

/// Credential provider serving tokens from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    tokens: HashMap<CredentialPurpose, AuthToken>,
}

impl StaticCredentialProvider {
    /// Creates a provider with no tokens.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a provider serving `token` for the hosting API.
    #[must_use]
    pub fn new(token: AuthToken) -> Self {
        Self::empty().with_token(CredentialPurpose::HostingApi, token)
    }

    /// Sets the token for `purpose`.
    #[must_use]
    pub fn with_token(mut self, purpose: CredentialPurpose, token: AuthToken) -> Self {
        self.tokens.insert(purpose, token);
        self
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_token(&self, purpose: CredentialPurpose) -> CredentialResult<AuthToken> {
        self.tokens
            .get(&purpose)
            .cloned()
            .ok_or(CredentialError::Missing(purpose))
    }
}
