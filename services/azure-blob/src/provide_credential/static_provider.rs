use crate::Credential;
use async_trait::async_trait;
use blobvend_core::{Context, ProvideCredential, Result};

/// Provide a fixed bearer credential.
///
/// Useful for tests and for callers that acquire tokens through some channel
/// the pipeline does not know about (e.g. a sidecar or an SDK credential
/// chain) and only want the delegation and signing stages.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a provider that always returns the given bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token, None),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
