use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is implemented by values a signing stage can key off.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is still usable for signing.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used to acquire a credential from the
/// environment.
///
/// Stages may require different credentials: the token exchange yields a
/// bearer token, while the delegation key request yields a signing key bound
/// to a security principal. Providers compose: a provider may wrap another
/// provider and exchange its credential for a stronger one.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: SigningCredential;

    /// Acquire a credential.
    ///
    /// Returns `Ok(None)` when this provider is not configured for the
    /// current environment; returns an error when the provider is configured
    /// but the acquisition fails.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
