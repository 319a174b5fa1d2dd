use crate::{
    BlobDelegationSignature, ClientSecretCredentialProvider, Config, SignedUrl,
    UserDelegationKey, UserDelegationKeyProvider,
};
use blobvend_core::{Context, Error, ProvideCredential, Result};

/// The sequential vending pipeline: client credentials → delegation key →
/// signed URL.
///
/// `SasVendor` composes the three stages explicitly and never caches between
/// runs: every [`vend`](Self::vend) call performs both network stages again.
/// Callers that mint many URLs should fetch one key with
/// [`delegation_key`](Self::delegation_key) and then call
/// [`sign`](Self::sign) per URL — signing is pure and the key may be shared
/// across tasks freely. Retry, backoff and key refresh policies also belong
/// to the caller.
///
/// # Example
///
/// ```no_run
/// use blobvend_azure_blob::{Config, SasVendor};
/// use blobvend_core::Context;
///
/// # async fn example(ctx: Context) -> blobvend_core::Result<()> {
/// let config = Config::default().from_env(&ctx);
/// let vendor = SasVendor::new(ctx, config);
///
/// let key = vendor.delegation_key().await?;
/// for _ in 0..16 {
///     let signed = vendor.sign(&key)?;
///     println!("{} -> {}", signed.blob_id, signed.url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SasVendor {
    ctx: Context,
    config: Config,
    provider: UserDelegationKeyProvider<ClientSecretCredentialProvider>,
}

impl SasVendor {
    /// Create a vendor for the given configuration.
    pub fn new(ctx: Context, config: Config) -> Self {
        let provider = UserDelegationKeyProvider::new(
            config.clone(),
            ClientSecretCredentialProvider::new(config.clone()),
        );
        Self {
            ctx,
            config,
            provider,
        }
    }

    /// Run the two network stages and return a delegation key.
    pub async fn delegation_key(&self) -> Result<UserDelegationKey> {
        self.provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| {
                Error::config_invalid(
                    "vending is not configured: set account name, tenant id, client id and client secret",
                )
            })
    }

    /// Mint one signed URL with an already fetched delegation key.
    ///
    /// Pure local computation; suitable for concurrent use with a shared key.
    pub fn sign(&self, key: &UserDelegationKey) -> Result<SignedUrl> {
        let account = self
            .config
            .account_name
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("account name is required for signing"))?;
        let container = self
            .config
            .container
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("container is required for signing"))?;

        let mut signer = BlobDelegationSignature::new(key.clone(), account, container);
        if self.config.endpoint.is_some() {
            if let Some(host) = self.config.blob_host() {
                signer = signer.with_host(host);
            }
        }

        signer.sign()
    }

    /// Run the whole pipeline: fetch a fresh delegation key and mint one URL.
    pub async fn vend(&self) -> Result<SignedUrl> {
        let key = self.delegation_key().await?;
        self.sign(&key)
    }
}
