//! Delegated SAS vending for Azure Blob Storage.
//!
//! This crate mints short-lived, cryptographically signed access URLs for
//! freshly generated blob identifiers without ever holding the storage
//! account's master key:
//!
//! 1. A service principal's client credentials are exchanged for a bearer
//!    token ([`ClientSecretCredentialProvider`])
//! 2. The bearer token is exchanged for a time-boxed user delegation key
//!    ([`UserDelegationKeyProvider`])
//! 3. The delegation key signs per-blob access URLs
//!    ([`BlobDelegationSignature`])
//!
//! [`SasVendor`] wires the three stages together.
//!
//! # Example
//!
//! ```rust,no_run
//! use blobvend_azure_blob::{Config, SasVendor};
//! use blobvend_core::{Context, OsEnv};
//! use blobvend_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> blobvend_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Reads AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET,
//!     // AZBLOB_ACCOUNT_NAME and AZBLOB_CONTAINER
//!     let config = Config::default().from_env(&ctx);
//!
//!     let signed = SasVendor::new(ctx, config).vend().await?;
//!     println!("upload {} to {}", signed.blob_id, signed.url);
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod key;
pub use key::UserDelegationKey;

mod provide_credential;
pub use provide_credential::*;

mod sas;
pub use sas::{BlobDelegationSignature, SignedUrl};

mod vend;
pub use vend::SasVendor;
