//! Mint a delegated upload URL for a fresh blob.
//!
//! ```shell
//! export AZURE_TENANT_ID=...
//! export AZURE_CLIENT_ID=...
//! export AZURE_CLIENT_SECRET=...
//! export AZBLOB_ACCOUNT_NAME=...
//! export AZBLOB_CONTAINER=...
//! cargo run --example vend_upload_url
//! ```

use blobvend_azure_blob::{Config, SasVendor};
use blobvend_core::{Context, OsEnv, Result};
use blobvend_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let config = Config::default().from_env(&ctx);
    let vendor = SasVendor::new(ctx, config);

    // One delegation key can sign many URLs; fetch it once.
    let key = vendor.delegation_key().await?;

    for _ in 0..3 {
        let signed = vendor.sign(&key)?;
        println!("{}\n  {}\n", signed.blob_id, signed.url);
    }

    Ok(())
}
