use blobvend_core::utils::Redact;
use blobvend_core::Context;
use std::fmt::{Debug, Formatter};

use crate::constants::BLOB_ENDPOINT_SUFFIX;

/// Config carries all the configuration for the vending pipeline.
///
/// Nothing here is read from process globals by the stages themselves: a
/// `Config` is built explicitly (or via [`Config::from_env`]) and passed in.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `tenant_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_TENANT_ID`]
    pub tenant_id: Option<String>,
    /// `client_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_ID`]
    pub client_id: Option<String>,
    /// `client_secret` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_SECRET`]
    pub client_secret: Option<String>,
    /// `authority_host` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_AUTHORITY_HOST`]
    /// - the public cloud authority otherwise
    pub authority_host: Option<String>,
    /// The storage account the vended URLs grant access to.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`]
    pub account_name: Option<String>,
    /// The container newly minted blobs land in.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_CONTAINER`]
    pub container: Option<String>,
    /// Storage endpoint override, e.g. a custom domain. When unset the
    /// endpoint is derived from the account name.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ENDPOINT`]
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("authority_host", &self.authority_host)
            .field("account_name", &self.account_name)
            .field("container", &self.container)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Env var for the directory (tenant) id of the service principal.
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Env var for the application (client) id of the service principal.
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Env var for the client secret of the service principal.
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
/// Env var for the identity provider authority host.
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
/// Env var for the storage account name.
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
/// Env var for the target container.
pub const AZBLOB_CONTAINER: &str = "AZBLOB_CONTAINER";
/// Env var for the storage endpoint override.
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";

impl Config {
    /// Load config from the context's environment.
    ///
    /// Fields already set on the config win over environment values.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.tenant_id.is_none() {
            self.tenant_id = envs.get(AZURE_TENANT_ID).cloned();
        }
        if self.client_id.is_none() {
            self.client_id = envs.get(AZURE_CLIENT_ID).cloned();
        }
        if self.client_secret.is_none() {
            self.client_secret = envs.get(AZURE_CLIENT_SECRET).cloned();
        }
        if self.authority_host.is_none() {
            self.authority_host = envs.get(AZURE_AUTHORITY_HOST).cloned();
        }
        if self.account_name.is_none() {
            self.account_name = envs.get(AZBLOB_ACCOUNT_NAME).cloned();
        }
        if self.container.is_none() {
            self.container = envs.get(AZBLOB_CONTAINER).cloned();
        }
        if self.endpoint.is_none() {
            self.endpoint = envs.get(AZBLOB_ENDPOINT).cloned();
        }

        self
    }

    /// The storage endpoint delegation key requests are sent to, scheme
    /// included. `None` until an account name or endpoint is configured.
    pub(crate) fn storage_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        self.account_name
            .as_ref()
            .map(|account| format!("https://{account}.{BLOB_ENDPOINT_SUFFIX}"))
    }

    /// The host baked into vended URLs: the endpoint override's authority
    /// when set, the account's default blob host otherwise.
    pub(crate) fn blob_host(&self) -> Option<String> {
        if let Some(endpoint) = &self.endpoint {
            let host = endpoint
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            return Some(host.to_string());
        }
        self.account_name
            .as_ref()
            .map(|account| format!("{account}.{BLOB_ENDPOINT_SUFFIX}"))
    }
}
