use crate::constants::{DEFAULT_AUTHORITY_HOST, STORAGE_SCOPE, USER_AGENT};
use crate::{Config, Credential};
use async_trait::async_trait;
use blobvend_core::{Context, Error, ProvideCredential, Result};
use log::debug;

/// Acquire a bearer token with the OAuth2 client credentials grant.
///
/// This is the first stage of the vending pipeline: a service principal
/// authenticates with its own client id and secret, without user
/// interaction, and receives a short-lived (~1 hour) bearer token scoped to
/// the storage service.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/active-directory/develop/v2-oauth2-client-creds-grant-flow>
#[derive(Debug, Clone)]
pub struct ClientSecretCredentialProvider {
    config: Config,
}

impl ClientSecretCredentialProvider {
    /// Create a new client secret provider from the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ClientSecretCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            self.config.tenant_id.as_deref().filter(|v| !v.is_empty()),
            self.config.client_id.as_deref().filter(|v| !v.is_empty()),
            self.config
                .client_secret
                .as_deref()
                .filter(|v| !v.is_empty()),
        ) else {
            // Not configured for this flow; let the caller decide.
            return Ok(None);
        };

        let authority_host = self
            .config
            .authority_host
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_AUTHORITY_HOST);

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        );

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", client_id)
            .append_pair("scope", STORAGE_SCOPE)
            .append_pair("client_secret", client_secret)
            .append_pair("grant_type", "client_credentials")
            .finish();

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&url)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(http::header::ACCEPT, "*/*")
            .header(http::header::USER_AGENT, USER_AGENT)
            .body(bytes::Bytes::from(body))
            .map_err(|e| Error::request_invalid("failed to build token request").with_source(e))?;

        let resp = ctx.http_send(req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = String::from_utf8_lossy(resp.body());
            return Err(Error::token_acquisition(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::token_acquisition("failed to parse token response").with_source(e))?;

        let Some(access_token) = token.access_token.filter(|t| !t.is_empty()) else {
            return Err(Error::token_acquisition(
                "token response missing access_token",
            ));
        };

        let expires_in = token.expires_in.map(|secs| {
            blobvend_core::time::now()
                + chrono::TimeDelta::try_seconds(secs as i64)
                    .unwrap_or_else(|| chrono::TimeDelta::try_minutes(10).expect("in bounds"))
        });

        debug!("acquired bearer token from {authority_host}");

        Ok(Some(Credential::new(access_token, expires_in)))
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}
