use crate::constants::{CLOCK_SKEW_MINUTES, KEY_VALIDITY_HOURS, STORAGE_VERSION, USER_AGENT, X_MS_VERSION};
use crate::{Config, Credential, UserDelegationKey};
use async_trait::async_trait;
use blobvend_core::time::{format_rfc3339, now};
use blobvend_core::{Context, Error, ProvideCredential, Result};
use log::debug;
use quick_xml::de;
use serde::Deserialize;

/// Exchange a bearer token for a user delegation key.
///
/// This is the second stage of the vending pipeline. The key is requested
/// with a validity window starting fifteen minutes in the past and ending
/// forty-eight hours later; URLs signed with it must keep their own windows
/// inside that range.
///
/// The provider composes: any bearer-token provider can back it, the usual
/// choice being [`ClientSecretCredentialProvider`].
///
/// [`ClientSecretCredentialProvider`]: crate::ClientSecretCredentialProvider
///
/// Reference: <https://learn.microsoft.com/en-us/rest/api/storageservices/get-user-delegation-key>
#[derive(Debug, Clone)]
pub struct UserDelegationKeyProvider<P> {
    config: Config,
    provider: P,
}

impl<P> UserDelegationKeyProvider<P>
where
    P: ProvideCredential<Credential = Credential>,
{
    /// Create a new provider backed by the given bearer-token provider.
    pub fn new(config: Config, provider: P) -> Self {
        Self { config, provider }
    }
}

#[async_trait]
impl<P> ProvideCredential for UserDelegationKeyProvider<P>
where
    P: ProvideCredential<Credential = Credential>,
{
    type Credential = UserDelegationKey;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(endpoint) = self.config.storage_endpoint() else {
            // No account configured; let the caller decide.
            return Ok(None);
        };

        let Some(bearer) = self.provider.provide_credential(ctx).await? else {
            return Ok(None);
        };

        // Back-date the window to tolerate clock skew. The key outlives the
        // URLs signed with it by a wide margin so one key can serve a day's
        // worth of signing.
        let start = now() - chrono::TimeDelta::try_minutes(CLOCK_SKEW_MINUTES).expect("in bounds");
        let expiry = now() + chrono::TimeDelta::try_hours(KEY_VALIDITY_HOURS).expect("in bounds");

        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<KeyInfo>
  <Start>{}</Start>
  <Expiry>{}</Expiry>
</KeyInfo>"#,
            format_rfc3339(start),
            format_rfc3339(expiry)
        );

        let mut req = http::Request::builder()
            .method(http::Method::POST)
            .uri(format!("{endpoint}/?restype=service&comp=userdelegationkey"))
            .header(http::header::CONTENT_TYPE, "application/xml")
            .header(http::header::ACCEPT, "application/xml")
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(X_MS_VERSION, STORAGE_VERSION)
            .body(bytes::Bytes::from(body))
            .map_err(|e| {
                Error::request_invalid("failed to build delegation key request").with_source(e)
            })?;

        let mut auth: http::HeaderValue = format!("Bearer {}", bearer.token).parse()?;
        auth.set_sensitive(true);
        req.headers_mut().insert(http::header::AUTHORIZATION, auth);

        let resp = ctx.http_send_as_string(req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::delegation_key(format!(
                "delegation key endpoint returned {status}: {}",
                resp.body()
            )));
        }

        let key = parse_user_delegation_key(resp.body())?;
        debug!("acquired delegation key valid {} .. {}", key.signed_start, key.signed_expiry);

        Ok(Some(key))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct UserDelegationKeyResponse {
    signed_oid: Option<String>,
    signed_tid: Option<String>,
    signed_start: Option<String>,
    signed_expiry: Option<String>,
    signed_version: Option<String>,
    value: Option<String>,
}

/// Parse the delegation key XML response, validating that every required
/// field is present. An absent field is a typed error naming the tag, never
/// an empty string threaded through to signing.
fn parse_user_delegation_key(body: &str) -> Result<UserDelegationKey> {
    let resp: UserDelegationKeyResponse = de::from_str(body)
        .map_err(|e| Error::delegation_key("failed to parse delegation key response").with_source(e))?;

    Ok(UserDelegationKey {
        signed_oid: require(resp.signed_oid, "SignedOid")?,
        signed_tid: require(resp.signed_tid, "SignedTid")?,
        signed_start: require(resp.signed_start, "SignedStart")?,
        signed_expiry: require(resp.signed_expiry, "SignedExpiry")?,
        signed_version: require(resp.signed_version, "SignedVersion")?,
        value: require(resp.value, "Value")?,
    })
}

fn require(field: Option<String>, tag: &str) -> Result<String> {
    field
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::delegation_key(format!("delegation key response missing <{tag}>")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedHttpSend;
    use crate::StaticCredentialProvider;
    use blobvend_core::ErrorKind;

    const KEY_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<UserDelegationKey>
  <SignedOid>f81d4fae-7dec-11d0-a765-00a0c91e6bf6</SignedOid>
  <SignedTid>72f988bf-86f1-41af-91ab-2d7cd011db47</SignedTid>
  <SignedStart>2024-01-01T00:00:00Z</SignedStart>
  <SignedExpiry>2024-01-03T00:00:00Z</SignedExpiry>
  <SignedService>b</SignedService>
  <SignedVersion>2019-12-12</SignedVersion>
  <Value>2B5R1xDRnEUSCR6oGpY2Bcm2mUGCsRGB41WAGdhUW1w=</Value>
</UserDelegationKey>"#;

    fn test_config() -> Config {
        Config {
            account_name: Some("testaccount".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_user_delegation_key() {
        let key = parse_user_delegation_key(KEY_RESPONSE).expect("xml deserialize must success");

        assert_eq!(key.signed_oid, "f81d4fae-7dec-11d0-a765-00a0c91e6bf6");
        assert_eq!(key.signed_tid, "72f988bf-86f1-41af-91ab-2d7cd011db47");
        assert_eq!(key.signed_start, "2024-01-01T00:00:00Z");
        assert_eq!(key.signed_expiry, "2024-01-03T00:00:00Z");
        assert_eq!(key.signed_version, "2019-12-12");
        assert_eq!(key.value, "2B5R1xDRnEUSCR6oGpY2Bcm2mUGCsRGB41WAGdhUW1w=");
    }

    #[test]
    fn test_missing_value_names_the_field() {
        let body = KEY_RESPONSE.replace(
            "<Value>2B5R1xDRnEUSCR6oGpY2Bcm2mUGCsRGB41WAGdhUW1w=</Value>",
            "",
        );
        let err = parse_user_delegation_key(&body).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DelegationKey);
        assert!(err.to_string().contains("<Value>"));
    }

    #[tokio::test]
    async fn test_fetches_key_with_bearer_auth() {
        let http = ScriptedHttpSend::ok(KEY_RESPONSE);
        let requests = http.requests();
        let ctx = Context::new().with_http_send(http);

        let provider =
            UserDelegationKeyProvider::new(test_config(), StaticCredentialProvider::new("tok"));
        let key = provider.provide_credential(&ctx).await.unwrap().unwrap();
        assert_eq!(key.signed_version, "2019-12-12");

        let sent = requests.lock().unwrap();
        let req = &sent[0];
        assert_eq!(
            req.uri().to_string(),
            "https://testaccount.blob.core.windows.net/?restype=service&comp=userdelegationkey"
        );
        assert_eq!(req.headers()[http::header::AUTHORIZATION], "Bearer tok");
        assert_eq!(req.headers()[X_MS_VERSION], STORAGE_VERSION);

        // The requested window must be wire-format timestamps without
        // fractional seconds.
        let body = String::from_utf8_lossy(req.body());
        let start = body
            .split("<Start>")
            .nth(1)
            .and_then(|s| s.split("</Start>").next())
            .unwrap();
        assert_eq!(start.len(), 20);
        assert!(start.ends_with('Z') && !start.contains('.'));
    }

    #[tokio::test]
    async fn test_service_error_is_a_typed_error() {
        let http = ScriptedHttpSend::new(
            http::StatusCode::FORBIDDEN,
            "<Error><Code>AuthorizationFailure</Code></Error>",
        );
        let ctx = Context::new().with_http_send(http);

        let provider =
            UserDelegationKeyProvider::new(test_config(), StaticCredentialProvider::new("tok"));
        let err = provider.provide_credential(&ctx).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DelegationKey);
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_unconfigured_account_yields_none() {
        let ctx = Context::new();
        let provider =
            UserDelegationKeyProvider::new(Config::default(), StaticCredentialProvider::new("tok"));
        assert!(provider.provide_credential(&ctx).await.unwrap().is_none());
    }
}
