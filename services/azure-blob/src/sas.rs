use crate::constants::*;
use crate::UserDelegationKey;
use blobvend_core::hash;
use blobvend_core::time::{self, DateTime};
use blobvend_core::Result;
use log::debug;

/// A freshly minted, delegated access URL.
#[derive(Debug, Clone)]
pub struct SignedUrl {
    /// The generated blob identifier.
    pub blob_id: String,
    /// The fully assembled access URL, signature included. Not reusable
    /// beyond its embedded validity window.
    pub url: String,
}

/// Signs one delegated, time-boxed blob URL with a [`UserDelegationKey`].
///
/// Each [`sign`](Self::sign) call mints a fresh blob identifier and returns
/// a URL granting write and tag access to that blob for twelve hours.
/// Signing is a pure local computation: the builder only reads the key, so
/// one key may back any number of concurrent signers.
///
/// - [Create a user delegation SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-user-delegation-sas)
#[derive(Debug)]
pub struct BlobDelegationSignature {
    key: UserDelegationKey,
    account: String,
    container: String,
    host: Option<String>,
    permissions: String,
    ip: Option<String>,
    protocol: String,
    version: String,
    time: Option<DateTime>,
    blob_id: Option<String>,
}

impl BlobDelegationSignature {
    /// Create a signer with default parameters.
    pub fn new(key: UserDelegationKey, account: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            key,
            account: account.into(),
            container: container.into(),
            host: None,
            permissions: SAS_PERMISSIONS.to_string(),
            ip: None,
            protocol: SAS_PROTOCOL.to_string(),
            version: STORAGE_VERSION.to_string(),
            time: None,
            blob_id: None,
        }
    }

    /// Bake a non-default host into the emitted URL, e.g. a custom domain
    /// fronting the storage account.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Override the granted permission set.
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Restrict the URL to an IP address or range.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign URLs.
    /// Only use this function for testing.
    #[cfg(test)]
    pub(crate) fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the blob identifier instead of generating one.
    ///
    /// # Note
    ///
    /// Only use this function for testing; production identifiers must be
    /// freshly generated so URLs never collide.
    #[cfg(test)]
    pub(crate) fn with_blob_id(mut self, blob_id: impl Into<String>) -> Self {
        self.blob_id = Some(blob_id.into());
        self
    }

    /// Two-level fan-out path for a blob id: `d/de/deadbeef-…`. Keeps any
    /// single storage prefix from accumulating an unbounded number of
    /// entries.
    fn blob_path(blob_id: &str) -> String {
        format!("{}/{}/{}", &blob_id[..1], &blob_id[..2], blob_id)
    }

    /// The canonical string the signature is computed over.
    ///
    /// Exactly these fields, in exactly this order, newline-joined, with a
    /// line for every field even when blank: dropping a blank line shifts
    /// every following field and the service rejects the signature without
    /// further diagnostics. The published docs for version 2019-12-12 omit
    /// the blank snapshot-time line; the service does not. The authorized
    /// object id parameters (saoid/suoid/scid) are not part of this
    /// version's signature.
    fn string_to_sign(&self, canonical_resource: &str, start: &str, expiry: &str) -> String {
        [
            self.permissions.as_str(),            // sp
            start,                                // st
            expiry,                               // se
            canonical_resource,                   // signed but never emitted
            self.key.signed_oid.as_str(),         // skoid
            self.key.signed_tid.as_str(),         // sktid
            self.key.signed_start.as_str(),       // skt
            self.key.signed_expiry.as_str(),      // ske
            SAS_KEY_SERVICE,                      // sks
            self.key.signed_version.as_str(),     // skv
            self.ip.as_deref().unwrap_or(""),     // sip
            self.protocol.as_str(),               // spr
            self.version.as_str(),                // sv
            SAS_RESOURCE,                         // sr
            "",                                   // snapshot time, unused
            "",                                   // rscc
            "",                                   // rscd
            "",                                   // rsce
            "",                                   // rscl
            "",                                   // rsct
        ]
        .join("\n")
    }

    fn signature(&self, string_to_sign: &str) -> Result<String> {
        // The secret is raw bytes behind base64, never a UTF-8 string key.
        let decoded_key = hash::base64_decode(&self.key.value)?;
        Ok(hash::base64_hmac_sha256(
            &decoded_key,
            string_to_sign.as_bytes(),
        ))
    }

    /// Mint one signed URL.
    pub fn sign(&self) -> Result<SignedUrl> {
        let blob_id = self
            .blob_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let blob_path = Self::blob_path(&blob_id);
        let canonical_resource =
            format!("/blob/{}/{}/{}", self.account, self.container, blob_path);

        let now = self.time.unwrap_or_else(time::now);
        let start = time::format_rfc3339(
            now - chrono::TimeDelta::try_minutes(CLOCK_SKEW_MINUTES).expect("in bounds"),
        );
        let expiry = time::format_rfc3339(
            now + chrono::TimeDelta::try_hours(SAS_VALIDITY_HOURS).expect("in bounds"),
        );

        let string_to_sign = self.string_to_sign(&canonical_resource, &start, &expiry);
        debug!("string to sign: {}", &string_to_sign);

        let sig = self.signature(&string_to_sign)?;

        // The emitted query carries only the non-empty parameters, in the
        // same relative order as the string to sign. The signature covers
        // the full fixed field set either way.
        let mut elements: Vec<(&str, &str)> = vec![
            ("sp", self.permissions.as_str()),
            ("st", start.as_str()),
            ("se", expiry.as_str()),
            ("skoid", self.key.signed_oid.as_str()),
            ("sktid", self.key.signed_tid.as_str()),
            ("skt", self.key.signed_start.as_str()),
            ("ske", self.key.signed_expiry.as_str()),
            ("sks", SAS_KEY_SERVICE),
            ("skv", self.key.signed_version.as_str()),
        ];
        if let Some(ip) = self.ip.as_deref().filter(|v| !v.is_empty()) {
            elements.push(("sip", ip));
        }
        elements.push(("spr", self.protocol.as_str()));
        elements.push(("sv", self.version.as_str()));
        elements.push(("sr", SAS_RESOURCE));
        elements.push(("sig", sig.as_str()));

        let query = elements
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoded(v)))
            .collect::<Vec<String>>()
            .join("&");

        let host = self
            .host
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.account, BLOB_ENDPOINT_SUFFIX));

        Ok(SignedUrl {
            url: format!("https://{}/{}/{}?{}", host, self.container, blob_path, query),
            blob_id,
        })
    }
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use pretty_assertions::assert_eq;

    const TEST_BLOB_ID: &str = "deadbeef-0000-4000-8000-000000000000";

    fn test_key() -> UserDelegationKey {
        UserDelegationKey {
            signed_oid: "abc".to_string(),
            signed_tid: "def".to_string(),
            signed_start: "2024-01-01T00:00:00Z".to_string(),
            signed_expiry: "2024-01-03T00:00:00Z".to_string(),
            signed_version: "2019-12-12".to_string(),
            value: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
        }
    }

    fn test_time() -> DateTime {
        DateTime::from_str("2024-01-01T12:00:00Z").unwrap()
    }

    fn test_signer() -> BlobDelegationSignature {
        BlobDelegationSignature::new(test_key(), "testaccount", "upload")
            .with_time(test_time())
            .with_blob_id(TEST_BLOB_ID)
    }

    #[test]
    fn test_golden_signature() {
        // Golden vector computed independently over the canonical field
        // order with HMAC-SHA256 and a 16-zero-byte key.
        let signed = test_signer().sign().expect("signing must succeed");

        assert_eq!(signed.blob_id, TEST_BLOB_ID);
        assert_eq!(
            signed.url,
            "https://testaccount.blob.core.windows.net/upload/d/de/deadbeef-0000-4000-8000-000000000000\
             ?sp=wt&st=2024-01-01T11%3A45%3A00Z&se=2024-01-02T00%3A00%3A00Z\
             &skoid=abc&sktid=def&skt=2024-01-01T00%3A00%3A00Z&ske=2024-01-03T00%3A00%3A00Z\
             &sks=b&skv=2019-12-12&spr=https&sv=2019-12-12&sr=b\
             &sig=79CTcKjm9kqfl3Rv7bU6yHVAJCrRB8fAgV1%2B9RU3cRQ%3D"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let first = test_signer().sign().unwrap();
        let second = test_signer().sign().unwrap();
        assert_eq!(first.url, second.url);
    }

    #[test]
    fn test_any_field_change_changes_the_signature() {
        fn sig_of(url: &str) -> &str {
            url.rsplit("sig=").next().unwrap()
        }

        let base = test_signer().sign().unwrap();

        // canonical resource
        let other = BlobDelegationSignature::new(test_key(), "testaccount", "elsewhere")
            .with_time(test_time())
            .with_blob_id(TEST_BLOB_ID)
            .sign()
            .unwrap();
        assert_ne!(sig_of(&base.url), sig_of(&other.url));

        // permissions
        let other = test_signer().with_permissions("r").sign().unwrap();
        assert_ne!(sig_of(&base.url), sig_of(&other.url));

        // ip restriction occupies an otherwise-blank signed line
        let other = test_signer().with_ip("168.1.5.60-168.1.5.70").sign().unwrap();
        assert_ne!(sig_of(&base.url), sig_of(&other.url));
    }

    #[test]
    fn test_different_now_same_key_fields() {
        // Same delegation key signed at two different times: the window and
        // signature move, the principal and tenant stay put.
        let earlier = test_signer().sign().unwrap();
        let later = BlobDelegationSignature::new(test_key(), "testaccount", "upload")
            .with_time(test_time() + chrono::TimeDelta::try_hours(2).unwrap())
            .with_blob_id(TEST_BLOB_ID)
            .sign()
            .unwrap();

        assert!(earlier.url.contains("st=2024-01-01T11%3A45%3A00Z"));
        assert!(later.url.contains("st=2024-01-01T13%3A45%3A00Z"));
        assert!(earlier.url.contains("sig=79CTcKjm9kqfl3Rv7bU6yHVAJCrRB8fAgV1%2B9RU3cRQ%3D"));
        assert!(later.url.contains("sig=zxdOkfbh7w3KqOrrhYQvPVzmjl9ggaOeyZ5WStXRZBo%3D"));
        for url in [&earlier.url, &later.url] {
            assert!(url.contains("skoid=abc"));
            assert!(url.contains("sktid=def"));
        }
    }

    #[test]
    fn test_string_to_sign_keeps_blank_lines() {
        let signer = test_signer();
        let string_to_sign = signer.string_to_sign(
            "/blob/testaccount/upload/d/de/deadbeef-0000-4000-8000-000000000000",
            "2024-01-01T11:45:00Z",
            "2024-01-02T00:00:00Z",
        );

        let lines: Vec<&str> = string_to_sign.split('\n').collect();
        assert_eq!(lines.len(), 20);
        // sip, snapshot time and the five response header overrides stay
        // blank but keep their lines
        assert_eq!(lines[10], "");
        assert_eq!(&lines[14..20], &["", "", "", "", "", ""]);
    }

    #[test]
    fn test_query_omits_empty_and_unemitted_fields() {
        let signed = test_signer().sign().unwrap();
        let query = signed.url.split('?').nth(1).unwrap();

        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            assert!(!v.is_empty(), "query key {k} has an empty value");
        }
        // signed-only fields never reach the URL
        assert!(!query.contains("canonicalizedResource"));
        assert!(!query.contains("sip="));

        // an IP restriction, once set, is emitted between skv and spr
        let signed = test_signer().with_ip("168.1.5.60").sign().unwrap();
        assert!(signed.url.contains("&skv=2019-12-12&sip=168.1.5.60&spr=https&"));
    }

    #[test]
    fn test_blob_path_is_sharded_by_id_prefix() {
        assert_eq!(
            BlobDelegationSignature::blob_path("deadbeef-0000-4000-8000-000000000000"),
            "d/de/deadbeef-0000-4000-8000-000000000000"
        );

        let signed = BlobDelegationSignature::new(test_key(), "testaccount", "upload")
            .sign()
            .unwrap();
        let id = &signed.blob_id;
        assert_eq!(id.len(), 36);
        assert!(signed
            .url
            .contains(&format!("/upload/{}/{}/{}?", &id[..1], &id[..2], id)));
    }

    #[test]
    fn test_fresh_ids_do_not_collide() {
        let a = BlobDelegationSignature::new(test_key(), "testaccount", "upload")
            .sign()
            .unwrap();
        let b = BlobDelegationSignature::new(test_key(), "testaccount", "upload")
            .sign()
            .unwrap();
        assert_ne!(a.blob_id, b.blob_id);
    }

    #[test]
    fn test_host_override() {
        let signed = test_signer().with_host("cdn.example.com").sign().unwrap();
        assert!(signed.url.starts_with("https://cdn.example.com/upload/"));
    }

    #[test]
    fn test_malformed_key_secret_is_a_signing_error() {
        let mut key = test_key();
        key.value = "not base64!!".to_string();
        let err = BlobDelegationSignature::new(key, "testaccount", "upload")
            .sign()
            .unwrap_err();
        assert_eq!(err.kind(), blobvend_core::ErrorKind::Signing);
    }
}
