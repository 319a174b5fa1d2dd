use blobvend_core::utils::Redact;
use blobvend_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Key issued by the storage service, bound to a security principal, used to
/// sign delegated access URLs.
///
/// All fields are wire-format strings: the validity timestamps are carried
/// verbatim into signatures, so they are never reparsed here. The key is an
/// immutable value; one key may sign any number of URLs concurrently.
///
/// The signing window of every URL must lie inside
/// [`signed_start`](Self::signed_start)..[`signed_expiry`](Self::signed_expiry);
/// the storage service rejects signatures outside it at use time.
#[derive(Clone)]
pub struct UserDelegationKey {
    /// Object id of the security principal the key is bound to.
    pub signed_oid: String,
    /// Tenant id of the security principal.
    pub signed_tid: String,
    /// Start of the key's validity window.
    pub signed_start: String,
    /// End of the key's validity window.
    pub signed_expiry: String,
    /// Storage service version the key was issued under.
    pub signed_version: String,
    /// The signing secret, base64 encoded raw bytes.
    pub value: String,
}

impl Debug for UserDelegationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDelegationKey")
            .field("signed_oid", &self.signed_oid)
            .field("signed_tid", &self.signed_tid)
            .field("signed_start", &self.signed_start)
            .field("signed_expiry", &self.signed_expiry)
            .field("signed_version", &self.signed_version)
            .field("value", &Redact::from(&self.value))
            .finish()
    }
}

impl SigningCredential for UserDelegationKey {
    fn is_valid(&self) -> bool {
        !self.signed_oid.is_empty()
            && !self.signed_tid.is_empty()
            && !self.signed_start.is_empty()
            && !self.signed_expiry.is_empty()
            && !self.signed_version.is_empty()
            && !self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_is_valid_requires_all_fields() {
        assert!(test_key().is_valid());

        let mut key = test_key();
        key.value = String::new();
        assert!(!key.is_valid());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let out = format!("{:?}", test_key());
        assert!(out.contains("AAA***A=="));
        assert!(!out.contains("AAAAAAAAAAAAAAAAAAAAAA=="));
    }
}
