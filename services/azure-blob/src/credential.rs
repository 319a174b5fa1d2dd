use blobvend_core::time::{now, DateTime};
use blobvend_core::utils::Redact;
use blobvend_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Bearer credential obtained from the identity provider.
///
/// The token is opaque: nothing in the pipeline relies on its internal
/// structure. It is held in memory for the duration of one pipeline run and
/// never persisted.
#[derive(Clone)]
pub struct Credential {
    /// The bearer token.
    pub token: String,
    /// Expiration time for this credential, if the provider reported one.
    pub expires_in: Option<DateTime>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &Redact::from(&self.token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl Credential {
    /// Create a new bearer credential.
    pub fn new(token: impl Into<String>, expires_in: Option<DateTime>) -> Self {
        Self {
            token: token.into(),
            expires_in,
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        if self.token.is_empty() {
            return false;
        }
        // Take 20s as buffer to avoid edge cases around expiry
        if let Some(expires) = self.expires_in {
            return expires > now() + chrono::TimeDelta::try_seconds(20).expect("in bounds");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_checks_expiry() {
        assert!(Credential::new("token", None).is_valid());
        assert!(!Credential::new("", None).is_valid());

        let expired = now() - chrono::TimeDelta::try_minutes(1).unwrap();
        assert!(!Credential::new("token", Some(expired)).is_valid());

        let live = now() + chrono::TimeDelta::try_hours(1).unwrap();
        assert!(Credential::new("token", Some(live)).is_valid());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9", None);
        let out = format!("{cred:?}");
        assert!(!out.contains("JKV1Qi"));
        assert!(out.contains("eyJ***"));
    }
}
