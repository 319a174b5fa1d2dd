// Headers used by the storage service.
pub const X_MS_VERSION: &str = "x-ms-version";

// Storage service API version. The delegation key request, the signed key
// version and the SAS version all carry the same value.
pub const STORAGE_VERSION: &str = "2019-12-12";

// SAS parameter values for a delegated blob write.
pub const SAS_PERMISSIONS: &str = "wt"; // write, tag
pub const SAS_KEY_SERVICE: &str = "b"; // blob service
pub const SAS_RESOURCE: &str = "b"; // blob
pub const SAS_PROTOCOL: &str = "https";

// OAuth2 scope for the storage service.
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

pub const BLOB_ENDPOINT_SUFFIX: &str = "blob.core.windows.net";

// Validity windows. Both windows are back-dated to tolerate clock skew
// between us and the storage service.
pub const CLOCK_SKEW_MINUTES: i64 = 15;
pub const KEY_VALIDITY_HOURS: i64 = 48;
pub const SAS_VALIDITY_HOURS: i64 = 12;

pub const USER_AGENT: &str = concat!("blobvend/", env!("CARGO_PKG_VERSION"));
