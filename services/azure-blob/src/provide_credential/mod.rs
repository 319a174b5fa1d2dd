mod client_secret;
pub use client_secret::ClientSecretCredentialProvider;

mod static_provider;
pub use static_provider::StaticCredentialProvider;

mod user_delegation;
pub use user_delegation::UserDelegationKeyProvider;
