//! Core components for vending delegated blob access credentials.
//!
//! This crate provides the foundational types for the blobvend ecosystem:
//!
//! - **Context**: a container holding implementations for HTTP sending and
//!   environment access
//! - **Traits**: abstract interfaces for credential acquisition
//!   ([`ProvideCredential`]) and credential validity ([`SigningCredential`])
//! - **Error**: a structured error type that keeps each pipeline stage's
//!   failures distinguishable
//!
//! ## Overview
//!
//! blobvend-core deliberately contains no transport: HTTP sending is a trait
//! ([`HttpSend`]) whose production implementation lives in its own crate.
//! Service crates compose credential providers on top of a [`Context`] and
//! sign with the utilities in [`hash`] and [`time`].
//!
//! ## Example
//!
//! ```no_run
//! use blobvend_core::{Context, ProvideCredential, Result, SigningCredential};
//! use async_trait::async_trait;
//!
//! // Define your credential type
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! // Implement a credential provider
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             token: "my-token".to_string(),
//!         }))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::default();
//! let cred = MyProvider.provide_credential(&ctx).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SigningCredential};
