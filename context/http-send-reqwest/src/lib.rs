//! Reqwest-backed transport for blobvend.
//!
//! The vending pipeline only ever needs "send one request, give me the whole
//! response". This crate provides that contract on top of [`reqwest::Client`];
//! TLS, connection pooling and timeouts are configured on the client passed
//! to [`ReqwestHttpSend::new`].

use async_trait::async_trait;
use blobvend_core::{Error, HttpSend, Result};
use bytes::Bytes;
use reqwest::Client;

/// HttpSend implementation backed by a shared [`reqwest::Client`].
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend from a preconfigured client.
    ///
    /// Use this to control TLS settings, proxies, or timeouts; the default
    /// client from [`Default`] is fine for most callers.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = reqwest::Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert http request").with_source(e))?;

        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("failed to send http request").with_source(e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::unexpected("failed to read http response body").with_source(e))?;

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
