use std::time::Duration;

use bytes::Bytes;
use futures::{future::BoxFuture, FutureExt as _};
use http_body_util::BodyExt as _;
use hyper::{
    Method, Request,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    http::uri::Uri,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use secrecy::{ExposeSecret as _, SecretString};

use crate::prelude::*;
use super::{ClientError, ClientResult, GraphQlConfig, Transport, TransportResponse};


type RequestBody = http_body_util::Full<Bytes>;

/// Sends GraphQL requests as HTTP POST to the configured endpoint.
pub(crate) struct HttpTransport {
    http_client: Client<HttpsConnector<HttpConnector>, RequestBody>,
    endpoint: Uri,
    auth_header: Option<SecretString>,
    timeout: Duration,
}

impl HttpTransport {
    pub(crate) fn new(config: &GraphQlConfig) -> Result<Self> {
        let auth_header = config.auth_token.as_ref()
            .map(|token| SecretString::from(format!("JWT {}", token.expose_secret())));

        Ok(Self {
            http_client: http_client()?,
            endpoint: config.endpoint.uri().clone(),
            auth_header,
            timeout: config.timeout,
        })
    }

    async fn send(&self, body: Bytes) -> ClientResult<TransportResponse> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(auth) = &self.auth_header {
            builder = builder.header(AUTHORIZATION, auth.expose_secret());
        }
        let req = builder.body(RequestBody::new(body))
            .map_err(|e| ClientError::Transport(anyhow!("failed to build request: {e}")))?;

        trace!("Sending GraphQL request: POST {}", self.endpoint);
        let response = self.http_client.request(req)
            .await
            .map_err(|e| ClientError::Transport(
                anyhow::Error::new(e).context(format!("HTTP request failed (to '{}')", self.endpoint))
            ))?;

        let (parts, body) = response.into_parts();
        let body = body.collect()
            .await
            .map_err(|e| ClientError::Transport(
                anyhow::Error::new(e)
                    .context(format!("failed to download body from '{}'", self.endpoint))
            ))?
            .to_bytes();

        Ok(TransportResponse { status: parts.status, body })
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: Bytes) -> BoxFuture<'_, ClientResult<TransportResponse>> {
        async move {
            tokio::time::timeout(self.timeout, self.send(body))
                .await
                .map_err(|_| ClientError::Timeout(self.timeout))?
        }.boxed()
    }
}

/// Returns an HTTP client that can also speak HTTPS. HTTPS is _not_ enforced
/// here, the endpoint URL is checked when loading the config.
fn http_client() -> Result<Client<HttpsConnector<HttpConnector>, RequestBody>> {
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    let https = HttpsConnectorBuilder::new()
        .with_provider_and_native_roots(provider)
        .context("failed to load native certificate roots")?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https))
}
