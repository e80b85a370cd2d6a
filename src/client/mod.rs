//! The GraphQL client. There is exactly one per process: it is created during
//! bootstrap and handed to every view as `Arc<GraphQlClient>`.

use std::{sync::Arc, time::{Duration, Instant}};

use bytes::Bytes;
use futures::future::BoxFuture;
use hyper::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{
    api::{GraphQlRequest, Operation, OperationKind},
    config::GraphQlEndpoint,
    model::{Category, Id},
    prelude::*,
};
use self::cache::{Entity, EntityKey, ResponseCache};

pub(crate) mod cache;
pub(crate) mod err;
mod http;

pub(crate) use self::{
    err::{ClientError, ClientResult, GraphQlError},
    http::HttpTransport,
};


#[derive(Debug, confique::Config)]
pub(crate) struct GraphQlConfig {
    /// URL of the GraphQL endpoint of the news feed server. Plain HTTP is only
    /// allowed for loopback hosts, unless you append `#allow-insecure`.
    #[config(default = "http://127.0.0.1:8000/graphql")]
    pub(crate) endpoint: GraphQlEndpoint,

    /// How long to wait for a response before giving up.
    #[config(default = "30s", deserialize_with = crate::config::deserialize_duration)]
    pub(crate) timeout: Duration,

    /// Default fetch policy for queries. "cache-first" answers queries from
    /// the in-memory cache if possible and only asks the server otherwise.
    /// "network-only" always asks the server (and still fills the cache).
    /// Mutations always go to the server.
    #[config(default = "cache-first")]
    pub(crate) fetch_policy: FetchPolicy,

    /// JWT token sent as `Authorization: JWT <token>` with every request.
    /// Only needed if the server requires authentication.
    pub(crate) auth_token: Option<SecretString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum FetchPolicy {
    CacheFirst,
    NetworkOnly,
}


/// Raw HTTP answer of the server.
#[derive(Debug)]
pub(crate) struct TransportResponse {
    pub(crate) status: StatusCode,
    pub(crate) body: Bytes,
}

/// Something that can deliver a serialized GraphQL request to the server.
pub(crate) trait Transport: Send + Sync {
    fn post(&self, body: Bytes) -> BoxFuture<'_, ClientResult<TransportResponse>>;
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}


pub(crate) struct GraphQlClient {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    default_policy: FetchPolicy,
}

impl GraphQlClient {
    pub(crate) fn new(transport: Arc<dyn Transport>, default_policy: FetchPolicy) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(),
            default_policy,
        }
    }

    /// Creates a client talking HTTP to the configured endpoint.
    pub(crate) fn from_config(config: &GraphQlConfig) -> Result<Self> {
        let transport = HttpTransport::new(config).context("failed to create HTTP client")?;
        info!("GraphQL endpoint: {}", config.endpoint);
        Ok(Self::new(Arc::new(transport), config.fetch_policy))
    }

    pub(crate) fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Runs a query with the default fetch policy or a mutation.
    pub(crate) async fn execute<O: Operation>(&self, op: &O) -> ClientResult<O::Output> {
        self.execute_with(op, self.default_policy).await
    }

    /// Like `execute`, but with an explicit fetch policy. The policy is
    /// ignored for mutations, those are never answered from the cache.
    pub(crate) async fn execute_with<O: Operation>(
        &self,
        op: &O,
        policy: FetchPolicy,
    ) -> ClientResult<O::Output> {
        op.validate()?;
        let variables = serde_json::to_value(op)
            .map_err(|e| ClientError::InvalidInput(format!("unserializable variables: {e}")))?;

        if O::KIND == OperationKind::Mutation {
            let data = self.send::<O>(op).await?;
            let out = decode_output::<O>(data)?;
            self.cache.evict_operations(O::INVALIDATES).await;
            return Ok(out);
        }

        let key = ResponseCache::query_key(O::NAME, &variables);
        if policy == FetchPolicy::CacheFirst {
            if let Some(out) = self.from_cache::<O>(op, &key).await {
                return Ok(out);
            }
        }

        let data = self.send::<O>(op).await?;
        let out = decode_output::<O>(data.clone())?;
        self.cache.normalize(O::entities(&out)).await;
        self.cache.write_query(key, O::NAME, data).await;
        Ok(out)
    }

    /// Normalized records win over memoized results: a list query or a
    /// network-only read may have stored a newer version of the record.
    async fn from_cache<O: Operation>(&self, op: &O, key: &str) -> Option<O::Output> {
        if let Some(entity_key) = op.entity_key() {
            if let Some(out) = self.cache.entity(&entity_key).await.and_then(O::from_entity) {
                trace!("Answered {key} from normalized records");
                return Some(out);
            }
        }

        if let Some(data) = self.cache.read_query(key).await {
            match decode_output::<O>(data) {
                Ok(out) => {
                    trace!("Answered {key} from memoized result");
                    return Some(out);
                }
                // Can only happen if the same key was written with a
                // different shape. Just ask the server again.
                Err(e) => warn!("Ignoring unusable memoized result for {key}: {e}"),
            }
        }

        None
    }

    /// The category with the given ID, if any query fetched it before. Never
    /// asks the server.
    pub(crate) async fn cached_category(&self, id: &Id) -> Option<Category> {
        match self.cache.entity(&EntityKey::Category(id.clone())).await? {
            Entity::Category(category) => Some(category),
            _ => None,
        }
    }

    /// Sends the operation and returns the value of its root field.
    async fn send<O: Operation>(&self, op: &O) -> ClientResult<serde_json::Value> {
        let before = Instant::now();
        let body = serde_json::to_vec(&GraphQlRequest::new(op))
            .map_err(|e| ClientError::InvalidInput(format!("unserializable request: {e}")))?;

        let response = self.transport.post(body.into()).await?;
        let out = extract_root_field::<O>(response);
        debug!(
            "{} {} finished in {:.2?} ({})",
            match O::KIND {
                OperationKind::Query => "Query",
                OperationKind::Mutation => "Mutation",
            },
            O::NAME,
            before.elapsed(),
            if out.is_ok() { "ok" } else { "failed" },
        );
        out
    }
}

/// Checks the server response and returns the value of the operation's root
/// field inside `data`.
fn extract_root_field<O: Operation>(response: TransportResponse) -> ClientResult<serde_json::Value> {
    let envelope = serde_json::from_slice::<ResponseEnvelope>(&response.body);

    // Some servers reply 400 for invalid queries, but still send a proper
    // GraphQL error list. That is more useful than just the status code.
    if !response.status.is_success() {
        return match envelope {
            Ok(envelope) if !envelope.errors.is_empty() => Err(ClientError::GraphQl(envelope.errors)),
            _ => Err(ClientError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).chars().take(200).collect(),
            }),
        };
    }

    let envelope = envelope.map_err(ClientError::Decode)?;
    if !envelope.errors.is_empty() {
        return Err(ClientError::GraphQl(envelope.errors));
    }

    let contract_violation = |msg: &str| ClientError::ContractViolation {
        operation: O::NAME,
        msg: msg.to_owned(),
    };

    match envelope.data {
        Some(serde_json::Value::Object(mut data)) => data.remove(O::ROOT_FIELD)
            .ok_or_else(|| contract_violation(&format!("no field '{}' in 'data'", O::ROOT_FIELD))),
        Some(_) => Err(contract_violation("'data' is not an object")),
        None => Err(contract_violation("response contains neither 'data' nor 'errors'")),
    }
}

fn decode_output<O: Operation>(data: serde_json::Value) -> ClientResult<O::Output> {
    serde_json::from_value(data).map_err(|e| ClientError::ContractViolation {
        operation: O::NAME,
        msg: e.to_string(),
    })
}


#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
