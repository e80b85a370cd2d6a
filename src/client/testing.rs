//! A transport for tests that answers from canned JSON and records requests.

use std::{collections::VecDeque, sync::{Arc, Mutex}};

use bytes::Bytes;
use futures::{future::BoxFuture, FutureExt as _};
use hyper::StatusCode;

use super::{ClientResult, FetchPolicy, GraphQlClient, Transport, TransportResponse};


#[derive(Default)]
pub(crate) struct FakeServer {
    /// Answers by `operationName`. The front answer is used; the last one
    /// for an operation stays and is repeated.
    answers: Mutex<Vec<(String, VecDeque<(StatusCode, serde_json::Value)>)>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl FakeServer {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `operation` with `{ "data": { <root_field>: value } }`.
    pub(crate) fn answer_data(&self, operation: &str, root_field: &str, value: serde_json::Value) {
        let mut data = serde_json::Map::new();
        data.insert(root_field.to_owned(), value);
        self.answer_raw(operation, StatusCode::OK, serde_json::json!({ "data": data }));
    }

    pub(crate) fn answer_raw(&self, operation: &str, status: StatusCode, body: serde_json::Value) {
        let mut answers = self.answers.lock().unwrap();
        match answers.iter_mut().find(|(op, _)| op == operation) {
            Some((_, queue)) => queue.push_back((status, body)),
            None => answers.push((operation.to_owned(), VecDeque::from([(status, body)]))),
        }
    }

    /// All request bodies received so far.
    pub(crate) fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for the given operation.
    pub(crate) fn count(&self, operation: &str) -> usize {
        self.requests().iter().filter(|r| r["operationName"] == operation).count()
    }

    pub(crate) fn client(self: &Arc<Self>, policy: FetchPolicy) -> GraphQlClient {
        GraphQlClient::new(Arc::clone(self) as Arc<dyn Transport>, policy)
    }

    fn respond(&self, body: &[u8]) -> TransportResponse {
        let request: serde_json::Value = serde_json::from_slice(body)
            .expect("client sent invalid JSON");
        let operation = request["operationName"].as_str().unwrap_or_default().to_owned();
        self.requests.lock().unwrap().push(request);

        let mut answers = self.answers.lock().unwrap();
        let (status, body) = answers.iter_mut()
            .find(|(op, _)| *op == operation)
            .map(|(_, queue)| if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue[0].clone()
            })
            .unwrap_or_else(|| panic!("no answer prepared for operation '{operation}'"));

        TransportResponse {
            status,
            body: Bytes::from(serde_json::to_vec(&body).unwrap()),
        }
    }
}

impl Transport for FakeServer {
    fn post(&self, body: Bytes) -> BoxFuture<'_, ClientResult<TransportResponse>> {
        let response = self.respond(&body);
        async move { Ok(response) }.boxed()
    }
}

/// A complete article record as the server sends it.
pub(crate) fn article_json(slug: &str, published: bool, featured: bool) -> serde_json::Value {
    serde_json::json!({
        "title": format!("Title of {slug}"),
        "slug": slug,
        "content": format!("Content of {slug}."),
        "isPublished": published,
        "isFeatured": featured,
        "createdAt": "2023-04-01T12:30:00+00:00",
        "categoryId": "1",
        "userId": "7",
    })
}
