//! The in-memory response cache shared by everything using the client.
//!
//! Two things are stored: memoized query results (keyed by operation name
//! and variables) and records normalized by their identity (articles by
//! slug, categories by ID). The latter lets single-record queries be answered
//! from data any other query already fetched.
//!
//! Nothing is ever evicted implicitly. Mutations evict the memoized results
//! they make stale (see `Operation::INVALIDATES`).

use crate::{model::{Article, Category, Id}, prelude::*};


#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Entity {
    Article(Article),
    Category(Category),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum EntityKey {
    /// By slug
    Article(String),
    Category(Id),
}

impl Entity {
    pub(crate) fn key(&self) -> EntityKey {
        match self {
            Self::Article(a) => EntityKey::Article(a.slug.clone()),
            Self::Category(c) => EntityKey::Category(c.id.clone()),
        }
    }
}

struct MemoizedQuery {
    operation: &'static str,
    data: serde_json::Value,
}

pub(crate) struct ResponseCache {
    queries: scc::HashMap<String, MemoizedQuery>,
    entities: scc::HashMap<EntityKey, Entity>,
}

impl ResponseCache {
    pub(crate) fn new() -> Self {
        Self {
            queries: scc::HashMap::new(),
            entities: scc::HashMap::new(),
        }
    }

    /// The key under which the result of an operation is memoized. The
    /// variables are serialized from a struct, so their order is stable.
    pub(crate) fn query_key(operation: &str, variables: &serde_json::Value) -> String {
        format!("{operation}({variables})")
    }

    pub(crate) async fn read_query(&self, key: &str) -> Option<serde_json::Value> {
        self.queries.read_async(key, |_, memo| memo.data.clone()).await
    }

    pub(crate) async fn write_query(
        &self,
        key: String,
        operation: &'static str,
        data: serde_json::Value,
    ) {
        trace!("Memoizing result of {key}");
        self.queries.upsert_async(key, MemoizedQuery { operation, data }).await;
    }

    /// Stores the given records, replacing older versions of them.
    pub(crate) async fn normalize(&self, entities: Vec<Entity>) {
        for entity in entities {
            self.entities.upsert_async(entity.key(), entity).await;
        }
    }

    pub(crate) async fn entity(&self, key: &EntityKey) -> Option<Entity> {
        self.entities.read_async(key, |_, entity| entity.clone()).await
    }

    /// Removes all memoized results of the given operations. Returns how many
    /// entries were removed.
    pub(crate) async fn evict_operations(&self, operations: &[&str]) -> usize {
        if operations.is_empty() {
            return 0;
        }

        let before = self.queries.len();
        self.queries.retain_async(|_, memo| !operations.contains(&memo.operation)).await;
        let removed = before.saturating_sub(self.queries.len());
        if removed > 0 {
            debug!("Evicted {removed} memoized results of {}", operations.join(", "));
        }
        removed
    }

    pub(crate) fn memoized_queries(&self) -> usize {
        self.queries.len()
    }

    pub(crate) fn normalized_records(&self) -> usize {
        self.entities.len()
    }
}
