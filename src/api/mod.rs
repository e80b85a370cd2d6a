//! The catalogue of GraphQL operations this application is allowed to send.
//!
//! Every operation is a type whose (serialized) fields are exactly the
//! variables of its document. Required arguments are non-optional fields, so
//! a request lacking one cannot even be constructed.

use serde::{de::DeserializeOwned, Serialize};

use crate::client::{cache::{Entity, EntityKey}, ClientResult};

mod articles;
mod introspection;
mod news_feed;

pub(crate) use self::{
    articles::{
        AllArticles, ArticleBySlug, ArticlesByCategory, ArticlesByUser,
        CreateArticle,
    },
    introspection::{IntrospectedField, MutationArguments},
    news_feed::{AllCategories, SiteInfo},
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Query,
    Mutation,
}

pub(crate) trait Operation: Serialize + Send + Sync {
    /// Operation name, sent as `operationName` and used as cache key prefix.
    const NAME: &'static str;
    const KIND: OperationKind;

    /// The single top-level field this operation selects. Its value in
    /// `data` is what gets deserialized into `Output`.
    const ROOT_FIELD: &'static str;
    const DOCUMENT: &'static str;

    /// Names of operations whose memoized results are stale once this
    /// operation succeeded.
    const INVALIDATES: &'static [&'static str] = &[];

    type Output: DeserializeOwned + Send;

    /// Checks the variables before anything is sent.
    fn validate(&self) -> ClientResult<()> {
        Ok(())
    }

    /// Records contained in the output that the cache indexes by identity.
    fn entities(_output: &Self::Output) -> Vec<Entity> {
        Vec::new()
    }

    /// If this operation can be answered from a single normalized record,
    /// returns that record's key.
    fn entity_key(&self) -> Option<EntityKey> {
        None
    }

    /// Builds the output from the record returned for `entity_key`.
    fn from_entity(_entity: Entity) -> Option<Self::Output> {
        None
    }
}

/// The JSON body of a GraphQL-over-HTTP request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQlRequest<'a, O> {
    query: &'static str,
    operation_name: &'static str,
    variables: &'a O,
}

impl<'a, O: Operation> GraphQlRequest<'a, O> {
    pub(crate) fn new(operation: &'a O) -> Self {
        Self {
            query: O::DOCUMENT,
            operation_name: O::NAME,
            variables: operation,
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Returns the variable names declared in the header of a document,
    /// e.g. `["category"]` for `query Foo($category: String!) { ... }`.
    fn declared_variables(document: &str) -> Vec<String> {
        let header = &document[..document.find('{').unwrap()];
        header.split('$')
            .skip(1)
            .map(|s| s.split(':').next().unwrap().trim().to_owned())
            .collect()
    }

    fn serialized_variables<O: Operation>(op: &O) -> Vec<String> {
        let mut keys = serde_json::to_value(op).unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        keys.sort();
        keys
    }

    fn check_consistent<O: Operation>(op: &O) {
        let mut declared = declared_variables(O::DOCUMENT);
        declared.sort();
        assert_eq!(declared, serialized_variables(op), "variables of {}", O::NAME);
        assert!(O::DOCUMENT.contains(O::ROOT_FIELD));
        assert!(O::DOCUMENT.contains(O::NAME));
    }

    #[test]
    fn documents_match_variables() {
        check_consistent(&AllArticles {});
        check_consistent(&ArticlesByCategory { category: "sports".into() });
        check_consistent(&ArticlesByUser { username: "alice".into() });
        check_consistent(&ArticleBySlug { slug: "abc-123".into() });
        check_consistent(&SiteInfo {});
        check_consistent(&AllCategories {});
        check_consistent(&MutationArguments {});
        check_consistent(&CreateArticle {
            user_id: "u1".into(),
            category_id: "c1".into(),
            title: "T".into(),
            content: "C".into(),
            is_published: true,
            is_featured: false,
        });
    }

    #[test]
    fn request_body_without_variables_sends_empty_object() {
        let body = serde_json::to_value(GraphQlRequest::new(&AllCategories {})).unwrap();
        assert_eq!(body["variables"], json!({}));
        assert_eq!(body["operationName"], json!("AllCategories"));
        assert_eq!(body["query"], json!(AllCategories::DOCUMENT));
    }

    #[test]
    fn article_queries_select_full_field_set() {
        let fields = [
            "title", "slug", "content", "isPublished", "isFeatured",
            "createdAt", "categoryId", "userId",
        ];
        for document in [
            AllArticles::DOCUMENT,
            ArticlesByCategory::DOCUMENT,
            ArticlesByUser::DOCUMENT,
            ArticleBySlug::DOCUMENT,
        ] {
            let selected = document.split_whitespace().collect::<Vec<_>>();
            for field in fields {
                assert!(selected.contains(&field), "'{field}' missing in:\n{document}");
            }
        }
    }
}
