use serde::{Deserialize, Serialize};

use crate::{
    client::{cache::{Entity, EntityKey}, err::require_non_empty, ClientResult},
    model::{Article, Id},
};
use super::{Operation, OperationKind};


/// The selection used for every article query. Views rely on getting all of
/// these fields for every record.
macro_rules! article_fields {
    () => {"
      title
      slug
      content
      isPublished
      isFeatured
      createdAt
      categoryId
      userId
"};
}

fn articles_to_entities(articles: &[Article]) -> Vec<Entity> {
    articles.iter().cloned().map(Entity::Article).collect()
}


#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct AllArticles {}

impl Operation for AllArticles {
    const NAME: &'static str = "AllArticles";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "allArticles";
    const DOCUMENT: &'static str = concat!(
        "query AllArticles {\n",
        "  allArticles {", article_fields!(), "  }\n",
        "}\n",
    );
    type Output = Vec<Article>;

    fn entities(output: &Self::Output) -> Vec<Entity> {
        articles_to_entities(output)
    }
}


/// Articles of one category, filtered on the server. `category` is the slug
/// of the category.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ArticlesByCategory {
    pub(crate) category: String,
}

impl Operation for ArticlesByCategory {
    const NAME: &'static str = "ArticlesByCategory";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "articlesByCategory";
    const DOCUMENT: &'static str = concat!(
        "query ArticlesByCategory($category: String!) {\n",
        "  articlesByCategory(category: $category) {", article_fields!(), "  }\n",
        "}\n",
    );
    type Output = Vec<Article>;

    fn validate(&self) -> ClientResult<()> {
        require_non_empty("category", &self.category)
    }

    fn entities(output: &Self::Output) -> Vec<Entity> {
        articles_to_entities(output)
    }
}


/// Articles written by one user.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ArticlesByUser {
    pub(crate) username: String,
}

impl Operation for ArticlesByUser {
    const NAME: &'static str = "ArticlesByUser";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "articlesByUser";
    const DOCUMENT: &'static str = concat!(
        "query ArticlesByUser($username: String!) {\n",
        "  articlesByUser(username: $username) {", article_fields!(), "  }\n",
        "}\n",
    );
    type Output = Vec<Article>;

    fn validate(&self) -> ClientResult<()> {
        require_non_empty("username", &self.username)
    }

    fn entities(output: &Self::Output) -> Vec<Entity> {
        articles_to_entities(output)
    }
}


/// A single article. The server returns `null` if no article has this slug.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ArticleBySlug {
    pub(crate) slug: String,
}

impl Operation for ArticleBySlug {
    const NAME: &'static str = "ArticleBySlug";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "articleBySlug";
    const DOCUMENT: &'static str = concat!(
        "query ArticleBySlug($slug: String!) {\n",
        "  articleBySlug(slug: $slug) {", article_fields!(), "  }\n",
        "}\n",
    );
    type Output = Option<Article>;

    fn validate(&self) -> ClientResult<()> {
        require_non_empty("slug", &self.slug)
    }

    fn entities(output: &Self::Output) -> Vec<Entity> {
        output.iter().cloned().map(Entity::Article).collect()
    }

    fn entity_key(&self) -> Option<EntityKey> {
        Some(EntityKey::Article(self.slug.clone()))
    }

    fn from_entity(entity: Entity) -> Option<Self::Output> {
        match entity {
            Entity::Article(article) => Some(Some(article)),
            _ => None,
        }
    }
}


/// Creates a new article. All six arguments are required by the server.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateArticle {
    #[serde(rename = "userID")]
    pub(crate) user_id: Id,
    #[serde(rename = "categoryID")]
    pub(crate) category_id: Id,
    pub(crate) title: String,
    pub(crate) content: String,
    #[serde(rename = "isPublished")]
    pub(crate) is_published: bool,
    #[serde(rename = "isFeatured")]
    pub(crate) is_featured: bool,
}

impl CreateArticle {
    /// Argument names of the `createArticle` field, in the order of the document.
    pub(crate) const ARGUMENTS: [&'static str; 6] =
        ["userID", "categoryID", "title", "content", "isPublished", "isFeatured"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CreateArticlePayload {
    pub(crate) article: Option<CreatedArticle>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CreatedArticle {
    pub(crate) title: String,
}

impl Operation for CreateArticle {
    const NAME: &'static str = "CreateArticle";
    const KIND: OperationKind = OperationKind::Mutation;
    const ROOT_FIELD: &'static str = "createArticle";
    const DOCUMENT: &'static str = "\
mutation CreateArticle(
  $userID: ID!
  $categoryID: ID!
  $title: String!
  $content: String!
  $isPublished: Boolean!
  $isFeatured: Boolean!
) {
  createArticle(
    userID: $userID
    categoryID: $categoryID
    title: $title
    content: $content
    isPublished: $isPublished
    isFeatured: $isFeatured
  ) {
    article {
      title
    }
  }
}
";
    const INVALIDATES: &'static [&'static str] = &[
        AllArticles::NAME,
        ArticlesByCategory::NAME,
        ArticlesByUser::NAME,
        // A memoized `null` for the slug of the new article
        ArticleBySlug::NAME,
    ];
    type Output = CreateArticlePayload;

    fn validate(&self) -> ClientResult<()> {
        require_non_empty("userID", self.user_id.as_str())?;
        require_non_empty("categoryID", self.category_id.as_str())?;
        require_non_empty("title", &self.title)
    }
}
