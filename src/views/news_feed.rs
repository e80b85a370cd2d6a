//! The start page: all published articles, optionally filtered.

use std::{fmt::Write as _, sync::Arc};

use futures::{future::BoxFuture, FutureExt as _};

use crate::{
    api::{AllArticles, AllCategories, ArticlesByCategory, ArticlesByUser, CreateArticle, SiteInfo},
    app::AppContext,
    client::{ClientResult, GraphQlClient},
    model::{Article, Category},
    prelude::*,
    router::{RouteTable, ARTICLE, NEWS_FEED},
};
use super::{Page, View, ViewRequest};


pub(crate) fn load() -> BoxFuture<'static, Result<Arc<dyn View>>> {
    async { Ok(Arc::new(NewsFeed) as Arc<dyn View>) }.boxed()
}

pub(crate) struct NewsFeed;

impl View for NewsFeed {
    fn render<'a>(&'a self, ctx: &'a AppContext, request: &'a ViewRequest) -> BoxFuture<'a, Result<Page>> {
        render(ctx, request).boxed()
    }
}

/// Which articles are shown, from the query part of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter<'a> {
    All,
    Category(&'a str),
    Author(&'a str),
}

impl<'a> Filter<'a> {
    fn from_request(request: &'a ViewRequest) -> Self {
        match (request.query("category"), request.query("author")) {
            (Some(slug), _) => Self::Category(slug),
            (None, Some(username)) => Self::Author(username),
            (None, None) => Self::All,
        }
    }

    async fn fetch(&self, client: &GraphQlClient) -> ClientResult<Vec<Article>> {
        match *self {
            Self::All => client.execute(&AllArticles {}).await,
            Self::Category(slug) => {
                client.execute(&ArticlesByCategory { category: slug.to_owned() }).await
            }
            Self::Author(username) => {
                client.execute(&ArticlesByUser { username: username.to_owned() }).await
            }
        }
    }
}

async fn render(ctx: &AppContext, request: &ViewRequest) -> Result<Page> {
    let filter = Filter::from_request(request);
    ctx.store.select_category(match filter {
        Filter::Category(slug) => Some(slug),
        _ => None,
    });

    let client = &*ctx.client;
    let (site, categories, articles) = tokio::try_join!(
        client.execute(&SiteInfo {}),
        client.execute(&AllCategories {}),
        filter.fetch(client),
    ).context("failed to fetch news feed")?;

    let title = site.map(|s| s.name).unwrap_or_else(|| "News".to_owned());
    let body = render_body(&ctx.router, &filter, &categories, visible_articles(articles))?;
    Ok(Page::new(title, body))
}

/// Published articles only, featured ones first. Otherwise the order of the
/// server is kept.
fn visible_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut visible = articles.into_iter().filter(|a| a.is_published).collect::<Vec<_>>();
    visible.sort_by_key(|a| !a.is_featured);
    visible
}

fn render_body(
    router: &RouteTable,
    filter: &Filter<'_>,
    categories: &[Category],
    articles: Vec<Article>,
) -> Result<String> {
    let home = router.reverse(NEWS_FEED, &[])?;
    let mut out = String::new();

    let mut nav = vec![format!("All ({home})")];
    for category in categories {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("category", &category.slug)
            .finish();
        let marker = if *filter == Filter::Category(category.slug.as_str()) { "*" } else { "" };
        nav.push(format!("{marker}{} ({home}?{query})", category.name));
    }
    writeln!(out, "Categories: {}", nav.join(" | "))?;

    match filter {
        Filter::All => {}
        Filter::Category(slug) => writeln!(out, "Category: {slug}")?,
        Filter::Author(username) => writeln!(out, "Articles by {username}")?,
    }
    writeln!(out)?;

    if articles.is_empty() {
        writeln!(out, "No articles yet.")?;
    }
    for article in &articles {
        let link = router.reverse(ARTICLE, &[("slug", &article.slug)])?;
        let featured = if article.is_featured { "[featured] " } else { "" };
        writeln!(out, "- {featured}{} ({link})", article.title)?;
        writeln!(out, "  {}", article.created_at)?;
    }

    Ok(out)
}

/// Submits a new article. Returns the title of the created article.
pub(crate) async fn submit(ctx: &AppContext, article: CreateArticle) -> Result<String> {
    let payload = ctx.client.execute(&article).await.context("failed to create article")?;
    let created = payload.article
        .ok_or_else(|| anyhow!("server did not return the created article"))?;

    info!("Created article '{}'", created.title);
    ctx.store.record_created(&created.title);
    Ok(created.title)
}
