use std::{fmt::Write as _, sync::Arc};

use futures::{future::BoxFuture, FutureExt as _};

use crate::{api::ArticleBySlug, app::AppContext, model::Article, prelude::*, router::NEWS_FEED};
use super::{Page, View, ViewRequest};


pub(crate) fn load() -> BoxFuture<'static, Result<Arc<dyn View>>> {
    async { Ok(Arc::new(ArticleView) as Arc<dyn View>) }.boxed()
}

/// A single article, looked up by the `slug` route parameter.
pub(crate) struct ArticleView;

impl View for ArticleView {
    fn render<'a>(&'a self, ctx: &'a AppContext, request: &'a ViewRequest) -> BoxFuture<'a, Result<Page>> {
        async move {
            let slug = request.param("slug")?;
            let article = ctx.client.execute(&ArticleBySlug { slug: slug.to_owned() })
                .await
                .with_context(|| format!("failed to fetch article '{slug}'"))?;

            let home = ctx.router.reverse(NEWS_FEED, &[])?;
            match article {
                Some(article) => {
                    // Older servers do not nest the category. Categories
                    // listed by the news feed are known by ID though.
                    let category = match &article.category {
                        Some(category) => Some(category.name.clone()),
                        None => ctx.client.cached_category(&article.category_id)
                            .await
                            .map(|c| c.name),
                    };
                    render_article(&article, category.as_deref(), &home)
                }
                None => Ok(Page::new(
                    "Article not found",
                    format!("There is no article '{slug}'.\n\nBack to all articles: {home}\n"),
                )),
            }
        }.boxed()
    }
}

fn render_article(article: &Article, category: Option<&str>, home: &str) -> Result<Page> {
    let mut body = String::new();

    let mut meta = vec![article.created_at.to_string()];
    if let Some(category) = category {
        meta.push(format!("in {category}"));
    }
    if article.is_featured {
        meta.push("featured".into());
    }
    if !article.is_published {
        meta.push("not published".into());
    }
    writeln!(body, "{}", meta.join(" · "))?;
    writeln!(body)?;
    writeln!(body, "{}", article.content.trim_end())?;
    writeln!(body)?;
    writeln!(body, "Back to all articles: {home}")?;

    Ok(Page::new(article.title.clone(), body))
}
