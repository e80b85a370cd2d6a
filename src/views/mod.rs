//! The views of the application. Views are the only place where GraphQL
//! operations are issued.

use std::{collections::HashMap, fmt};

use futures::future::BoxFuture;

use crate::{app::AppContext, prelude::*};

pub(crate) mod article;
pub(crate) mod news_feed;
pub(crate) mod not_found;


pub(crate) trait View: Send + Sync {
    fn render<'a>(&'a self, ctx: &'a AppContext, request: &'a ViewRequest) -> BoxFuture<'a, Result<Page>>;
}

/// What a view gets to know about the navigation that triggered it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ViewRequest {
    /// The full path as navigated to, including the query part.
    pub(crate) path: String,
    pub(crate) params: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
}

impl ViewRequest {
    /// Returns a route parameter. The router only matches a route if all its
    /// parameters are present, so this failing is a bug in the route table.
    pub(crate) fn param(&self, name: &str) -> Result<&str> {
        self.params.get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("route parameter '{name}' missing for '{}'", self.path))
    }

    /// A query parameter, if present and not empty.
    pub(crate) fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}

/// The rendered output of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) title: String,
    pub(crate) body: String,
}

impl Page {
    pub(crate) fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    /// Page shown instead of a view that failed to render.
    pub(crate) fn error(path: &str, error: &anyhow::Error) -> Self {
        Self::new(
            "Something went wrong",
            format!("The page '{path}' could not be loaded: {error:#}\n"),
        )
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f)?;
        f.write_str(&self.body)
    }
}
