//! Maps URL paths to views.
//!
//! Every route owns a loader that produces its view. Loaders run on the
//! first navigation to their route only; the loaded view is kept and reused
//! for all later navigations. Paths that match no route resolve to the
//! not-found view.

use std::{collections::HashMap, fmt, sync::Arc};

use futures::future::BoxFuture;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::sync::OnceCell;

use crate::{prelude::*, views::{self, View}};


/// Characters that are percent-encoded when a parameter is put into a path
/// segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>')
    .add(b'?').add(b'`').add(b'{').add(b'}');

pub(crate) const NEWS_FEED: &str = "news-feed";
pub(crate) const ARTICLE: &str = "article";
pub(crate) const NOT_FOUND: &str = "not-found";

/// Produces the view of a route. Called at most once per route.
pub(crate) type ViewLoader = Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn View>>> + Send + Sync>;


#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RouterError {
    UnknownRoute(String),
    MissingParameter { route: &'static str, param: &'static str },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRoute(name) => write!(f, "no route named '{name}'"),
            Self::MissingParameter { route, param } => {
                write!(f, "route '{route}' requires parameter '{param}'")
            }
        }
    }
}

impl std::error::Error for RouterError {}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

pub(crate) struct Route {
    name: &'static str,
    pattern: &'static str,
    segments: Vec<Segment>,
    loader: ViewLoader,
    view: OnceCell<Arc<dyn View>>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Route {
    fn new(name: &'static str, pattern: &'static str, loader: ViewLoader) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(param) => Segment::Param(param),
                None => Segment::Literal(s),
            })
            .collect();

        Self { name, pattern, segments, loader, view: OnceCell::new() }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn pattern(&self) -> &'static str {
        self.pattern
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.view.initialized()
    }

    /// Returns the view, loading it if this is the first time it is needed.
    /// Concurrent first calls share one load.
    pub(crate) async fn view(&self) -> Result<Arc<dyn View>> {
        self.view
            .get_or_try_init(|| {
                debug!("Loading view for route '{}'", self.name);
                (self.loader)()
            })
            .await
            .cloned()
            .with_context(|| format!("failed to load view of route '{}'", self.name))
    }

    /// Matches the segments of a path, returning the decoded parameters.
    fn matches(&self, segments: &[&str]) -> Option<HashMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(s) if s == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    let value = percent_decode_str(actual).decode_utf8().ok()?;
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.to_string(), value.into_owned());
                }
            }
        }

        Some(params)
    }

    fn reverse(&self, params: &[(&str, &str)]) -> Result<String, RouterError> {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Param(name) => {
                    let value = params.iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| *v)
                        .filter(|v| !v.is_empty())
                        .ok_or(RouterError::MissingParameter { route: self.name, param: *name })?;
                    out.extend(utf8_percent_encode(value, SEGMENT));
                }
            }
        }

        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

/// Result of resolving a path.
#[derive(Debug)]
pub(crate) struct Resolved<'a> {
    pub(crate) route: &'a Route,
    pub(crate) params: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
}

pub(crate) struct RouteTable {
    routes: Vec<Route>,
    not_found: Route,
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("not_found", &self.not_found)
            .finish()
    }
}

impl RouteTable {
    /// Creates a table with no routes. Every path resolves to the not-found
    /// route, which uses the given loader.
    pub(crate) fn new(not_found: ViewLoader) -> Self {
        Self {
            routes: Vec::new(),
            not_found: Route::new(NOT_FOUND, "*", not_found),
        }
    }

    pub(crate) fn route(mut self, name: &'static str, pattern: &'static str, loader: ViewLoader) -> Self {
        self.routes.push(Route::new(name, pattern, loader));
        self
    }

    /// The routes of the application: the news feed and single articles.
    pub(crate) fn standard() -> Self {
        Self::new(Arc::new(views::not_found::load))
            .route(NEWS_FEED, "/", Arc::new(views::news_feed::load))
            .route(ARTICLE, "/article/:slug", Arc::new(views::article::load))
    }

    pub(crate) fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().chain([&self.not_found]).find(|r| r.name == name)
    }

    /// Finds the route for `path`. The query part and trailing slashes do not
    /// influence matching. Never fails: unmatched paths resolve to the
    /// not-found route.
    pub(crate) fn resolve(&self, path: &str) -> Resolved<'_> {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let path = if path.is_empty() { "/" } else { path };
        let query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();

        let matched = path.starts_with('/')
            .then(|| split_path(path).collect::<Vec<_>>())
            .and_then(|segments| self.routes.iter().find_map(|route| {
                route.matches(&segments).map(|params| (route, params))
            }));

        let (route, params) = matched.unwrap_or((&self.not_found, HashMap::new()));
        trace!("Resolved '{path}' to route '{}'", route.name);
        Resolved { route, params, query }
    }

    /// Builds the path of the named route with the given parameters.
    pub(crate) fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        self.routes.iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RouterError::UnknownRoute(name.to_owned()))?
            .reverse(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}
