//! Building and running the application.
//!
//! The root application is assembled in a fixed order: store, then router,
//! then GraphQL client. Only then can it be mounted. The builder types make
//! any other order (or skipping a step) a compile error.

use std::sync::Arc;

use crate::{
    client::GraphQlClient,
    config::Config,
    prelude::*,
    router::RouteTable,
    store::Store,
    views::{Page, ViewRequest},
};


#[derive(Debug, confique::Config)]
pub(crate) struct AppConfig {
    /// The anchor the application is mounted on: `#` followed by an ID.
    #[config(default = "#app")]
    pub(crate) mount_point: String,
}

/// Everything a view can use. Cloning is cheap and all clones share the same
/// store, routes and client.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) store: Arc<Store>,
    pub(crate) router: Arc<RouteTable>,
    pub(crate) client: Arc<GraphQlClient>,
}


pub(crate) struct App<S> {
    state: S,
}

pub(crate) struct Empty;

pub(crate) struct WithStore {
    store: Arc<Store>,
}

pub(crate) struct WithRouter {
    store: Arc<Store>,
    router: Arc<RouteTable>,
}

pub(crate) struct Ready {
    ctx: AppContext,
}

impl App<Empty> {
    pub(crate) fn create() -> Self {
        Self { state: Empty }
    }

    pub(crate) fn use_store(self, store: Arc<Store>) -> App<WithStore> {
        trace!("Installing store");
        App { state: WithStore { store } }
    }
}

impl App<WithStore> {
    pub(crate) fn use_router(self, router: RouteTable) -> App<WithRouter> {
        trace!("Installing router with {} routes", router.routes().len());
        App {
            state: WithRouter {
                store: self.state.store,
                router: Arc::new(router),
            },
        }
    }
}

impl App<WithRouter> {
    pub(crate) fn use_client(self, client: Arc<GraphQlClient>) -> App<Ready> {
        trace!("Installing GraphQL client");
        let WithRouter { store, router } = self.state;
        App { state: Ready { ctx: AppContext { store, router, client } } }
    }
}

impl App<Ready> {
    /// Attaches the application to the given anchor, e.g. `#app`.
    pub(crate) fn mount(self, anchor: &str) -> Result<MountedApp> {
        let id = anchor.strip_prefix('#')
            .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
            .ok_or_else(|| anyhow!("invalid mount point '{anchor}': must be '#' followed by an ID"))?;

        debug!("Mounted application on '#{id}'");
        Ok(MountedApp {
            anchor: anchor.to_owned(),
            ctx: self.state.ctx,
        })
    }
}

/// Builds the application from the configuration and mounts it.
pub(crate) fn bootstrap(config: &Config) -> Result<MountedApp> {
    let store = Arc::new(Store::new());
    let router = RouteTable::standard();
    let client = GraphQlClient::from_config(&config.graphql)
        .context("failed to create GraphQL client")?
        .pipe(Arc::new);

    App::create()
        .use_store(store)
        .use_router(router)
        .use_client(client)
        .mount(&config.app.mount_point)
}


/// Outcome of `MountedApp::visit`. There is always a page; `error` is set if
/// it is the error page.
pub(crate) struct Visit {
    pub(crate) page: Page,
    pub(crate) error: Option<anyhow::Error>,
}

pub(crate) struct MountedApp {
    anchor: String,
    ctx: AppContext,
}

impl MountedApp {
    pub(crate) fn anchor(&self) -> &str {
        &self.anchor
    }

    pub(crate) fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Navigates to `path` and renders the view of the matching route. The
    /// view is loaded first if this is the first visit of its route.
    pub(crate) async fn navigate(&self, path: &str) -> Result<Page> {
        let resolved = self.ctx.router.resolve(path);
        debug!("Navigating to '{path}' (route '{}')", resolved.route.name());
        self.ctx.store.set_current_path(path);

        let view = resolved.route.view().await?;
        let request = ViewRequest {
            path: path.to_owned(),
            params: resolved.params,
            query: resolved.query,
        };
        view.render(&self.ctx, &request).await
    }

    /// Like `navigate`, but never fails: if loading or rendering fails, the
    /// error is logged and an error page is returned instead.
    pub(crate) async fn visit(&self, path: &str) -> Visit {
        match self.navigate(path).await {
            Ok(page) => Visit { page, error: None },
            Err(e) => {
                error!("Failed to render '{path}': {e:?}");
                Visit { page: Page::error(path, &e), error: Some(e) }
            }
        }
    }
}
