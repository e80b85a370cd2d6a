use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt as _};

use crate::{app::AppContext, prelude::*};
use super::{Page, View, ViewRequest};


pub(crate) fn load() -> BoxFuture<'static, Result<Arc<dyn View>>> {
    async { Ok(Arc::new(NotFound) as Arc<dyn View>) }.boxed()
}

/// Rendered for every path that matches no route.
pub(crate) struct NotFound;

impl View for NotFound {
    fn render<'a>(&'a self, _ctx: &'a AppContext, request: &'a ViewRequest) -> BoxFuture<'a, Result<Page>> {
        let page = Page::new(
            "404 Not Found",
            format!("There is no page at '{}'.\n", request.path),
        );
        async move { Ok(page) }.boxed()
    }
}
