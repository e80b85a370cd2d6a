//! State shared by all views of the running application.

use std::sync::{PoisonError, RwLock};


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UiState {
    /// Path of the last navigation, including the query part.
    pub(crate) current_path: Option<String>,

    /// Slug of the category the news feed is filtered by.
    pub(crate) selected_category: Option<String>,

    /// Title of the article submitted last.
    pub(crate) last_created: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    state: RwLock<UiState>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A copy of the current state.
    pub(crate) fn snapshot(&self) -> UiState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn set_current_path(&self, path: &str) {
        self.update(|state| state.current_path = Some(path.to_owned()));
    }

    pub(crate) fn select_category(&self, slug: Option<&str>) {
        self.update(|state| state.selected_category = slug.map(ToOwned::to_owned));
    }

    pub(crate) fn record_created(&self, title: &str) {
        self.update(|state| state.last_created = Some(title.to_owned()));
    }

    fn update(&self, f: impl FnOnce(&mut UiState)) {
        // The state is always consistent, so a panic of another writer does
        // not matter.
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
    }
}
