use serde::Serialize;

use crate::{client::cache::Entity, model::{Category, Site}};
use super::{Operation, OperationKind};


#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct SiteInfo {}

impl Operation for SiteInfo {
    const NAME: &'static str = "SiteInfo";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "site";
    const DOCUMENT: &'static str = "\
query SiteInfo {
  site {
    name
  }
}
";
    // The server returns `null` as long as nobody configured the site.
    type Output = Option<Site>;
}


#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct AllCategories {}

impl Operation for AllCategories {
    const NAME: &'static str = "AllCategories";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "allCategories";
    const DOCUMENT: &'static str = "\
query AllCategories {
  allCategories {
    id
    name
    slug
  }
}
";
    type Output = Vec<Category>;

    fn entities(output: &Self::Output) -> Vec<Entity> {
        output.iter().cloned().map(Entity::Category).collect()
    }
}
