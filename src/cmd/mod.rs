pub(crate) mod check;
pub(crate) mod create_article;
pub(crate) mod open;
pub(crate) mod routes;
