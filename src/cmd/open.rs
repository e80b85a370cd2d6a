use crate::{app, config::Config, prelude::*};


pub(crate) async fn run(path: &str, config: &Config) -> Result<()> {
    let app = app::bootstrap(config)?;
    info!("Opening '{path}' in app mounted on '{}'", app.anchor());

    let visit = app.visit(path).await;
    println!("{}", visit.page);

    let cache = app.context().client.cache();
    debug!(
        "Cache holds {} memoized results and {} normalized records",
        cache.memoized_queries(),
        cache.normalized_records(),
    );

    match visit.error {
        Some(e) => Err(e.context(format!("failed to render '{path}'"))),
        None => Ok(()),
    }
}
