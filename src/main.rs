//! Binary entry point: read configuration, start file logging, then hand an
//! empty catalog to the menu loop. Data is only read from disk when the user
//! picks "Load Data".
use library_catalog_manager::config::AppConfig;
use library_catalog_manager::{logging, run_app, App, CatalogStore};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let _guard = logging::init(&config.logging)?;

    let files = config.storage.catalog_files();
    tracing::info!(
        books = %files.books.display(),
        members = %files.members.display(),
        "starting library catalog v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut app = App::new(CatalogStore::new(), files);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal session failed");
    }
    result
}
