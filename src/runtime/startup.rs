use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::audio::{MediaLoader, OutputFactory, PreviewLoader, RodioOutput};
use crate::catalog::DeezerClient;
use crate::config;
use crate::download::Downloader;
use crate::playlist::{FileStore, PlaylistRegistry};
use crate::session::{SessionController, SessionDeps};

/// Wire the session from settings: persisted lists, catalog, loader and audio output.
pub fn build_session(
    settings: &config::Settings,
) -> Result<SessionController, Box<dyn std::error::Error>> {
    let data_dir = settings.data_dir();
    let downloads_dir = settings.downloads_dir();
    info!(data_dir = %data_dir.display(), downloads_dir = %downloads_dir.display(), "starting");

    let registry = Arc::new(PlaylistRegistry::load(Box::new(FileStore::new(data_dir))));
    let catalog = Arc::new(DeezerClient::new(&settings.catalog)?);
    let loader: Arc<dyn MediaLoader> = Arc::new(PreviewLoader::new(Duration::from_millis(
        settings.catalog.timeout_ms,
    ))?);
    let downloader = Arc::new(Downloader::new(Arc::clone(&loader), downloads_dir));

    // Each engine opens its own output stream when it starts.
    let factory: OutputFactory<RodioOutput> = Arc::new(RodioOutput::open_default);

    let deps = SessionDeps {
        catalog,
        registry,
        downloader,
        loader,
    };
    Ok(SessionController::new(settings, deps, factory))
}
