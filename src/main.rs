use mapscope::{build_services, build_viewer, init_logging, Config, EventBus, VERSION};
use mapscope_map::HeadlessSurface;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("MapScope {} ({})", VERSION, mapscope::BUILD_DATE);

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&path)?;

    let services = build_services(&config);
    let mut viewer = build_viewer(
        &config,
        Box::new(HeadlessSurface::new()),
        Arc::new(EventBus::new()),
    );

    let loaded = viewer.load_visible(&services.features).await;
    for layer in viewer.layers().data_layers() {
        let count = layer.store().map(|s| s.len()).unwrap_or(0);
        tracing::info!("{}: {} features", layer.name, count);
    }
    tracing::info!("Loaded {} features in total", loaded);

    Ok(())
}
