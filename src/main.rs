use std::sync::Arc;

use spa_edge_router::assets::DirectoryAssets;
use spa_edge_router::config::{self, AppState, Config};
use spa_edge_router::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    cfg.validate()?;
    logger::init(&cfg)?;

    // Worker threads follow `server.workers`, one per core otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let assets = DirectoryAssets::from_config(&cfg.spa);
    if !assets.root().is_dir() {
        logger::log_warning(&format!(
            "Asset directory '{}' does not exist yet; every non-API route will answer 404",
            assets.root().display()
        ));
    }

    let state = Arc::new(AppState::new(&cfg, Arc::new(assets)));
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&addr, &cfg);

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(server::serve(listener, state, signals)).await;
    Ok(())
}
