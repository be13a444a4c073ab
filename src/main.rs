use std::sync::Arc;

use cors_devserver::config::{AppState, Config};
use cors_devserver::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;

    // One thread: requests are handled one after another unless
    // `server.concurrent` is set, and even then on local tasks only
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg)?);

    logger::log_server_start(&cfg);
    logger::log_serving_root(&state.root, cfg.server.concurrent);

    // LocalSet for spawn_local support in concurrent mode
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state))
        .await;
    Ok(())
}
