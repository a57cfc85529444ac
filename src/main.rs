use crate::app::AppState;
use crate::config::AppConfig;
use crate::db::init_db;
use crate::router::handle;
use astra::Server;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod pipeline;
mod responses;
mod router;
mod source;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("listing_map=info")))
        .with(fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    info!(
        bind = %config.bind_addr,
        db = %config.db_path,
        workers = config.max_workers,
        pipeline = ?config.pipeline,
        "configuration loaded"
    );

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_db(&state.db) {
        error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    // First load runs in the background; the map shows a loading state until it lands.
    state.loader.reload();

    info!("Starting server at http://{}", config.bind_addr);
    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => templates::html_error_response(err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
