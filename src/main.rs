use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::geocoding::{GeocodeProvider, Geocoder, NominatimProvider, SystemClock};
use crate::responses::error_to_response;
use crate::router::{handle, AppState};
use crate::sync::HttpSourceFetcher;
use astra::Server;

mod auth;
mod config;
mod csv_rows;
mod db;
mod domain;
mod errors;
mod geo;
mod geocoding;
mod region;
mod responses;
mod router;
mod sync;

#[cfg(test)]
mod tests;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1️⃣ Read configuration from the environment
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Create the database handle and apply the schema
    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db) {
        log::error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Build the external clients
    let provider: Box<dyn GeocodeProvider> = match NominatimProvider::new(
        &config.geocoder_base_url,
        &config.geocoder_user_agent,
        &config.geocoder_country,
    ) {
        Ok(p) => Box::new(p),
        Err(e) => {
            log::error!("Geocoder setup failed: {e}");
            std::process::exit(1);
        }
    };
    let source = match HttpSourceFetcher::new(config.source_csv_url.clone()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Source client setup failed: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        db,
        geocoder: Geocoder::new(provider, SystemClock::new()),
        source: Box::new(source),
        sync_secret: config.sync_secret.clone(),
    };

    // 4️⃣ Serve requests
    log::info!("Starting server at http://{}", config.bind_addr);
    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        log::error!("Server ended with error: {e}");
    }

    log::info!("Server shut down cleanly.");
}
