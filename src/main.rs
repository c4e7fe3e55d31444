use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::{Builder, Env};
use log::{error, info};

use twitter_api::config::AppConfig;
use twitter_api::handlers;
use twitter_api::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    info!("Starting Twitter API backend...");
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let state = match AppState::open(&config.data_dir, config.bcrypt_cost).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to open documents in {}: {}", config.data_dir.display(), e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };
    info!("Documents ready in {}", config.data_dir.display());

    let address = config.bind_address();
    info!("Listening on {} with {} workers", address, config.workers);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
    })
    .workers(config.workers)
    .bind(address)?
    .run()
    .await
}
