use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use taskkeeper::auth::{AuthMiddleware, TokenService};
use taskkeeper::config::Config;
use taskkeeper::store::PgStore;
use taskkeeper::{routes, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let store = PgStore::connect(&config.database)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    store
        .migrate()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let state = web::Data::new(AppState::new(
        Arc::new(store),
        TokenService::new(&config.jwt),
    ));

    log::info!("Starting TaskKeeper server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware)
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
