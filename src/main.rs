use std::io;

use actix_web::HttpServer;
use taskflow::{build_app, config::Config, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let bind_addr = (config.server_host.clone(), config.server_port);
    let server_url = config.server_url();

    let state = AppState::from_config(config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    log::info!("Starting TaskFlow server at {}", server_url);
    HttpServer::new(move || build_app(state.clone()))
        .bind(bind_addr)?
        .run()
        .await
}
