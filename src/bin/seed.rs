//! Wipes the database and loads the demo account.
//!
//! Run with `cargo run --bin seed`; reads the same environment as the server.

use std::io;
use std::sync::Arc;

use taskflow::auth::Credentials;
use taskflow::config::{Config, Storage};
use taskflow::seed::{seed_demo_data, DEMO_EMAIL, DEMO_PASSWORD};
use taskflow::store::PgStore;

fn to_io(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let database_url = match &config.storage {
        Storage::Postgres { database_url } => database_url.clone(),
        Storage::Memory => {
            return Err(to_io(
                "seeding needs STORAGE=postgres; the memory store does not outlive the process",
            ))
        }
    };

    let store = Arc::new(PgStore::connect(&database_url).await.map_err(to_io)?);
    log::info!("Clearing existing users and tasks");
    store.clear().await.map_err(to_io)?;

    let credentials = Credentials::new(store.clone(), config.bcrypt_cost);
    seed_demo_data(&credentials, store.as_ref())
        .await
        .map_err(to_io)?;

    log::info!("Seed completed. Demo login: {} / {}", DEMO_EMAIL, DEMO_PASSWORD);
    Ok(())
}
