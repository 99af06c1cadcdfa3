//! HTTP server for the recipe API.
//!
//! ```bash
//! JWT_SECRET=change-me DATABASE_URL=postgres://... recipebox-server
//! # without Postgres, data lives only as long as the process
//! JWT_SECRET=change-me recipebox-server --in-memory
//! ```

use std::net::SocketAddr;

use clap::Parser;
use recipebox::{
    api::{routes::routes, state::AppState},
    config::Settings,
    database::{actions::PgStore, memory::MemoryStore},
};

#[derive(Parser)]
#[command(name = "recipebox-server", about = "Recipe sharing REST API")]
struct ServerArgs {
    /// Keep all data in process memory instead of Postgres
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = ServerArgs::parse();
    let settings = Settings::from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    let state = if args.in_memory {
        log::warn!("Using in-memory store; data is lost on exit");
        AppState::new(MemoryStore::new(), settings)
    } else {
        let store = PgStore::connect(&settings).await?;
        store.migrate().await?;
        log::info!("Connected to database, migrations applied");
        AppState::new(store, settings)
    };

    log::info!("Listening on {addr}");
    warp::serve(routes(state)).run(addr).await;

    Ok(())
}
