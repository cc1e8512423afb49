//! # chipdog
//!
//! Terminal client of the chipdog pet recovery service. Owners manage their
//! pets, pictures and QR/NFC tags; finders look up the contact card of a lost
//! pet by the code of its tag. Everything is stored by the backend project.

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod services;

use clap::{Parser, Subcommand};
use logfire::config::{MetricsOptions, SendToLogfire};

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Shows the public card of a lost pet by the code of its tag
    Found { code: String },
    /// Lists the pets of the signed in owner
    Pets,
}

/// Pet identification and recovery client
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    /// Writes debug records to the log file
    #[arg(short, long)]
    pub verbose: bool,

    /// Interactive client when omitted
    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Wires the backend client into the repo and the services
fn create_app_state(app_config: &config::AppConfig) -> anyhow::Result<front::AppState> {
    let backend = services::backend::BackendClient::new(
        &app_config.backend_url()?,
        &app_config.anon_key()?,
    )?;

    let session_store = services::session_store::FileSessionStore::new(&app_config.session_path);

    Ok(front::AppState {
        repo: Box::new(repo::postgrest::PostgrestRepo {
            backend: backend.clone(),
        }),
        storage_service: Box::new(services::storage::StorageHandler {
            backend: backend.clone(),
        }),
        auth_service: Box::new(services::auth::AuthHandler::new(
            backend,
            Box::new(session_store),
        )),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse();

    let app_config = config::init_config()?;

    logger::setup_file_logger(&app_config.log_path, args.verbose)?;

    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_console(None)
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    log::info!("chipdog starting, env={}", app_config.env);

    let state = create_app_state(app_config)?;

    let result = match args.action {
        None => front::terminal::run_interactive(state).await,
        Some(Action::Found { code }) => front::terminal::run_found(state, &code).await,
        Some(Action::Pets) => front::terminal::run_pets(state).await,
    };

    shutdown_handler.shutdown()?;

    result
}
