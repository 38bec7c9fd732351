mod api;
mod app;
mod bootstrap;
mod cli;
mod config;
mod logging;
mod login;
mod runtime;
mod session_store;
mod snapshot;
mod time_utils;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

use api::{DataService, DevBackend, IdentityService, RestClient, Store};
use bootstrap::{resolve_identity, Gate};
use cli::{Cli, Commands};
use config::SentinelConfig;

fn main() -> Result<()> {
    // The local offset can only be read safely before other threads exist.
    time_utils::init_local_offset();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(cli))
}

fn print_config_path() -> Result<()> {
    let path = SentinelConfig::config_path()?;
    if !path.exists() {
        SentinelConfig::default().save()?;
    }
    println!("{}", path.display());
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // config-path must work even when the config file does not parse.
    if !cli.command.writes_log() {
        return print_config_path();
    }

    let config = SentinelConfig::load()?;
    logging::init(&config)?;

    match cli.command {
        Commands::Login => {
            login::run_login(&config).await?;
            Ok(())
        }
        Commands::Logout => login::run_logout(&config).await,
        Commands::Run => {
            let session = session_store::load_session()?;
            let client = Arc::new(
                RestClient::new(&config.api_url, &config.anon_key, session)?
                    .on_session_refreshed(session_store::save_session),
            );
            launch(client.clone(), client).await
        }
        Commands::Dev => {
            let backend = Arc::new(DevBackend::new());
            launch(backend.clone(), backend).await
        }
        Commands::ConfigPath => print_config_path(),
    }
}

async fn launch(identity: Arc<dyn IdentityService>, data: Arc<dyn DataService>) -> Result<()> {
    let user = match resolve_identity(identity.as_ref()).await? {
        Gate::Proceed(user) => user,
        Gate::RedirectToLogin => {
            println!("Not logged in. Run `sentinel login` first.");
            return Ok(());
        }
    };

    let services = runtime::Services::new(Store::new(data), user.clone());
    let mut app = App::new(user, time_utils::today_local());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, &services).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("event loop failed: {:#}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
