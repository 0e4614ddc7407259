//! Binary entry point that glues the SQLite-backed DAO to the TUI: resolve
//! configuration, start logging, open the store, and drive the Ratatui event
//! loop until the user exits.
use clap::Parser;
use tracing::{error, info};

use company_manager::config::Cli;
use company_manager::{logging, run_app, App, FileHandler, SqliteDao};

/// Returning a `Result` bubbles fatal start-up problems (no home directory, an
/// unwritable log file, a terminal that refuses raw mode) to the shell.
fn main() -> anyhow::Result<()> {
    let config = Cli::parse().resolve()?;
    logging::init(&config.log_file, &config.log_level)?;
    info!(db = %config.db_path.display(), "starting company manager");

    let mut dao = SqliteDao::new(config.db_path.clone());
    if !dao.check_db_exists() {
        info!("a new database will be created");
    }
    dao.open()?;

    let mut app = App::new(dao)?;
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "event loop failed");
    }

    if let Err(err) = app.close() {
        if result.is_ok() {
            return Err(err);
        }
        error!(error = %format!("{err:#}"), "failed to close the database");
    }
    info!("goodbye");
    result
}
