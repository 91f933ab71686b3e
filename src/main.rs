mod aggregate;
mod auth;
mod clock;
mod config;
mod db;
mod error;
mod export;
mod loans;
mod logging;
mod models;
mod pages;
mod run;
mod savings;
mod targets;
mod ui;
mod welfare;

use anyhow::Result;

const LOG_FILE: &str = "sacco.log";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;

    // The TUI owns the terminal, so its log goes to a file
    let log_file = match args.len() {
        1 => Some(config::data_dir()?.join(LOG_FILE)),
        _ => None,
    };
    logging::init(&config.log_level, log_file.as_deref())?;

    let db_path = config.resolve_db_path()?;
    let db = db::Database::open(&db_path)?;
    log::debug!("Using database {}", db_path.display());

    match args.len() {
        1 => run::as_tui(&db, &config),
        _ => run::as_cli(&args, &db, &config),
    }
}
