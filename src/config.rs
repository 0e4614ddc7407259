//! Command-line and environment configuration. Every option has a default
//! rooted in the user's home directory so a bare `company-manager` just works.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".company-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "company.sqlite";
/// Log file written next to the database; the terminal belongs to the UI.
const LOG_FILE_NAME: &str = "company.log";

/// Manage departments and employees stored in an embedded SQLite database.
#[derive(Debug, Parser)]
#[command(name = "company-manager", version, about)]
pub struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, env = "COMPANY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Path to the log file.
    #[arg(long, env = "COMPANY_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. `info`, `debug`).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Fully resolved settings handed to `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Cli {
    /// Fill in home-relative defaults for anything not given explicitly.
    pub fn resolve(self) -> Result<AppConfig> {
        let db_path = match self.db_path {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_file = match self.log_file {
            Some(path) => path,
            None => data_dir()?.join(LOG_FILE_NAME),
        };

        Ok(AppConfig {
            db_path,
            log_file,
            log_level: self.log_level,
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_are_kept() {
        let cli = Cli::try_parse_from([
            "company-manager",
            "--db-path",
            "/tmp/company/test.sqlite",
            "--log-file",
            "/tmp/company/test.log",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/company/test.sqlite"));
        assert_eq!(config.log_file, PathBuf::from("/tmp/company/test.log"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::try_parse_from([
            "company-manager",
            "--db-path",
            "a.sqlite",
            "--log-file",
            "a.log",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["company-manager", "--verbose"]).is_err());
    }
}
