//! Core library surface for the Company Manager application.
//!
//! The data-access layer (`db`) is the heart of the crate: a typed contract
//! over departments and employees plus a SQLite-backed adapter. The terminal
//! front-end in `ui` drives it, and `main.rs` only wires configuration,
//! logging, and the event loop together.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// The data-access contract and its SQLite adapter.
pub use db::{CompanyDao, DepartmentDao, EmployeeDao, FileHandler, SqliteDao};

pub use error::{DaoError, Entity};

/// The two domain types and their typed keys.
pub use models::{Department, DepartmentId, Employee, EmployeeId};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
