//! Ratatui front-end. It plays the part of the interactive menu: every list,
//! form, and dialog ends in a call on the data-access contract.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
