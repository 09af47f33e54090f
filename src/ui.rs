//! Ratatui front-end: a toy grid with search, sort, and add/edit/delete
//! modals. Every action runs one database call and redraws the grid from the
//! rows it returns.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
