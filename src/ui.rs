//! Ratatui front-end. Menu handling, dialogs and list screens live in `app`;
//! `terminal` owns raw mode and the draw/input loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
