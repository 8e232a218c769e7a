//! Terminal front end for `assignments-core`
//!
//! Pieces the binary wires together:
//! - [`config`]: the TOML file and the [`config::TomlConfigStore`]
//! - [`api`]: the eClass HTTP source and the demo source
//! - [`components`] and [`ui`]: the ratatui renderer
//! - [`cli`] and [`logging`]: command-line flags and the log file
//! - [`terminal`]: raw mode setup and teardown

pub mod api;
pub mod cli;
pub mod components;
pub mod config;
pub mod logging;
pub mod terminal;
pub mod testing;
pub mod ui;

pub use api::{DemoSource, HttpSource, SetupError};
pub use cli::Args;
pub use config::{ConfigFile, TomlConfigStore};
pub use terminal::TerminalGuard;
pub use ui::TerminalUi;
