//! assignments - eClass assignment browser
//!
//! Loads assignments from the eClass endpoint (and optionally a built-in
//! demo set), lets the user hide assignments or whole courses, and saves
//! those choices back to the config file.
//!
//! # Usage
//!
//! ```sh
//! assignments --username student --domain eclass.example.org
//! assignments --demo
//! ```

use std::io;
use std::sync::Arc;

use anyhow::Context;
use assignments_core::{
    initial_state, reducer, ConfigStore, Keybindings, LoggingMiddleware, Runtime, Store,
};
use assignments_tui::{
    config, logging, Args, ConfigFile, DemoSource, HttpSource, TerminalGuard, TerminalUi,
    TomlConfigStore,
};
use clap::Parser;
use ratatui::{backend::CrosstermBackend, Terminal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_guard = match logging::default_log_dir() {
        Some(dir) => Some(logging::init(&dir)?),
        None => None,
    };

    let config_path = args
        .config
        .clone()
        .or_else(config::default_path)
        .context("no config directory on this system; pass --config")?;
    let mut file = ConfigFile::read(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    args.apply(&mut file);

    let config_store: Arc<dyn ConfigStore> = Arc::new(TomlConfigStore::new(&config_path));
    let mut state = initial_state(config_store.as_ref()).await;
    if file.options.include_expired && !state.filter.include_expired {
        state.filter.include_expired = true;
        state.refresh_title();
    }

    let keybindings = Keybindings::merge(Keybindings::defaults(), file.keys.clone());
    let store = Store::with_middleware(state, reducer, LoggingMiddleware::new());
    let mut runtime =
        Runtime::from_store(store, config_store).with_keybindings(keybindings.clone());

    match HttpSource::from_config(&file) {
        Ok(source) => {
            tracing::info!(url = source.url(), "using eClass source");
            if file.options.source_url.is_none() {
                tracing::warn!("no source_url set; the default endpoint needs a JSON adapter");
            }
            runtime = runtime.with_source(Arc::new(source));
        }
        Err(error) if file.options.demo => {
            tracing::warn!(%error, "eClass source disabled");
        }
        Err(error) => return Err(error).context("cannot reach eClass (try --demo)"),
    }
    if file.options.demo {
        runtime = runtime.with_source(Arc::new(DemoSource::new()));
    }

    // ===== Terminal setup =====
    // restored when dropped, on every exit path below
    let guard = TerminalGuard::enter()?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut ui = TerminalUi::new(terminal, keybindings);

    let result = runtime.run_terminal(&mut ui).await;
    drop(guard);

    result.context("terminal error")
}
