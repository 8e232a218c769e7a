//! Error types for loading, persisting and selection
//!
//! None of these are fatal to the controller. They travel inside actions,
//! so each one is `Clone` and comparable.

use thiserror::Error;

/// A data source failed to produce a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("could not parse response: {0}")]
    Parse(String),
    #[error("no data source named '{0}'")]
    UnknownSource(String),
}

/// The config store could not read or write the filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("could not read config: {0}")]
    Read(String),
    #[error("could not write config: {0}")]
    Write(String),
    #[error("could not encode config: {0}")]
    Encode(String),
}

/// An action needed a selected item and there was none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no item is selected")]
    NothingSelected,
}
