//! Collaborators the scheduler talks to: data sources and the config store

use async_trait::async_trait;

use crate::error::{LoadError, PersistError};
use crate::filter::FilterState;
use crate::model::Assignment;

/// Somewhere assignments come from
///
/// `fetch` must return the complete, unfiltered set. Credentials and
/// options belong to the implementor; exclusion filters are never passed
/// in.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Name used in `LoadRequested` and in status text
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Assignment>, LoadError>;
}

/// Durable home of the filter configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored filter, or the default one if nothing was stored yet
    async fn load(&self) -> Result<FilterState, PersistError>;

    async fn save(&self, filter: FilterState) -> Result<(), PersistError>;
}
