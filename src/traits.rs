// src/traits.rs

use crate::error::FetchError;
use crate::models::{Address, CepCode};
use async_trait::async_trait;
use std::sync::Arc;

/// An external address-lookup source.
///
/// Implementations only perform the lookup. Cancellation, publishing the
/// result and the race itself live in [`crate::connectors::run_fetcher`] and
/// [`crate::race::Race`]; a fetch future may be dropped at any await point.
#[async_trait]
pub trait AddressFetcher: Send + Sync {
    /// Provider name used to tag results (e.g. "BrasilAPI").
    fn name(&self) -> &str;

    /// Looks up a single code.
    async fn fetch(&self, code: &CepCode) -> Result<Address, FetchError>;
}

/// Fetchers are shared between the coordinator and the spawned tasks.
pub type SharedFetcher = Arc<dyn AddressFetcher>;
