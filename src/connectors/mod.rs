// src/connectors/mod.rs
//
// Concrete address fetchers and the task body that runs one of them inside a race.

pub mod brasilapi;
pub mod http;
pub mod stub;
pub mod viacep;

pub use http::HttpFetcher;
pub use stub::{StubFetcher, StubProbe};

use crate::error::FetchError;
use crate::models::{CepCode, ProviderResult};
use crate::traits::SharedFetcher;
use log::{debug, Level};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Placeholder substituted with the lookup code in provider URL templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Cancellation is the normal fate of every losing fetcher, so it stays at debug.
fn failure_log_level(error: &FetchError) -> Level {
    if *error == FetchError::cancelled() {
        Level::Debug
    } else {
        Level::Warn
    }
}

/// Runs one fetcher under the race scope and publishes at most one result.
///
/// - A scope already cancelled before start means nothing is fetched or sent.
/// - Cancellation during the fetch drops the in-flight future (aborting any
///   HTTP request) and the result is not published.
/// - The send itself races the scope, so a fetcher never waits on a
///   coordinator that has stopped listening.
pub async fn run_fetcher(
    fetcher: SharedFetcher,
    scope: CancellationToken,
    code: CepCode,
    sink: mpsc::Sender<ProviderResult>,
) {
    let name = fetcher.name().to_string();

    if scope.is_cancelled() {
        debug!("Fetcher[{}]: scope cancelled before start, skipping", name);
        return;
    }

    let outcome = tokio::select! {
        biased;
        _ = scope.cancelled() => Err(FetchError::cancelled()),
        result = fetcher.fetch(&code) => result,
    };

    let result = match outcome {
        Ok(address) => {
            debug!("Fetcher[{}]: lookup of {} succeeded", name, code);
            ProviderResult::success(name.as_str(), address)
        }
        Err(e) => {
            log::log!(
                failure_log_level(&e),
                "Fetcher[{}]: lookup of {} failed: {}",
                name,
                code,
                e
            );
            ProviderResult::failure(name.as_str(), e)
        }
    };

    tokio::select! {
        biased;
        _ = scope.cancelled() => {
            debug!("Fetcher[{}]: race already decided, dropping result", name);
        }
        sent = sink.send(result) => {
            if sent.is_err() {
                debug!("Fetcher[{}]: receiver dropped, dropping result", name);
            }
        }
    }
}
