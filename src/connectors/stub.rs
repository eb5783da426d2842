// src/connectors/stub.rs
//
// Offline fetcher with a fixed delay and a canned answer. Drives demo mode and
// lets tests control completion order without touching the network.

use crate::error::FetchError;
use crate::models::{Address, BrasilApiAddress, CepCode, ViaCepAddress};
use crate::traits::{AddressFetcher, SharedFetcher};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts how fetch calls on a stub ended.
///
/// `abandoned` is bumped when a fetch future is dropped before its delay
/// elapsed, which is what cancellation or task abort looks like from inside.
#[derive(Debug, Default)]
pub struct StubProbe {
    started: AtomicUsize,
    completed: AtomicUsize,
    abandoned: AtomicUsize,
}

impl StubProbe {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// True once every started fetch either completed or was dropped.
    pub fn settled(&self) -> bool {
        self.started() == self.completed() + self.abandoned()
    }
}

struct InFlight<'a> {
    probe: &'a StubProbe,
    done: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.probe.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct StubFetcher {
    name: String,
    delay: Duration,
    response: Result<Address, FetchError>,
    probe: Arc<StubProbe>,
}

impl StubFetcher {
    pub fn succeeding(name: impl Into<String>, address: Address, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            response: Ok(address),
            probe: Arc::new(StubProbe::default()),
        }
    }

    pub fn failing(name: impl Into<String>, error: FetchError, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            response: Err(error),
            probe: Arc::new(StubProbe::default()),
        }
    }

    /// Wraps this fetcher in an Arc for use as SharedFetcher.
    pub fn shared(self) -> SharedFetcher {
        Arc::new(self)
    }

    pub fn probe(&self) -> Arc<StubProbe> {
        Arc::clone(&self.probe)
    }
}

#[async_trait]
impl AddressFetcher for StubFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _code: &CepCode) -> Result<Address, FetchError> {
        self.probe.started.fetch_add(1, Ordering::SeqCst);
        let mut in_flight = InFlight {
            probe: &self.probe,
            done: false,
        };

        tokio::time::sleep(self.delay).await;

        in_flight.done = true;
        self.probe.completed.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Two offline stand-ins for the built-in providers, answering for the given
/// code with slightly different latencies.
pub fn demo_fetchers(code: &CepCode) -> Vec<SharedFetcher> {
    let brasil = Address::BrasilApi(BrasilApiAddress {
        cep: code.to_string(),
        state: "RJ".to_string(),
        city: "Rio de Janeiro".to_string(),
        neighborhood: "Gávea".to_string(),
        street: "Rua Marquês de São Vicente".to_string(),
    });
    let via = Address::ViaCep(ViaCepAddress {
        cep: code.to_string(),
        logradouro: "Rua Marquês de São Vicente".to_string(),
        complemento: String::new(),
        bairro: "Gávea".to_string(),
        localidade: "Rio de Janeiro".to_string(),
        uf: "RJ".to_string(),
    });

    vec![
        StubFetcher::succeeding("BrasilAPI (demo)", brasil, Duration::from_millis(120)).shared(),
        StubFetcher::succeeding("ViaCEP (demo)", via, Duration::from_millis(80)).shared(),
    ]
}
