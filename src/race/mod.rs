// src/race/mod.rs

//! The race coordinator.
//!
//! Starts one task per fetcher under a shared, deadline-bound scope and waits
//! for the first qualifying result:
//! 1. Every fetcher publishes on one bounded channel sized to the fetcher count
//! 2. The coordinator selects between the next message and the deadline
//! 3. Once the outcome is decided the scope is cancelled and the tasks aborted

use crate::connectors::run_fetcher;
use crate::models::{CepCode, ProviderFailure, RaceOutcome, RacePolicy};
use crate::traits::SharedFetcher;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Race {
    fetchers: Vec<SharedFetcher>,
    timeout: Duration,
    policy: RacePolicy,
}

impl Race {
    /// Creates a race over `fetchers` with a single deadline for the whole race.
    pub fn new(fetchers: Vec<SharedFetcher>, timeout: Duration) -> Self {
        Self {
            fetchers,
            timeout,
            policy: RacePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Runs the race in a fresh root scope.
    pub async fn run(&self, code: &CepCode) -> RaceOutcome {
        self.run_within(code, &CancellationToken::new()).await
    }

    /// Runs the race in a scope derived from `parent`.
    ///
    /// Cancelling `parent` ends the race early; that is reported as a
    /// timeout, since the scope expired before any winner.
    pub async fn run_within(&self, code: &CepCode, parent: &CancellationToken) -> RaceOutcome {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let scope = parent.child_token();

        info!(
            "Race: looking up {} across {} providers (timeout {:?}, policy {})",
            code,
            self.fetchers.len(),
            self.timeout,
            self.policy
        );

        // Capacity covers one message per fetcher, so no send ever waits.
        let (tx, mut rx) = mpsc::channel(self.fetchers.len().max(1));
        let mut tasks = JoinSet::new();
        for fetcher in &self.fetchers {
            tasks.spawn(run_fetcher(
                Arc::clone(fetcher),
                scope.clone(),
                code.clone(),
                tx.clone(),
            ));
        }
        drop(tx);

        let mut failures: Vec<ProviderFailure> = Vec::new();

        let outcome = loop {
            tokio::select! {
                message = rx.recv() => {
                    let Some(result) = message else {
                        // Every fetcher exited without publishing.
                        if scope.is_cancelled() {
                            break RaceOutcome::Timeout {
                                timeout: self.timeout,
                                failures,
                            };
                        }
                        break RaceOutcome::AllFailed {
                            failures,
                            providers: self.fetchers.len(),
                        };
                    };

                    match result.outcome {
                        Ok(address) => {
                            break RaceOutcome::Winner {
                                provider: result.provider,
                                address,
                                elapsed: started.elapsed(),
                            };
                        }
                        Err(e) => {
                            debug!("Race: {} reported failure: {}", result.provider, e);
                            failures.push(ProviderFailure {
                                provider: result.provider,
                                error: e.to_string(),
                            });

                            if self.policy == RacePolicy::FirstArrival
                                || failures.len() >= self.fetchers.len()
                            {
                                break RaceOutcome::AllFailed {
                                    failures,
                                    providers: self.fetchers.len(),
                                };
                            }
                        }
                    }
                }
                _ = sleep_until(deadline) => {
                    break RaceOutcome::Timeout {
                        timeout: self.timeout,
                        failures,
                    };
                }
                _ = scope.cancelled() => {
                    debug!("Race: parent scope cancelled");
                    break RaceOutcome::Timeout {
                        timeout: self.timeout,
                        failures,
                    };
                }
            }
        };

        scope.cancel();
        let pending = tasks.len();
        // Abort anything that has not noticed the cancellation yet.
        tasks.abort_all();
        debug!("Race: cancelled scope, {} fetcher task(s) outstanding", pending);

        match &outcome {
            RaceOutcome::Winner {
                provider, elapsed, ..
            } => info!("Race: {} won in {:?}", provider, elapsed),
            RaceOutcome::Timeout { failures, .. } => warn!(
                "Race: no result within {:?} ({} failure(s) before deadline)",
                self.timeout,
                failures.len()
            ),
            RaceOutcome::AllFailed {
                failures,
                providers,
            } => warn!(
                "Race: {} of {} provider(s) failed",
                failures.len(),
                providers
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::StubFetcher;
    use crate::error::FetchError;
    use crate::models::{Address, ViaCepAddress};

    fn address(city: &str) -> Address {
        Address::ViaCep(ViaCepAddress {
            cep: "22450000".to_string(),
            logradouro: String::new(),
            complemento: String::new(),
            bairro: String::new(),
            localidade: city.to_string(),
            uf: "RJ".to_string(),
        })
    }

    fn code() -> CepCode {
        CepCode::parse("22450000").unwrap()
    }

    #[tokio::test]
    async fn test_no_fetchers_is_all_failed() {
        let outcome = Race::new(vec![], Duration::from_millis(50)).run(&code()).await;
        assert_eq!(
            outcome,
            RaceOutcome::AllFailed {
                failures: vec![],
                providers: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_single_success() {
        let race = Race::new(
            vec![StubFetcher::succeeding("A", address("Rio"), Duration::ZERO).shared()],
            Duration::from_secs(1),
        );

        match race.run(&code()).await {
            RaceOutcome::Winner { provider, address: a, .. } => {
                assert_eq!(provider, "A");
                assert_eq!(a.normalized().city, "Rio");
            }
            other => panic!("Expected winner, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_arrival_stops_on_failure() {
        let race = Race::new(
            vec![
                StubFetcher::failing(
                    "fast-fail",
                    FetchError::Transport("refused".to_string()),
                    Duration::from_millis(5),
                )
                .shared(),
                StubFetcher::succeeding("slow-ok", address("Rio"), Duration::from_millis(100))
                    .shared(),
            ],
            Duration::from_secs(1),
        )
        .with_policy(RacePolicy::FirstArrival);

        match race.run(&code()).await {
            RaceOutcome::AllFailed {
                failures,
                providers,
            } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(providers, 2);
                assert_eq!(failures[0].provider, "fast-fail");
            }
            other => panic!("Expected AllFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_parent_ends_race() {
        let race = Race::new(
            vec![StubFetcher::succeeding("A", address("Rio"), Duration::from_secs(30)).shared()],
            Duration::from_secs(30),
        );
        let parent = CancellationToken::new();
        parent.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(1), race.run_within(&code(), &parent))
            .await
            .expect("race returns promptly");
        assert_eq!(outcome.kind(), "timeout");
    }

    #[test]
    fn test_builder_accessors() {
        let race = Race::new(
            vec![StubFetcher::succeeding("A", address("Rio"), Duration::ZERO).shared()],
            DEFAULT_TIMEOUT,
        )
        .with_policy(RacePolicy::FirstArrival);

        assert_eq!(race.timeout(), Duration::from_secs(1));
        assert_eq!(race.policy(), RacePolicy::FirstArrival);
        assert_eq!(race.provider_names(), vec!["A"]);
    }
}
