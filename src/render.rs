// src/render.rs
//
// Presentation of a race outcome, as text for humans or JSON for scripts.

use crate::models::{ProviderFailure, RaceOutcome};
use std::fmt::Write;

/// Process exit status when a provider answered.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit status for a timeout or when no provider gave a usable answer.
pub const EXIT_NO_ANSWER: i32 = 1;
/// Process exit status for a bad lookup code or configuration.
pub const EXIT_INVALID_INPUT: i32 = 2;

/// Maps a race outcome onto the process exit status.
pub fn exit_code(outcome: &RaceOutcome) -> i32 {
    if outcome.is_winner() {
        EXIT_SUCCESS
    } else {
        EXIT_NO_ANSWER
    }
}

/// Renders an outcome for standard output.
pub fn render_text(outcome: &RaceOutcome) -> String {
    let mut out = String::new();

    match outcome {
        RaceOutcome::Winner {
            provider,
            address,
            elapsed,
        } => {
            let a = address.normalized();
            let _ = writeln!(
                out,
                "Fastest answer from {} (answered in {} ms)",
                provider,
                elapsed.as_millis()
            );
            let _ = writeln!(out, "CEP:          {}", a.cep);
            let _ = writeln!(out, "State:        {}", a.state);
            let _ = writeln!(out, "City:         {}", a.city);
            let _ = writeln!(out, "Neighborhood: {}", a.neighborhood);
            let _ = write!(out, "Street:       {}", a.street);
        }
        RaceOutcome::Timeout { timeout, failures } => {
            let _ = write!(
                out,
                "Timeout: no provider answered within {} ms",
                timeout.as_millis()
            );
            for f in failures {
                let _ = write!(out, "\n  {}: {}", f.provider, f.error);
            }
        }
        RaceOutcome::AllFailed {
            failures,
            providers,
        } => {
            if failures.len() < *providers {
                let _ = write!(
                    out,
                    "No usable answer: {} of {} providers failed",
                    failures.len(),
                    providers
                );
            } else {
                let _ = write!(out, "All providers failed");
            }
            for f in failures {
                let _ = write!(out, "\n  {}: {}", f.provider, f.error);
            }
        }
    }

    out
}

/// Renders an outcome as pretty-printed JSON.
pub fn render_json(outcome: &RaceOutcome) -> Result<String, String> {
    serde_json::to_string_pretty(outcome).map_err(|e| format!("Failed to serialize outcome: {}", e))
}

/// One-line diagnostic for standard error, `None` for a winner.
pub fn error_line(outcome: &RaceOutcome) -> Option<String> {
    match outcome {
        RaceOutcome::Winner { .. } => None,
        RaceOutcome::Timeout { timeout, .. } => Some(format!(
            "error: lookup exceeded the {} ms time budget",
            timeout.as_millis()
        )),
        RaceOutcome::AllFailed {
            failures,
            providers,
        } => {
            if failures.is_empty() {
                Some("error: no provider returned a result".to_string())
            } else if failures.len() < *providers {
                Some(format!(
                    "error: no usable answer: {} failed first",
                    provider_names(failures)
                ))
            } else {
                Some(format!(
                    "error: all providers failed ({})",
                    provider_names(failures)
                ))
            }
        }
    }
}

fn provider_names(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| f.provider.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
