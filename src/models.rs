// src/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Lookup Request
// =============================================================================

/// A postal code (CEP) passed unchanged to every provider.
///
/// # Examples
/// ```
/// use cep_race::models::CepCode;
///
/// let code = CepCode::parse("22450-000").unwrap();
/// assert_eq!(code.as_str(), "22450000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CepCode(String);

impl CepCode {
    /// Trims the input and drops the `-` and `.` separators people usually type.
    /// Fails only when nothing is left.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let code: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '.')
            .collect();

        if code.is_empty() {
            return Err("Lookup code must not be empty".to_string());
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CepCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Provider Response Shapes
// =============================================================================

/// Which wire format a provider answers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    BrasilApi,
    ViaCep,
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseShape::BrasilApi => write!(f, "brasil_api"),
            ResponseShape::ViaCep => write!(f, "via_cep"),
        }
    }
}

/// Address as returned by BrasilAPI (`/api/cep/v1/{code}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrasilApiAddress {
    pub cep: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub street: String,
}

/// Address as returned by ViaCEP (`/ws/{code}/json/`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViaCepAddress {
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
}

/// One case per provider shape. The race forwards it untouched; only the
/// renderer looks inside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "fields", rename_all = "snake_case")]
pub enum Address {
    BrasilApi(BrasilApiAddress),
    ViaCep(ViaCepAddress),
}

impl Address {
    pub fn shape(&self) -> ResponseShape {
        match self {
            Address::BrasilApi(_) => ResponseShape::BrasilApi,
            Address::ViaCep(_) => ResponseShape::ViaCep,
        }
    }

    /// Maps each shape's own field names onto the common field set.
    pub fn normalized(&self) -> NormalizedAddress {
        match self {
            Address::BrasilApi(a) => NormalizedAddress {
                cep: a.cep.clone(),
                state: a.state.clone(),
                city: a.city.clone(),
                neighborhood: a.neighborhood.clone(),
                street: a.street.clone(),
            },
            Address::ViaCep(a) => NormalizedAddress {
                cep: a.cep.clone(),
                state: a.uf.clone(),
                city: a.localidade.clone(),
                neighborhood: a.bairro.clone(),
                street: a.logradouro.clone(),
            },
        }
    }
}

/// Common field set used for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizedAddress {
    pub cep: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub street: String,
}

// =============================================================================
// Provider Results
// =============================================================================

/// What a single fetcher publishes on the result channel.
/// Exactly one of address / error is populated, enforced by the `Result`.
#[derive(Clone, Debug)]
pub struct ProviderResult {
    pub provider: String,
    pub outcome: Result<Address, crate::error::FetchError>,
}

impl ProviderResult {
    pub fn success(provider: impl Into<String>, address: Address) -> Self {
        Self {
            provider: provider.into(),
            outcome: Ok(address),
        }
    }

    pub fn failure(provider: impl Into<String>, error: crate::error::FetchError) -> Self {
        Self {
            provider: provider.into(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A provider that reported an error, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

// =============================================================================
// Race Types
// =============================================================================

/// When the coordinator stops listening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// Keep waiting until some provider succeeds, all fail, or the deadline passes.
    #[default]
    #[serde(alias = "first-success")]
    FirstSuccess,
    /// Stop on the first message, success or failure.
    #[serde(alias = "first-arrival")]
    FirstArrival,
}

impl RacePolicy {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "first_success" => Ok(RacePolicy::FirstSuccess),
            "first_arrival" => Ok(RacePolicy::FirstArrival),
            _ => Err(format!(
                "Unknown race policy: {} (expected first-success or first-arrival)",
                s
            )),
        }
    }
}

impl fmt::Display for RacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RacePolicy::FirstSuccess => write!(f, "first-success"),
            RacePolicy::FirstArrival => write!(f, "first-arrival"),
        }
    }
}

/// Result of one race. Built once per invocation and handed straight to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RaceOutcome {
    Winner {
        provider: String,
        address: Address,
        #[serde(with = "duration_millis")]
        elapsed: Duration,
    },
    /// The deadline passed first. Carries whatever failures arrived before it.
    Timeout {
        #[serde(with = "duration_millis")]
        timeout: Duration,
        failures: Vec<ProviderFailure>,
    },
    /// The race ended without a usable answer. `providers` is how many took
    /// part, so a first-arrival stop can be told apart from every one failing.
    AllFailed {
        failures: Vec<ProviderFailure>,
        providers: usize,
    },
}

impl RaceOutcome {
    pub fn is_winner(&self) -> bool {
        matches!(self, RaceOutcome::Winner { .. })
    }

    /// Short label for logging and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            RaceOutcome::Winner { .. } => "winner",
            RaceOutcome::Timeout { .. } => "timeout",
            RaceOutcome::AllFailed { .. } => "all_failed",
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cep_code_strips_separators() {
        assert_eq!(CepCode::parse(" 22.450-000 ").unwrap().as_str(), "22450000");
    }

    #[test]
    fn test_cep_code_rejects_empty() {
        assert!(CepCode::parse("").is_err());
        assert!(CepCode::parse("  - ").is_err());
    }

    #[test]
    fn test_normalized_via_cep_maps_portuguese_fields() {
        let addr = Address::ViaCep(ViaCepAddress {
            cep: "22450-000".to_string(),
            logradouro: "Rua Marquês de São Vicente".to_string(),
            complemento: String::new(),
            bairro: "Gávea".to_string(),
            localidade: "Rio de Janeiro".to_string(),
            uf: "RJ".to_string(),
        });

        let n = addr.normalized();
        assert_eq!(n.state, "RJ");
        assert_eq!(n.city, "Rio de Janeiro");
        assert_eq!(n.neighborhood, "Gávea");
        assert_eq!(n.street, "Rua Marquês de São Vicente");
        assert_eq!(addr.shape(), ResponseShape::ViaCep);
    }

    #[test]
    fn test_race_policy_parse() {
        assert_eq!(RacePolicy::parse("first-arrival").unwrap(), RacePolicy::FirstArrival);
        assert_eq!(RacePolicy::parse("FIRST_SUCCESS").unwrap(), RacePolicy::FirstSuccess);
        assert!(RacePolicy::parse("fastest").is_err());
    }

    #[test]
    fn test_outcome_serializes_elapsed_as_millis() {
        let outcome = RaceOutcome::Timeout {
            timeout: Duration::from_millis(50),
            failures: vec![],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "timeout");
        assert_eq!(json["timeout"], 50);
    }
}
