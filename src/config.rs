// src/config.rs
//
// Configuration file parsing.
// A TOML file sets the race deadline, the policy, and the ordered provider list.

use crate::connectors::brasilapi::{BRASIL_API_NAME, BRASIL_API_URL};
use crate::connectors::http::{build_client, build_url, DEFAULT_USER_AGENT};
use crate::connectors::viacep::{VIA_CEP_NAME, VIA_CEP_URL};
use crate::connectors::{HttpFetcher, CODE_PLACEHOLDER};
use crate::models::{CepCode, RacePolicy, ResponseShape};
use crate::race::{Race, DEFAULT_TIMEOUT};
use crate::traits::SharedFetcher;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Configuration Types
// =============================================================================

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
    /// Providers to race, in spawn order. Empty means the built-in pair.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Global configuration settings.
#[derive(Debug, Deserialize)]
pub struct GlobalConfig {
    /// Race deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// When the race stops listening
    #[serde(default)]
    pub policy: RacePolicy,
    /// Log filter used when RUST_LOG is unset
    pub log_level: Option<String>,
    /// User-Agent sent to providers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            policy: RacePolicy::default(),
            log_level: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// One provider descriptor: endpoint template plus response shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    /// Name used to tag results
    pub name: String,
    /// URL template containing `{code}`
    pub url: String,
    /// Wire format of the response
    pub shape: ResponseShape,
}

/// The two providers used when the config lists none.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: BRASIL_API_NAME.to_string(),
            url: BRASIL_API_URL.to_string(),
            shape: ResponseShape::BrasilApi,
        },
        ProviderConfig {
            name: VIA_CEP_NAME.to_string(),
            url: VIA_CEP_URL.to_string(),
            shape: ResponseShape::ViaCep,
        },
    ]
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string, filling defaults and validating.
    pub fn from_str(s: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(s).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.resolved()
    }

    /// Fills the default provider list when none is given, then validates.
    pub fn resolved(mut self) -> Result<Self, String> {
        if self.providers.is_empty() {
            self.providers = default_providers();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.global.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        if self.providers.is_empty() {
            return Err("At least one provider is required".to_string());
        }

        // Any non-empty code works for checking the template shape.
        let probe = CepCode::parse("00000000")?;
        let mut names = HashSet::new();
        for provider in &self.providers {
            if !names.insert(provider.name.as_str()) {
                return Err(format!("Duplicate provider name: {}", provider.name));
            }
            if !provider.url.contains(CODE_PLACEHOLDER) {
                return Err(format!(
                    "Provider {}: url must contain {}",
                    provider.name, CODE_PLACEHOLDER
                ));
            }
            build_url(&provider.url, &probe)
                .map_err(|e| format!("Provider {}: {}", provider.name, e))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.global.timeout_ms)
    }

    /// Builds one HTTP fetcher per provider, all sharing a single client.
    pub fn build_fetchers(&self) -> Result<Vec<SharedFetcher>, String> {
        let client = build_client(&self.global.user_agent)?;
        Ok(self
            .providers
            .iter()
            .map(|p| HttpFetcher::new(&p.name, &p.url, p.shape, client.clone()).shared())
            .collect())
    }

    /// Builds a race over the configured providers.
    pub fn build_race(&self) -> Result<Race, String> {
        Ok(Race::new(self.build_fetchers()?, self.timeout()).with_policy(self.global.policy))
    }
}

// =============================================================================
// Default Configuration
// =============================================================================

/// Returns a default configuration string for documentation.
pub fn default_config_template() -> &'static str {
    r#"# cep-race configuration
#
# Every provider is queried concurrently; the first usable answer wins.

[global]
# Deadline for the whole race, in milliseconds
timeout_ms = 1000

# "first_success": wait for a success until all providers fail or time runs out
# "first_arrival": stop on the first answer, even if it is a failure
policy = "first_success"

# Log filter when RUST_LOG is not set
log_level = "warn"

# Providers, queried in this order. Omit the list to use these two.
[[providers]]
name = "BrasilAPI"
url = "https://brasilapi.com.br/api/cep/v1/{code}"
shape = "brasil_api"

[[providers]]
name = "ViaCEP"
url = "http://viacep.com.br/ws/{code}/json/"
shape = "via_cep"
"#
}

// =============================================================================
// Tests
// =============================================================================
