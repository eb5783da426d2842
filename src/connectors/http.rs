// src/connectors/http.rs
//
// Config-driven HTTP fetcher: one URL template plus the response shape to decode.

use super::{brasilapi, viacep, CODE_PLACEHOLDER};
use crate::error::FetchError;
use crate::models::{Address, CepCode, ResponseShape};
use crate::traits::{AddressFetcher, SharedFetcher};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("cep-race/", env!("CARGO_PKG_VERSION"));

/// Builds the client shared by every HTTP fetcher in a race.
///
/// No client-level timeout: the race deadline bounds every request, and
/// cancelling the race drops the in-flight futures.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))
}

/// Fetches an address with a single GET and decodes it as `shape`.
pub struct HttpFetcher {
    name: String,
    url_template: String,
    shape: ResponseShape,
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        shape: ResponseShape,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            shape,
            http_client,
        }
    }

    /// Wraps this fetcher in an Arc for use as SharedFetcher.
    pub fn shared(self) -> SharedFetcher {
        Arc::new(self)
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    /// Substitutes the code into the template and checks the result is an http(s) URL.
    pub fn build_url(&self, code: &CepCode) -> Result<Url, FetchError> {
        build_url(&self.url_template, code)
    }

    fn decode(&self, body: &[u8]) -> Result<Address, FetchError> {
        match self.shape() {
            ResponseShape::BrasilApi => brasilapi::decode(body),
            ResponseShape::ViaCep => viacep::decode(body),
        }
    }
}

/// The code is percent-encoded so it always stays a single path segment.
pub(crate) fn build_url(template: &str, code: &CepCode) -> Result<Url, FetchError> {
    let encoded = urlencoding::encode(code.as_str());
    let url = Url::parse(&template.replace(CODE_PLACEHOLDER, &encoded))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::RequestConstruction(format!(
            "unsupported URL scheme: {}",
            other
        ))),
    }
}

#[async_trait]
impl AddressFetcher for HttpFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, code: &CepCode) -> Result<Address, FetchError> {
        let url = self.build_url(code)?;
        debug!("HttpFetcher[{}]: GET {} (expecting {})", self.name, url, self.shape());

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(
                "HttpFetcher[{}]: HTTP {} from {}",
                self.name,
                response.status(),
                url
            );
            return Err(FetchError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))?;

        self.decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(template: &str) -> HttpFetcher {
        HttpFetcher::new(
            "test",
            template,
            ResponseShape::ViaCep,
            reqwest::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        )
    }

    #[test]
    fn test_build_url_substitutes_code() {
        let code = CepCode::parse("22450000").unwrap();
        let url = fetcher(viacep::VIA_CEP_URL).build_url(&code).unwrap();
        assert_eq!(url.as_str(), "http://viacep.com.br/ws/22450000/json/");
    }

    #[test]
    fn test_build_url_keeps_reserved_characters_in_one_segment() {
        let code = CepCode::parse("22450000#x").unwrap();
        let url = fetcher(viacep::VIA_CEP_URL).build_url(&code).unwrap();
        assert_eq!(url.path(), "/ws/22450000%23x/json/");
        assert_eq!(url.fragment(), None);

        let code = CepCode::parse("1/x?y=2").unwrap();
        let url = fetcher(viacep::VIA_CEP_URL).build_url(&code).unwrap();
        assert_eq!(url.path(), "/ws/1%2Fx%3Fy%3D2/json/");
        assert_eq!(url.query(), None);
        assert_eq!(url.path_segments().unwrap().count(), 3);
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        let code = CepCode::parse("22450000").unwrap();
        assert!(matches!(
            fetcher("not a url/{code}").build_url(&code),
            Err(FetchError::RequestConstruction(_))
        ));
        assert!(matches!(
            fetcher("ftp://example.com/{code}").build_url(&code),
            Err(FetchError::RequestConstruction(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_bad_template_fails_without_network() {
        let code = CepCode::parse("22450000").unwrap();
        let result = fetcher("::{code}").fetch(&code).await;
        assert!(matches!(result, Err(FetchError::RequestConstruction(_))));
    }
}
