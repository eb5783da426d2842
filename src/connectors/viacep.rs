// src/connectors/viacep.rs
//
// ViaCEP JSON endpoint. Answers with Portuguese field names, and with
// `200 {"erro": true}` for codes it does not know.

use crate::error::FetchError;
use crate::models::{Address, ViaCepAddress};
use serde::Deserialize;

pub const VIA_CEP_NAME: &str = "ViaCEP";
pub const VIA_CEP_URL: &str = "http://viacep.com.br/ws/{code}/json/";

#[derive(Deserialize)]
#[serde(untagged)]
enum ViaCepResponse {
    Found(ViaCepAddress),
    // Newer deployments send "true" as a string, older ones a bool.
    Missing {
        #[allow(dead_code)]
        erro: serde_json::Value,
    },
}

/// Decodes a ViaCEP response body. The not-found marker is a decode failure,
/// so an empty address is never reported as a win.
pub fn decode(body: &[u8]) -> Result<Address, FetchError> {
    match serde_json::from_slice::<ViaCepResponse>(body)? {
        ViaCepResponse::Found(address) => Ok(Address::ViaCep(address)),
        ViaCepResponse::Missing { .. } => Err(FetchError::Decode(
            "provider reported unknown code".to_string(),
        )),
    }
}
