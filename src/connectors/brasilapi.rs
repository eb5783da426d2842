// src/connectors/brasilapi.rs
//
// BrasilAPI CEP v1 endpoint. Answers with English field names; unknown codes
// come back as HTTP 404, which the HTTP fetcher reports before decoding.

use crate::error::FetchError;
use crate::models::{Address, BrasilApiAddress};

pub const BRASIL_API_NAME: &str = "BrasilAPI";
pub const BRASIL_API_URL: &str = "https://brasilapi.com.br/api/cep/v1/{code}";

/// Decodes a BrasilAPI response body.
pub fn decode(body: &[u8]) -> Result<Address, FetchError> {
    let address: BrasilApiAddress = serde_json::from_slice(body)?;
    Ok(Address::BrasilApi(address))
}
