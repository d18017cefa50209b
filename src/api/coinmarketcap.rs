// ============================================================================
// API Client : CoinMarketCap
// ============================================================================
// GET /v1/cryptocurrency/quotes/latest?convert=USD&symbol=BTC,ETH
// En-tête X-CMC_PRO_API_KEY, timeout de 2 secondes
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::api::{QuoteRequest, QuoteSource};
use crate::error::{Result, WidgetError};
use crate::models::Config;

pub const API_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

/// En-tête portant la clé API
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Au-delà, la requête est abandonnée (Waybar attend une réponse rapide)
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Construit la requête pour toutes les pièces de la config
///
/// Une seule requête : les symboles sont joints par des virgules.
pub fn latest_quotes_request(config: &Config) -> QuoteRequest {
    QuoteRequest {
        url: API_URL.to_string(),
        query: vec![
            ("convert".to_string(), config.currency.to_uppercase()),
            ("symbol".to_string(), config.api_symbols()),
        ],
        headers: vec![(API_KEY_HEADER.to_string(), config.api_key.clone())],
    }
}

/// Client HTTP réel
pub struct CoinMarketCapClient {
    client: reqwest::Client,
}

impl CoinMarketCapClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("waybar-crypto/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WidgetError::fetch(format!("Could not build HTTP client. {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl QuoteSource for CoinMarketCapClient {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn get_json(&self, request: &QuoteRequest) -> Result<serde_json::Value> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!("Sending HTTP request to CoinMarketCap");
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                WidgetError::fetch(format!(
                    "Request timed out after {}s",
                    REQUEST_TIMEOUT.as_secs()
                ))
            } else {
                WidgetError::fetch(format!("Request failed. {}", e))
            }
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "CoinMarketCap returned error status");
            return Err(WidgetError::fetch(format!("Status code: {}", status.as_u16())));
        }

        response.json().await.map_err(|e| {
            WidgetError::fetch(format!("Could not parse API response body as JSON. {}", e))
        })
    }
}
