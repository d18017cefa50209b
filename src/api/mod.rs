// ============================================================================
// Module : api
// ============================================================================
// Source distante des cotations
//
// QuoteSource est le point de substitution : en production c'est
// CoinMarketCapClient (reqwest), en test une fausse source qui compte
// les appels.
// ============================================================================

pub mod coinmarketcap; // Client API CoinMarketCap

use async_trait::async_trait;

use crate::error::Result;

pub use coinmarketcap::{latest_quotes_request, CoinMarketCapClient};

/// Requête GET : URL, paramètres de query et en-têtes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

/// Effectue un GET et retourne le corps JSON parsé
///
/// Statut non-2xx, timeout ou corps non-JSON : WidgetError::Fetch.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn get_json(&self, request: &QuoteRequest) -> Result<serde_json::Value>;
}
