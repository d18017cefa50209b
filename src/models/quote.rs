// ============================================================================
// Structures : RawQuoteDoc / Quote
// ============================================================================
// RawQuoteDoc : forme attendue de la réponse CoinMarketCap
//
// {
//   "data": {
//     "BTC": { "quote": { "USD": { "price": 43123.45, "volume_24h": ..., ... } } }
//   }
// }
//
// Quote : les cinq valeurs d'une pièce dans une devise, en décimal exact
//
// CONCEPT : pas de f64 pour l'affichage
// - On garde le texte du nombre JSON (serde_json::Number)
// - On le convertit en rust_decimal::Decimal pour un arrondi décimal
// ============================================================================

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{Result, WidgetError};

/// Réponse brute de l'API (seuls les champs utiles sont typés)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawQuoteDoc {
    pub data: HashMap<String, RawCoin>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCoin {
    /// Cotations par code devise
    pub quote: HashMap<String, RawQuoteFields>,
}

/// Champs d'une cotation ; l'API peut renvoyer null
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawQuoteFields {
    pub price: Option<Number>,
    pub volume_24h: Option<Number>,
    pub percent_change_1h: Option<Number>,
    pub percent_change_24h: Option<Number>,
    pub percent_change_7d: Option<Number>,
}

/// Cotation d'une pièce, éphémère (une seule passe d'orchestration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    pub volume_24h: Decimal,
    pub pct_change_1h: Decimal,
    pub pct_change_24h: Decimal,
    pub pct_change_7d: Decimal,
}

impl RawQuoteDoc {
    /// Extrait la cotation d'une pièce dans une devise
    ///
    /// Les clés du document sont en majuscules ; `symbol` et `currency`
    /// sont mis en majuscules ici.
    pub fn quote_for(&self, symbol: &str, currency: &str) -> Result<Quote> {
        let symbol = symbol.to_uppercase();
        let currency = currency.to_uppercase();

        let fields = self
            .data
            .get(&symbol)
            .ok_or_else(|| WidgetError::fetch(format!("no data for {} in response", symbol)))?
            .quote
            .get(&currency)
            .ok_or_else(|| {
                WidgetError::fetch(format!("no {} quote for {} in response", currency, symbol))
            })?;

        Quote::from_raw(fields, &symbol)
    }
}

impl Quote {
    fn from_raw(raw: &RawQuoteFields, symbol: &str) -> Result<Self> {
        let field = |value: &Option<Number>, name: &str| -> Result<Decimal> {
            let number = value
                .as_ref()
                .ok_or_else(|| WidgetError::fetch(format!("missing {} for {}", name, symbol)))?;
            to_decimal(number)
                .ok_or_else(|| WidgetError::fetch(format!("invalid {} for {}: {}", name, symbol, number)))
        };

        Ok(Self {
            price: field(&raw.price, "price")?,
            volume_24h: field(&raw.volume_24h, "volume_24h")?,
            pct_change_1h: field(&raw.percent_change_1h, "percent_change_1h")?,
            pct_change_24h: field(&raw.percent_change_24h, "percent_change_24h")?,
            pct_change_7d: field(&raw.percent_change_7d, "percent_change_7d")?,
        })
    }
}

/// Convertit un nombre JSON en Decimal à partir de son texte
///
/// "43123.45" passe par from_str, "1.5e-7" par from_scientific.
fn to_decimal(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
