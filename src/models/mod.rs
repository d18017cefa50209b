// ============================================================================
// Module : models
// ============================================================================
// Structures de données du widget : configuration, cotations, sortie
// ============================================================================

pub mod config;          // Config, DisplayMode, DisplayField(s)
pub mod envelope;        // OutputEnvelope (sortie JSON)
pub mod quote;           // RawQuoteDoc, Quote
pub mod watchlist_entry; // WatchlistEntry

// Re-export des structures principales
// On peut faire : use waybar_crypto::models::Config;
pub use config::{Config, DisplayField, DisplayFields, DisplayMode};
pub use envelope::{OutputEnvelope, CLASS_NAME};
pub use quote::{Quote, RawQuoteDoc};
pub use watchlist_entry::WatchlistEntry;
