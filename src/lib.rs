// ============================================================================
// waybar-crypto - Library
// ============================================================================
// Widget Waybar affichant des cotations crypto (CoinMarketCap)
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Source distante (CoinMarketCap)
pub mod app;     // Orchestrateur d'une invocation
pub mod cache;   // Snapshot de la dernière réponse
pub mod config;  // Lecture et validation de config.ini
pub mod error;   // Taxonomie d'erreurs
pub mod format;  // Rendu texte d'une pièce
pub mod models;  // Structures de données
pub mod paths;   // Emplacements des fichiers
pub mod state;   // Flag de clic et pièce courante (data.ini)

pub use app::App;
pub use error::{Result, WidgetError};
