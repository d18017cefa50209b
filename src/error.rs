// ============================================================================
// Module : error
// ============================================================================
// Taxonomie des erreurs du widget
//
// Chaque composant retourne un Result<T, WidgetError>. Rien n'est rattrapé
// avant l'orchestrateur (app.rs), qui convertit l'erreur en enveloppe JSON :
// - reason() : catégorie courte, affichée dans la barre ("crypto: <reason>")
// - Display  : détail lisible, affiché dans le tooltip
// ============================================================================

use thiserror::Error;

/// Erreurs possibles pendant une invocation du widget
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Configuration invalide ou incomplète (fatale, pas de retry)
    #[error("{0}")]
    Config(String),

    /// Échec de l'appel distant : réseau, statut HTTP, corps illisible,
    /// ou échec de sauvegarde du snapshot
    #[error("{0}")]
    Fetch(String),

    /// Pas de snapshot exploitable pour une invocation déclenchée par un clic
    #[error("{0}")]
    Cache(String),

    /// Fichier d'état illisible ou mal formé
    #[error("{0}")]
    StateRead(String),

    /// Écriture du fichier d'état impossible (l'ancien état reste intact)
    #[error("{0}")]
    StateWrite(String),
}

impl WidgetError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn state_read(msg: impl Into<String>) -> Self {
        Self::StateRead(msg.into())
    }

    pub fn state_write(msg: impl Into<String>) -> Self {
        Self::StateWrite(msg.into())
    }

    /// Catégorie courte affichée dans la barre après "crypto: "
    pub fn reason(&self) -> &'static str {
        match self {
            WidgetError::Config(_) => "parse config error",
            WidgetError::Fetch(_) => "coinmarketcap error",
            WidgetError::Cache(_) => "local fetch error",
            WidgetError::StateRead(_) => "parse data error",
            WidgetError::StateWrite(_) => "write data file error",
        }
    }
}

/// Alias pratique pour les résultats du crate
pub type Result<T> = std::result::Result<T, WidgetError>;
