// ============================================================================
// Structure : OutputEnvelope
// ============================================================================
// Seul contrat de sortie vers Waybar : {"text", "tooltip", "class"}
// Construite à chaque invocation, jamais persistée.
// ============================================================================

use serde::Serialize;

use crate::error::WidgetError;

/// Classe CSS fixe, utilisable dans le style de Waybar
pub const CLASS_NAME: &str = "crypto";

/// Objet JSON écrit sur stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEnvelope {
    pub text: String,
    pub tooltip: String,
    pub class: &'static str,
}

impl OutputEnvelope {
    pub fn new(text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tooltip: tooltip.into(),
            class: CLASS_NAME,
        }
    }

    /// Enveloppe d'erreur : "crypto: <raison>" + détail en tooltip
    pub fn from_error(error: &WidgetError) -> Self {
        Self::new(format!("crypto: {}", error.reason()), error.to_string())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let envelope = OutputEnvelope::from_error(&WidgetError::cache("no cached data"));
        assert_eq!(envelope.text, "crypto: local fetch error");
        assert_eq!(envelope.tooltip, "no cached data");
        assert_eq!(envelope.class, "crypto");
    }

    #[test]
    fn test_json_shape() {
        let json = OutputEnvelope::new(" $42 ", "tip").to_json().unwrap();
        assert_eq!(json, r#"{"text":" $42 ","tooltip":"tip","class":"crypto"}"#);
    }
}
