// ============================================================================
// Structure : Config
// ============================================================================
// Configuration validée du widget (produite par config::ConfigStore)
//
// CONCEPTS RUST :
// 1. Enums pour les valeurs fermées (mode d'affichage, champs)
// 2. BTreeSet : ensemble des champs demandés (l'ordre de rendu vient de
//    DisplayField::ALL, pas de la config)
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::WatchlistEntry;

/// Mode d'affichage du widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Une pièce à la fois, la suivante à chaque clic
    Cycle,

    /// Toutes les pièces concaténées dans l'ordre de la config
    ShowAll,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Cycle => "cycle",
            DisplayMode::ShowAll => "show_all",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    /// Insensible à la casse : "Cycle", "SHOW_ALL", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cycle" => Ok(DisplayMode::Cycle),
            "show_all" => Ok(DisplayMode::ShowAll),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Champ affichable pour une pièce
///
/// L'ordre des variants est l'ordre de rendu : le BTreeSet trie dessus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisplayField {
    Price,
    Volume24h,
    Change1h,
    Change24h,
    Change7d,
}

impl DisplayField {
    pub const ALL: [DisplayField; 5] = [
        DisplayField::Price,
        DisplayField::Volume24h,
        DisplayField::Change1h,
        DisplayField::Change24h,
        DisplayField::Change7d,
    ];

    /// Nom utilisé dans la clé `display` de config.ini
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayField::Price => "price",
            DisplayField::Volume24h => "volume24h",
            DisplayField::Change1h => "change1h",
            DisplayField::Change24h => "change24h",
            DisplayField::Change7d => "change7d",
        }
    }
}

impl FromStr for DisplayField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Ensemble des champs à afficher
///
/// Un ensemble vide vaut "prix seulement".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayFields(BTreeSet<DisplayField>);

impl DisplayFields {
    pub fn new(fields: impl IntoIterator<Item = DisplayField>) -> Self {
        Self(fields.into_iter().collect())
    }

    /// Le prix est affiché s'il est demandé, ou si rien n'est demandé
    pub fn shows(&self, field: DisplayField) -> bool {
        match field {
            DisplayField::Price => self.0.is_empty() || self.0.contains(&DisplayField::Price),
            other => self.0.contains(&other),
        }
    }
}

/// Configuration complète et validée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Pièces dans l'ordre du fichier
    pub entries: Vec<WatchlistEntry>,

    /// Code devise, en majuscules (ex: "EUR")
    pub currency: String,

    /// Symbole devise, tel quel (ex: "€")
    pub currency_symbol: String,

    pub display_fields: DisplayFields,

    pub display_mode: DisplayMode,

    /// Clé API résolue (variable d'environnement prioritaire)
    pub api_key: String,
}

impl Config {
    /// Retrouve une pièce par son nom de section
    pub fn entry(&self, name: &str) -> Option<&WatchlistEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Position d'une pièce dans la watchlist
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Symboles de toutes les pièces, en majuscules, séparés par des virgules
    pub fn api_symbols(&self) -> String {
        self.entries
            .iter()
            .map(WatchlistEntry::api_symbol)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mode_parsing() {
        assert_eq!("Cycle".parse::<DisplayMode>(), Ok(DisplayMode::Cycle));
        assert_eq!("SHOW_ALL".parse::<DisplayMode>(), Ok(DisplayMode::ShowAll));
        assert_eq!("rotate".parse::<DisplayMode>(), Err("rotate".to_string()));
    }

    #[test]
    fn test_empty_fields_show_price_only() {
        let fields = DisplayFields::default();
        assert!(fields.shows(DisplayField::Price));
        assert!(!fields.shows(DisplayField::Change24h));
        assert!(!fields.shows(DisplayField::Volume24h));
    }

    #[test]
    fn test_fields_without_price() {
        let fields = DisplayFields::new([DisplayField::Change7d]);
        assert!(!fields.shows(DisplayField::Price));
        assert!(fields.shows(DisplayField::Change7d));
    }


    #[test]
    fn test_api_symbols() {
        let config = Config {
            entries: vec![
                WatchlistEntry::new("btc", "B", 2, 2, 0),
                WatchlistEntry::new("ETH", "E", 2, 2, 0),
            ],
            currency: "USD".to_string(),
            currency_symbol: "$".to_string(),
            display_fields: DisplayFields::default(),
            display_mode: DisplayMode::Cycle,
            api_key: "key".to_string(),
        };
        assert_eq!(config.api_symbols(), "BTC,ETH");
        assert_eq!(config.position("ETH"), Some(1));
        assert!(config.entry("eth").is_none());
    }
}
