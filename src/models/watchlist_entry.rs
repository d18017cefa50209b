// ============================================================================
// Structure : WatchlistEntry
// ============================================================================
// Une pièce de la liste de surveillance, telle que déclarée dans config.ini
//
// [BTC]
// icon =
// price_precision = 2
// change_precision = 2
// volume_precision = 0
//
// Créée au chargement de la config, jamais modifiée ensuite.
// ============================================================================

/// Une pièce surveillée avec ses précisions d'affichage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    /// Nom de la section (ex: "BTC"), clé unique dans la watchlist
    pub name: String,

    /// Icône affichée en tête du rendu
    pub icon: String,

    /// Nombre de décimales du prix
    pub price_precision: u32,

    /// Nombre de décimales des variations (1h, 24h, 7d)
    pub change_precision: u32,

    /// Nombre de décimales du volume 24h
    pub volume_precision: u32,
}

impl WatchlistEntry {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        price_precision: u32,
        change_precision: u32,
        volume_precision: u32,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            price_precision,
            change_precision,
            volume_precision,
        }
    }

    /// Symbole tel qu'attendu par l'API (toujours en majuscules)
    pub fn api_symbol(&self) -> String {
        self.name.to_uppercase()
    }
}
