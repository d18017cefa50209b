// ============================================================================
// Module : config (ConfigStore)
// ============================================================================
// Lit et valide config.ini
//
// [general]
// currency = usd
// currency_symbol = $
// display = price,change24h
// mode = cycle
// api_key = ...          (optionnel si COINMARKETCAP_API_KEY est défini)
//
// [BTC]
// icon =
// price_precision = 2
// change_precision = 2
// volume_precision = 0
//
// Toute section autre que [general] est une pièce, dans l'ordre du fichier.
// ============================================================================

use std::collections::HashSet;
use std::path::Path;

use ini::{Ini, ParseOption, Properties};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, WidgetError};
use crate::models::{Config, DisplayField, DisplayFields, DisplayMode, WatchlistEntry};

/// Variable d'environnement prioritaire sur `api_key`
pub const API_KEY_ENV: &str = "COINMARKETCAP_API_KEY";

/// Section réservée, jamais interprétée comme une pièce
pub const GENERAL_SECTION: &str = "general";

/// Précision maximale acceptée
///
/// rust_decimal garde 28 chiffres significatifs : un volume à 12 chiffres
/// plus 16 décimales tient encore sans troncature silencieuse.
const MAX_PRECISION: u32 = 16;

/// Options de parsing : valeurs brutes (icônes, symboles) sans échappement
pub(crate) fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Chargeur de configuration
pub struct ConfigStore;

impl ConfigStore {
    /// Charge la config ; la clé API de l'environnement prime sur le fichier
    pub fn load(path: &Path) -> Result<Config> {
        let env_key = std::env::var(API_KEY_ENV).ok();
        Self::load_with_env_key(path, env_key)
    }

    /// Comme `load`, avec la valeur de la variable d'environnement injectée
    #[instrument(skip(path, env_key), fields(path = %path.display(), env_key = env_key.is_some()))]
    pub fn load_with_env_key(path: &Path, env_key: Option<String>) -> Result<Config> {
        let ini = Ini::load_from_file_opt(path, parse_options()).map_err(|e| {
            WidgetError::config(format!(
                "Error while trying to read config file {}\nError: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_ini(&ini, env_key)?;
        info!(
            coins = config.entries.len(),
            mode = %config.display_mode,
            currency = %config.currency,
            "Config loaded"
        );
        Ok(config)
    }

    /// Valide un document INI déjà parsé
    pub fn from_ini(ini: &Ini, env_key: Option<String>) -> Result<Config> {
        let general = ini
            .section(Some(GENERAL_SECTION))
            .ok_or_else(|| WidgetError::config("missing section [general]"))?;

        let api_key = resolve_api_key(general, env_key)?;
        let currency = required(general, GENERAL_SECTION, "currency")?.to_uppercase();
        let currency_symbol = required(general, GENERAL_SECTION, "currency_symbol")?.to_string();
        let display_fields = parse_display_fields(general.get("display").unwrap_or(""));

        let mode = required(general, GENERAL_SECTION, "mode")?;
        let display_mode = mode
            .parse::<DisplayMode>()
            .map_err(|value| WidgetError::config(format!("invalid display mode: {}", value)))?;

        let entries = parse_entries(ini)?;

        if display_mode == DisplayMode::Cycle && entries.is_empty() {
            return Err(WidgetError::config("no coins configured"));
        }

        Ok(Config {
            entries,
            currency,
            currency_symbol,
            display_fields,
            display_mode,
            api_key,
        })
    }
}

/// Ordre de résolution : variable d'environnement, puis `api_key`
fn resolve_api_key(general: &Properties, env_key: Option<String>) -> Result<String> {
    // Présente, même vide, la variable l'emporte
    if let Some(key) = env_key {
        debug!("Using API key from environment");
        return Ok(key);
    }

    match general.get("api_key") {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(WidgetError::config("missing api key")),
    }
}

fn required<'a>(props: &'a Properties, section: &str, key: &str) -> Result<&'a str> {
    props
        .get(key)
        .ok_or_else(|| WidgetError::config(format!("missing key {} in section [{}]", key, section)))
}

/// Liste séparée par des virgules ; vide ou absente => prix seulement
///
/// Les noms inconnus sont ignorés (avec un warning dans les logs).
fn parse_display_fields(raw: &str) -> DisplayFields {
    let mut fields = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<DisplayField>() {
            Ok(field) => fields.push(field),
            Err(unknown) => warn!(field = %unknown, "Ignoring unknown display field"),
        }
    }

    if fields.is_empty() {
        fields.push(DisplayField::Price);
    }
    DisplayFields::new(fields)
}

/// Toutes les sections sauf [general], dans l'ordre du fichier
///
/// Chaque pièce est validée dans l'ordre ; la première erreur rencontrée
/// est retournée telle quelle.
fn parse_entries(ini: &Ini) -> Result<Vec<WatchlistEntry>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for (section, props) in ini.iter() {
        // None : clés hors section, ignorées
        let Some(name) = section else { continue };
        if name == GENERAL_SECTION {
            continue;
        }

        if !seen.insert(name.to_string()) {
            return Err(WidgetError::config(format!("duplicate coin section [{}]", name)));
        }

        entries.push(parse_entry(name, props)?);
    }

    Ok(entries)
}

fn parse_entry(name: &str, props: &Properties) -> Result<WatchlistEntry> {
    let price_precision = parse_precision(props, name, "price")?;
    let change_precision = parse_precision(props, name, "change")?;
    let volume_precision = parse_precision(props, name, "volume")?;
    let icon = required(props, name, "icon")?;

    Ok(WatchlistEntry::new(
        name,
        icon,
        price_precision,
        change_precision,
        volume_precision,
    ))
}

/// Lit `<kind>_precision` : entier, positif ou nul
fn parse_precision(props: &Properties, coin: &str, kind: &str) -> Result<u32> {
    let invalid =
        |detail: String| WidgetError::config(format!("invalid {} precision for {}: {}", kind, coin, detail));

    let key = format!("{}_precision", kind);
    let raw = props
        .get(&key)
        .ok_or_else(|| invalid(format!("missing key {}", key)))?
        .trim();

    let value: i64 = raw
        .parse()
        .map_err(|e| invalid(format!("{:?} is not an integer ({})", raw, e)))?;

    if value < 0 {
        return Err(invalid("precision must be positive".to_string()));
    }
    if value > i64::from(MAX_PRECISION) {
        return Err(invalid(format!("precision must be at most {}", MAX_PRECISION)));
    }

    Ok(value as u32)
}

// ============================================================================
// Tests unitaires
// ============================================================================
