// ============================================================================
// Module : state (CycleState)
// ============================================================================
// État persistant entre deux invocations (data.ini)
//
// [general]
// on_click = true
//
// [cycle]
// current = ETH
//
// CONCEPT : flag "one-shot"
// - `click` met on_click = true (appelé par le on-click de Waybar)
// - l'invocation suivante l'observe, utilise le cache, avance éventuellement
//   la pièce courante, puis remet on_click = false
// - les deux clés sont écrites ensemble (écriture atomique) ou pas du tout
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::{debug, info, instrument};

use crate::config::parse_options;
use crate::error::{Result, WidgetError};
use crate::models::{Config, DisplayMode};
use crate::paths::write_atomic;

const GENERAL_SECTION: &str = "general";
const CYCLE_SECTION: &str = "cycle";
const ON_CLICK_KEY: &str = "on_click";
const CURRENT_KEY: &str = "current";

/// Contenu logique de data.ini
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleRecord {
    /// Pièce affichée en mode cycle (None : jamais écrite)
    pub current_coin: Option<String>,

    /// L'invocation en cours a été déclenchée par un clic
    pub click_pending: bool,
}

/// Résultat de advance_on_click
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Pièce sélectionnée (None seulement en show_all sans pièce)
    pub coin: Option<String>,

    /// L'état a été réécrit sur disque
    pub mutated: bool,
}

/// Accès à data.ini
pub struct CycleState {
    path: PathBuf,
    record: CycleRecord,

    /// Document complet, pour conserver les clés qu'on ne gère pas
    doc: Ini,
}

impl CycleState {
    /// Lit data.ini ; un fichier absent vaut un état vide
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let doc = match Ini::load_from_file_opt(path, parse_options()) {
            Ok(doc) => doc,
            Err(ini::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No state file yet, starting fresh");
                Ini::new()
            }
            Err(e) => {
                return Err(WidgetError::state_read(format!(
                    "Error while trying to read data file. {}",
                    e
                )))
            }
        };

        let record = read_record(&doc)?;
        debug!(?record, "State loaded");

        Ok(Self {
            path: path.to_path_buf(),
            record,
            doc,
        })
    }

    pub fn record(&self) -> &CycleRecord {
        &self.record
    }

    pub fn click_pending(&self) -> bool {
        self.record.click_pending
    }

    /// Pièce courante valide, sinon la première de la watchlist
    pub fn resolve_current(&self, config: &Config) -> Option<String> {
        self.record
            .current_coin
            .as_deref()
            .filter(|coin| config.position(coin).is_some())
            .or_else(|| config.entries.first().map(|entry| entry.name.as_str()))
            .map(str::to_string)
    }

    /// Consomme un clic
    ///
    /// - clic + cycle    : pièce suivante (modulo), flag remis à false
    /// - clic + show_all : flag remis à false, pièce inchangée
    /// - pas de clic     : rien n'est écrit
    pub fn advance_on_click(&mut self, config: &Config, was_clicked: bool) -> Result<Advance> {
        let current = self.resolve_current(config);

        if !was_clicked {
            return Ok(Advance {
                coin: current,
                mutated: false,
            });
        }

        let next = match config.display_mode {
            DisplayMode::Cycle => current.as_deref().and_then(|coin| {
                let index = config.position(coin)?;
                let next = (index + 1) % config.entries.len();
                Some(config.entries[next].name.clone())
            }),
            DisplayMode::ShowAll => current,
        };

        // En show_all on ne crée pas de section [cycle]
        let persisted_coin = match config.display_mode {
            DisplayMode::Cycle => next.clone(),
            DisplayMode::ShowAll => self.record.current_coin.clone(),
        };

        self.persist(CycleRecord {
            current_coin: persisted_coin,
            click_pending: false,
        })?;
        info!(coin = ?next, mode = %config.display_mode, "Click consumed");

        Ok(Advance {
            coin: next,
            mutated: true,
        })
    }

    /// Remet le flag à false sans toucher à la pièce courante
    pub fn consume_click(&mut self) -> Result<()> {
        if !self.record.click_pending {
            return Ok(());
        }
        self.persist(CycleRecord {
            current_coin: self.record.current_coin.clone(),
            click_pending: false,
        })
    }

    /// Arme le flag pour la prochaine invocation
    pub fn mark_clicked(&mut self) -> Result<()> {
        self.persist(CycleRecord {
            current_coin: self.record.current_coin.clone(),
            click_pending: true,
        })
    }

    /// Écrit l'enregistrement complet ; en cas d'échec, rien ne change
    /// (ni sur disque, ni en mémoire)
    fn persist(&mut self, record: CycleRecord) -> Result<()> {
        let mut doc = self.doc.clone();
        doc.with_section(Some(GENERAL_SECTION))
            .set(ON_CLICK_KEY, if record.click_pending { "true" } else { "false" });
        if let Some(coin) = &record.current_coin {
            doc.with_section(Some(CYCLE_SECTION))
                .set(CURRENT_KEY, coin.as_str());
        }

        let mut bytes = Vec::new();
        doc.write_to(&mut bytes)
            .and_then(|_| write_atomic(&self.path, &bytes))
            .map_err(|e| {
                WidgetError::state_write(format!(
                    "Error while trying to write data file {}. {}",
                    self.path.display(),
                    e
                ))
            })?;

        self.doc = doc;
        self.record = record;
        Ok(())
    }
}

fn read_record(doc: &Ini) -> Result<CycleRecord> {
    let click_pending = match doc.get_from(Some(GENERAL_SECTION), ON_CLICK_KEY) {
        Some(raw) => parse_bool(raw).ok_or_else(|| {
            WidgetError::state_read(format!("invalid {} value: {:?}", ON_CLICK_KEY, raw))
        })?,
        None => false,
    };

    let current_coin = doc
        .get_from(Some(CYCLE_SECTION), CURRENT_KEY)
        .filter(|coin| !coin.is_empty())
        .map(str::to_string);

    Ok(CycleRecord {
        current_coin,
        click_pending,
    })
}

/// Booléens INI : true/false, yes/no, on/off, 1/0 (insensible à la casse)
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
