// ============================================================================
// Module : cache (QuoteCache)
// ============================================================================
// Décide entre appel distant et dernier snapshot
//
// - use_cache = false : un appel à l'API, puis sauvegarde du corps brut
//   dans last_fetch.json avant de le retourner
// - use_cache = true  : relit last_fetch.json, aucun appel réseau
//
// Le snapshot n'expire jamais : seule une invocation sans clic le remplace.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::api::{latest_quotes_request, QuoteSource};
use crate::error::{Result, WidgetError};
use crate::models::{Config, RawQuoteDoc};
use crate::paths::write_atomic;

/// Dernière réponse sauvegardée et son heure de capture (mtime du fichier)
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub doc: RawQuoteDoc,
    pub captured_at: Option<DateTime<Utc>>,
}

/// Politique fetch/cache autour d'une QuoteSource
pub struct QuoteCache<'a> {
    source: &'a dyn QuoteSource,
    path: PathBuf,
}

impl<'a> QuoteCache<'a> {
    pub fn new(source: &'a dyn QuoteSource, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retourne le document de cotations, frais ou en cache
    #[instrument(skip(self, config), fields(cache = %self.path.display()))]
    pub async fn fetch(&self, config: &Config, use_cache: bool) -> Result<RawQuoteDoc> {
        if use_cache {
            let snapshot = self.load_snapshot()?;
            match snapshot.captured_at {
                Some(at) => info!(
                    captured_at = %at,
                    age_secs = (Utc::now() - at).num_seconds(),
                    "Using cached snapshot"
                ),
                None => info!("Using cached snapshot"),
            }
            return Ok(snapshot.doc);
        }

        self.fetch_remote(config).await
    }

    async fn fetch_remote(&self, config: &Config) -> Result<RawQuoteDoc> {
        let request = latest_quotes_request(config);
        debug!(symbols = %config.api_symbols(), currency = %config.currency, "Fetching latest quotes");

        let body = self.source.get_json(&request).await?;

        // Vérifie la forme avant de sauvegarder : un corps inattendu ne
        // doit pas remplacer un bon snapshot
        let doc: RawQuoteDoc = serde_json::from_value(body.clone()).map_err(|e| {
            WidgetError::fetch(format!("Unexpected API response shape. {}", e))
        })?;

        self.save_snapshot(&body)?;
        info!(coins = doc.data.len(), "Fetched and cached latest quotes");
        Ok(doc)
    }

    fn save_snapshot(&self, body: &serde_json::Value) -> Result<()> {
        let save_error = |detail: String| {
            WidgetError::fetch(format!(
                "Could not save fetch to {}. {}",
                self.path.display(),
                detail
            ))
        };

        let bytes = serde_json::to_vec(body).map_err(|e| save_error(e.to_string()))?;
        write_atomic(&self.path, &bytes).map_err(|e| save_error(e.to_string()))
    }

    /// Relit le dernier snapshot ; absent ou illisible => "no cached data"
    pub fn load_snapshot(&self) -> Result<CachedSnapshot> {
        let no_cache = |detail: String| WidgetError::cache(format!("no cached data: {}", detail));

        let bytes = fs::read(&self.path).map_err(|e| {
            warn!(error = %e, "Cached snapshot not readable");
            no_cache(e.to_string())
        })?;
        let doc: RawQuoteDoc = serde_json::from_slice(&bytes).map_err(|e| no_cache(e.to_string()))?;

        let captured_at = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(CachedSnapshot { doc, captured_at })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
