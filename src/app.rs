// ============================================================================
// Structure : App (orchestrateur)
// ============================================================================
// Une invocation = un passage complet :
//
// 1. ConfigStore::load          config.ini
// 2. CycleState::open           data.ini, lecture du flag de clic
// 3. QuoteCache::fetch          clic => snapshot, sinon API + sauvegarde
// 4. CycleState::advance_on_click  avance (cycle) et remet le flag à false
// 5. format::render             une pièce (cycle) ou toutes (show_all)
//
// Toute erreur remonte jusqu'ici et devient une OutputEnvelope :
// Waybar reçoit toujours un JSON valide.
//
// Pas de verrou entre processus : deux invocations simultanées (tick de
// polling + clic) se partagent data.ini et last_fetch.json, le dernier
// qui écrit gagne.
// ============================================================================

use tracing::{error, info, warn};

use crate::api::QuoteSource;
use crate::cache::QuoteCache;
use crate::config::ConfigStore;
use crate::error::{Result, WidgetError};
use crate::format::render;
use crate::models::{Config, DisplayMode, OutputEnvelope, RawQuoteDoc};
use crate::paths::Paths;
use crate::state::CycleState;

pub const CYCLE_TOOLTIP: &str = "Cycle mode: press to view other coins";
pub const SHOW_ALL_TOOLTIP: &str = "Show all mode: shows all coins";

/// Orchestrateur : fichiers injectés + source de cotations
pub struct App {
    paths: Paths,
    source: Box<dyn QuoteSource>,

    /// Valeur de COINMARKETCAP_API_KEY (lue par l'appelant)
    env_api_key: Option<String>,
}

impl App {
    pub fn new(paths: Paths, source: Box<dyn QuoteSource>, env_api_key: Option<String>) -> Self {
        Self {
            paths,
            source,
            env_api_key,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Exécute une invocation ; n'échoue jamais, l'erreur est dans l'enveloppe
    pub async fn run(&self) -> OutputEnvelope {
        match self.try_run().await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(reason = e.reason(), error = %e, "Invocation failed");
                OutputEnvelope::from_error(&e)
            }
        }
    }

    async fn try_run(&self) -> Result<OutputEnvelope> {
        let config = ConfigStore::load_with_env_key(&self.paths.config, self.env_api_key.clone())?;
        let mut state = CycleState::open(&self.paths.data)?;
        let clicked = state.click_pending();
        info!(clicked, mode = %config.display_mode, "Starting invocation");

        let cache = QuoteCache::new(&*self.source, &self.paths.cache);
        let doc = match cache.fetch(&config, clicked).await {
            Ok(doc) => doc,
            Err(e) => {
                // Le clic est consommé même sans données, sinon toutes les
                // invocations suivantes resteraient bloquées sur le cache
                if clicked {
                    if let Err(clear_err) = state.consume_click() {
                        warn!(error = %clear_err, "Could not clear click flag");
                    }
                }
                return Err(e);
            }
        };

        let advance = state.advance_on_click(&config, clicked)?;

        match config.display_mode {
            DisplayMode::Cycle => {
                let coin = advance
                    .coin
                    .ok_or_else(|| WidgetError::config("no coins configured"))?;
                let text = render_coin(&config, &doc, &coin)?;
                Ok(OutputEnvelope::new(text, CYCLE_TOOLTIP))
            }
            DisplayMode::ShowAll => {
                let mut text = String::new();
                for entry in &config.entries {
                    text.push_str(&render_coin(&config, &doc, &entry.name)?);
                }
                Ok(OutputEnvelope::new(text, SHOW_ALL_TOOLTIP))
            }
        }
    }
}

fn render_coin(config: &Config, doc: &RawQuoteDoc, coin: &str) -> Result<String> {
    let entry = config
        .entry(coin)
        .ok_or_else(|| WidgetError::config(format!("unknown coin {}", coin)))?;
    let quote = doc.quote_for(&entry.api_symbol(), &config.currency)?;
    Ok(render(
        entry,
        &quote,
        &config.display_fields,
        &config.currency_symbol,
    ))
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Scénarios complets sur un répertoire temporaire avec une fausse source
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QuoteRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeSource {
        body: serde_json::Value,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn get_json(&self, _request: &QuoteRequest) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    fn body() -> serde_json::Value {
        json!({
            "data": {
                "BTC": { "quote": { "USD": {
                    "price": 43123.456,
                    "volume_24h": 1000.4,
                    "percent_change_1h": 0.5,
                    "percent_change_24h": -2.345,
                    "percent_change_7d": 10
                } } },
                "ETH": { "quote": { "USD": {
                    "price": 2250.1,
                    "volume_24h": 500,
                    "percent_change_1h": -0.25,
                    "percent_change_24h": 3.1,
                    "percent_change_7d": -1
                } } }
            }
        })
    }

    fn write_config(dir: &Path, mode: &str, display: &str) {
        let text = format!(
            "[general]\n\
             currency = usd\n\
             currency_symbol = $\n\
             display = {display}\n\
             mode = {mode}\n\
             api_key = key\n\
             [BTC]\n\
             icon = B\n\
             price_precision = 2\n\
             change_precision = 1\n\
             volume_precision = 0\n\
             [ETH]\n\
             icon = E\n\
             price_precision = 0\n\
             change_precision = 2\n\
             volume_precision = 0\n"
        );
        fs::write(dir.join("config.ini"), text).unwrap();
    }

    fn app(dir: &Path) -> (App, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FakeSource {
            body: body(),
            calls: calls.clone(),
        };
        (App::new(Paths::in_dir(dir), Box::new(source), None), calls)
    }

    /// Ce que fait `waybar-crypto click`
    fn click(app: &App) {
        CycleState::open(&app.paths().data)
            .unwrap()
            .mark_clicked()
            .unwrap();
    }

    #[tokio::test]
    async fn test_poll_fetches_and_shows_current() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "cycle", "price");
        let (app, calls) = app(dir.path());

        let envelope = app.run().await;

        assert_eq!(envelope.text, "B $43123.46 ");
        assert_eq!(envelope.tooltip, CYCLE_TOOLTIP);
        assert_eq!(envelope.class, "crypto");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(app.paths().cache.exists());
    }

    #[tokio::test]
    async fn test_click_cycles_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "cycle", "price");
        let (app, calls) = app(dir.path());

        // Un premier passage remplit le cache
        app.run().await;
        fs::write(
            &app.paths().data,
            "[general]\non_click = true\n[cycle]\ncurrent = BTC\n",
        )
        .unwrap();

        let envelope = app.run().await;

        assert_eq!(envelope.text, "E $2250 ");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let state = CycleState::open(&app.paths().data).unwrap();
        assert_eq!(state.record().current_coin.as_deref(), Some("ETH"));
        assert!(!state.click_pending());

        // Le passage suivant refait un appel et garde ETH
        let envelope = app.run().await;
        assert_eq!(envelope.text, "E $2250 ");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_show_all_concatenates_in_config_order() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "show_all", "price,change24h");
        let (app, _) = app(dir.path());

        let envelope = app.run().await;

        assert_eq!(envelope.text, "B $43123.46 24h:-2.3% E $2250 24h:+3.10% ");
        assert_eq!(envelope.tooltip, SHOW_ALL_TOOLTIP);
    }

    #[tokio::test]
    async fn test_show_all_click_clears_flag() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "show_all", "price");
        let (app, calls) = app(dir.path());

        app.run().await;
        click(&app);
        app.run().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!CycleState::open(&app.paths().data).unwrap().click_pending());
    }

    #[tokio::test]
    async fn test_click_without_cache_is_local_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "cycle", "price");
        let (app, calls) = app(dir.path());
        click(&app);

        let envelope = app.run().await;

        assert!(envelope.text.starts_with("crypto: "));
        assert_eq!(envelope.text, "crypto: local fetch error");
        assert!(envelope.tooltip.starts_with("no cached data"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Le clic est consommé : le passage suivant refait un appel
        assert!(!CycleState::open(&app.paths().data).unwrap().click_pending());
        let envelope = app.run().await;
        assert_eq!(envelope.text, "B $43123.46 ");
    }

    #[tokio::test]
    async fn test_config_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "rotate", "price");
        let (app, calls) = app(dir.path());

        let envelope = app.run().await;

        assert_eq!(envelope.text, "crypto: parse config error");
        assert_eq!(envelope.tooltip, "invalid display mode: rotate");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_env_key_reaches_request() {
        struct KeyCheck;

        #[async_trait]
        impl QuoteSource for KeyCheck {
            async fn get_json(&self, request: &QuoteRequest) -> Result<serde_json::Value> {
                assert_eq!(request.headers[0].1, "from-env");
                Ok(body())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "cycle", "price");
        let app = App::new(
            Paths::in_dir(dir.path()),
            Box::new(KeyCheck),
            Some("from-env".to_string()),
        );

        assert_eq!(app.run().await.text, "B $43123.46 ");
    }
}
