// ============================================================================
// waybar-crypto - Point d'entrée
// ============================================================================
// Deux usages depuis la config Waybar :
//
// "custom/crypto": {
//     "exec": "waybar-crypto",
//     "on-click": "waybar-crypto click && pkill -RTMIN+9 waybar",
//     "return-type": "json",
//     "signal": 9,
//     "interval": 600
// }
//
// - sans argument : une invocation, un objet JSON sur stdout
// - `click`       : arme le flag de clic pour l'invocation suivante
// ============================================================================

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use waybar_crypto::api::CoinMarketCapClient;
use waybar_crypto::config::API_KEY_ENV;
use waybar_crypto::models::OutputEnvelope;
use waybar_crypto::paths::{Paths, APP_DIR};
use waybar_crypto::state::CycleState;
use waybar_crypto::{App, WidgetError};

/// Widget Waybar pour les cotations crypto
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Répertoire contenant config.ini, data.ini et last_fetch.json
    #[arg(long, env = "WAYBAR_CRYPTO_DIR")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Marque l'invocation suivante comme déclenchée par un clic
    Click,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// stdout est réservé au JSON lu par Waybar : les logs vont dans un fichier
//
// - Linux : ~/.local/share/waybar-crypto/logs/waybar-crypto.log
// - RUST_LOG=waybar_crypto=debug pour plus de détails
// ============================================================================

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "waybar-crypto.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waybar_crypto=info,warn".into()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    debug!(?log_dir, "Logging initialised");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialise logging: {:#}", e);
    });

    let dir = cli.dir.unwrap_or_else(Paths::default_dir);
    let paths = Paths::in_dir(&dir);
    info!(dir = %dir.display(), command = ?cli.command, "waybar-crypto starting");

    match cli.command {
        Some(Command::Click) => {
            let mut state = CycleState::open(&paths.data)?;
            state.mark_clicked().map_err(|e| {
                error!(error = %e, "Failed to set click flag");
                e
            })?;
            info!("Click flag set");
            Ok(())
        }
        None => {
            let envelope = render_once(paths);
            print_output(&envelope.to_json()?)
        }
    }
}

/// Une invocation complète ; toute erreur devient une enveloppe
fn render_once(paths: Paths) -> OutputEnvelope {
    let client = match CoinMarketCapClient::new() {
        Ok(client) => client,
        Err(e) => return OutputEnvelope::from_error(&e),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let e = WidgetError::fetch(format!("Could not start async runtime. {}", e));
            return OutputEnvelope::from_error(&e);
        }
    };

    let env_key = std::env::var(API_KEY_ENV).ok();
    let app = App::new(paths, Box::new(client), env_key);
    runtime.block_on(app.run())
}

/// Écrit l'objet JSON sans retour à la ligne final
///
/// Seul échec fatal du programme : stdout lui-même inutilisable.
fn print_output(output: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write to stdout")
}
