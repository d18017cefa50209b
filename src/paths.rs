// ============================================================================
// Module : paths
// ============================================================================
// Emplacements des fichiers persistants, injectés à la construction
//
// Aucun chemin global : l'orchestrateur reçoit un Paths, ce qui permet aux
// tests de pointer vers un répertoire temporaire.
// ============================================================================

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.ini";
pub const DATA_FILE: &str = "data.ini";
pub const CACHE_FILE: &str = "last_fetch.json";

/// Nom du répertoire de l'application (config et logs)
pub const APP_DIR: &str = "waybar-crypto";

/// Fichiers utilisés par une invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Liste de surveillance (config.ini)
    pub config: PathBuf,

    /// État persistant : flag de clic + pièce courante (data.ini)
    pub data: PathBuf,

    /// Dernière réponse brute de l'API (last_fetch.json)
    pub cache: PathBuf,
}

impl Paths {
    /// Tous les fichiers dans un même répertoire
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config: dir.join(CONFIG_FILE),
            data: dir.join(DATA_FILE),
            cache: dir.join(CACHE_FILE),
        }
    }

    /// Répertoire par défaut : ~/.config/waybar-crypto sur Linux
    ///
    /// Retombe sur le répertoire courant si la plateforme n'en fournit pas.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Écrit un fichier en remplaçant l'ancien d'un seul coup
///
/// CONCEPT : écriture atomique
/// - On écrit d'abord dans un fichier voisin (même système de fichiers)
/// - Puis rename() remplace la cible : soit l'ancien contenu, soit le nouveau
/// - En cas d'échec, le fichier temporaire est supprimé et la cible intacte
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
