//! Melee weapon stat loading.
//!
//! This module provides:
//! - Loading sword and spear base stats from a TOML file
//! - Validation on load
//! - Reload when the file changes on disk
//!
//! The loader is the run's [`WeaponStatSource`]. A missing entry is reported
//! as an error so the run falls back to built-in stats.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lastrealm_common::{LastRealmError, LastRealmResult};
use lastrealm_gameplay::{MeleeKind, WeaponBaseStats, WeaponStatSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during weapon stat loading.
#[derive(Debug, Error)]
pub enum WeaponLoadError {
    /// File not found.
    #[error("Weapon stat file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read weapon stat file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse weapon stat TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error.
    #[error("Weapon stat validation error: {0}")]
    ValidationError(String),

    /// The same weapon family is listed twice.
    #[error("Duplicate weapon entry: {0}")]
    DuplicateKind(&'static str),
}

/// Result type for weapon loading operations.
pub type WeaponLoadResult<T> = Result<T, WeaponLoadError>;

/// One weapon family's stats as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStatEntry {
    /// Weapon family.
    pub kind: MeleeKind,
    /// Base stats; missing fields take built-in values.
    #[serde(flatten)]
    pub stats: WeaponBaseStats,
}

impl WeaponStatEntry {
    /// Validates the entry.
    pub fn validate(&self) -> WeaponLoadResult<()> {
        if !self.stats.is_valid() {
            return Err(WeaponLoadError::ValidationError(format!(
                "{} has unusable stats: {:?}",
                self.kind.name(),
                self.stats
            )));
        }
        if self.stats.damage == 0.0 {
            warn!("{} deals no damage", self.kind.name());
        }
        Ok(())
    }
}

/// A weapon stat file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStatFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Entries in this file.
    pub weapons: Vec<WeaponStatEntry>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Loads melee base stats and serves them to runs.
#[derive(Debug)]
pub struct WeaponStatLoader {
    /// File the stats come from.
    path: PathBuf,
    /// Stats by weapon family.
    stats: HashMap<MeleeKind, WeaponBaseStats>,
    /// Modification time at the last load.
    loaded_at: Option<SystemTime>,
}

impl WeaponStatLoader {
    /// Creates an empty loader for `path`. Call [`Self::load`] to read it.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stats: HashMap::new(),
            loaded_at: None,
        }
    }

    /// Creates a loader and reads the file.
    pub fn open(path: impl AsRef<Path>) -> WeaponLoadResult<Self> {
        let mut loader = Self::new(path);
        loader.load()?;
        Ok(loader)
    }

    /// File backing this loader.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of weapon families loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Loaded stats for a family.
    #[must_use]
    pub fn get(&self, kind: MeleeKind) -> Option<&WeaponBaseStats> {
        self.stats.get(&kind)
    }

    /// Reads the file, replacing everything loaded before. On error the
    /// previous stats are kept.
    pub fn load(&mut self) -> WeaponLoadResult<usize> {
        if !self.path.exists() {
            return Err(WeaponLoadError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let file: WeaponStatFile = toml::from_str(&content)?;

        let mut stats = HashMap::new();
        for entry in file.weapons {
            entry.validate()?;
            if stats.insert(entry.kind, entry.stats).is_some() {
                return Err(WeaponLoadError::DuplicateKind(entry.kind.name()));
            }
        }

        self.loaded_at = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        self.stats = stats;
        info!("Loaded {} weapon stat entries from {}", self.stats.len(), self.path.display());
        Ok(self.stats.len())
    }

    /// Reloads if the file changed since the last load.
    pub fn reload_if_changed(&mut self) -> WeaponLoadResult<bool> {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        let changed = match (modified, self.loaded_at) {
            (Some(now), Some(before)) => now > before,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !changed {
            return Ok(false);
        }
        debug!("Weapon stat file changed, reloading");
        self.load()?;
        Ok(true)
    }
}

impl WeaponStatSource for WeaponStatLoader {
    fn base_stats(&self, kind: MeleeKind) -> LastRealmResult<WeaponBaseStats> {
        self.stats.get(&kind).copied().ok_or_else(|| {
            LastRealmError::Config(format!(
                "no {} entry in {}",
                kind.name(),
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastrealm_gameplay::resolve_base_stats;
    use tempfile::TempDir;

    const STATS: &str = r#"
version = "1.0.0"

[[weapons]]
kind = "sword"
damage = 12.0
radius = 100.0

[[weapons]]
kind = "spear"
damage = 8.0
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write stat file");
        path
    }

    #[test]
    fn test_load_stats() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "weapons.toml", STATS);

        let loader = WeaponStatLoader::open(&path).expect("stats load");
        assert_eq!(loader.len(), 2);

        let sword = loader.get(MeleeKind::Sword).expect("sword stats");
        assert!((sword.damage - 12.0).abs() < f32::EPSILON);
        assert!((sword.radius - 100.0).abs() < f32::EPSILON);
        // Unlisted fields fall back to built-ins.
        assert!((sword.hitbox_height - WeaponBaseStats::default().hitbox_height).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            WeaponStatLoader::open("/nonexistent/weapons.toml"),
            Err(WeaponLoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "broken.toml", "[[weapons]]\nkind = \"axe\"\n");
        assert!(matches!(
            WeaponStatLoader::open(&path),
            Err(WeaponLoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_stats_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "bad.toml", "[[weapons]]\nkind = \"sword\"\nhitbox_width = -5.0\n");
        assert!(matches!(
            WeaponStatLoader::open(&path),
            Err(WeaponLoadError::ValidationError(_))
        ));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(
            &dir,
            "dupe.toml",
            "[[weapons]]\nkind = \"spear\"\n\n[[weapons]]\nkind = \"spear\"\n",
        );
        assert!(matches!(
            WeaponStatLoader::open(&path),
            Err(WeaponLoadError::DuplicateKind("spear"))
        ));
    }

    #[test]
    fn test_failed_reload_keeps_previous_stats() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "weapons.toml", STATS);
        let mut loader = WeaponStatLoader::open(&path).expect("stats load");

        fs::write(&path, "not toml [").expect("overwrite");
        assert!(loader.load().is_err());
        assert_eq!(loader.len(), 2);
    }

    #[test]
    fn test_stat_source_fallback() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "sword_only.toml", "[[weapons]]\nkind = \"sword\"\ndamage = 4.0\n");
        let loader = WeaponStatLoader::open(&path).expect("stats load");

        assert!(loader.base_stats(MeleeKind::Spear).is_err());
        assert_eq!(resolve_base_stats(&loader, MeleeKind::Spear), WeaponBaseStats::default());
        assert!((resolve_base_stats(&loader, MeleeKind::Sword).damage - 4.0).abs() < f32::EPSILON);
    }
}
