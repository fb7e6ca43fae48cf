//! Powerup catalog loading.
//!
//! A catalog file replaces the built-in catalog wholesale:
//!
//! ```toml
//! [[powerups]]
//! id = "player_speed"
//! name = "Swift Boots"
//! modifiers = [{ target = "speed", op = "multiply", amount = 1.5 }]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lastrealm_gameplay::{CatalogError, PowerupCatalog, PowerupDef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// File not found.
    #[error("Powerup catalog not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read powerup catalog: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse powerup catalog: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The entries do not form a valid catalog.
    #[error("Invalid powerup catalog: {0}")]
    Invalid(#[from] CatalogError),
}

/// Result type for catalog loading.
pub type CatalogLoadResult<T> = Result<T, CatalogLoadError>;

/// A powerup catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Every powerup the run may offer.
    pub powerups: Vec<PowerupDef>,
}

/// Reads and validates a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> CatalogLoadResult<PowerupCatalog> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogLoadError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let file: CatalogFile = toml::from_str(&content)?;
    let catalog = PowerupCatalog::from_entries(file.powerups)?;
    info!("Loaded {} powerups from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Catalog from `path`, or the built-in catalog when there is no path or the
/// file cannot be used.
pub fn catalog_or_builtin(path: Option<&Path>) -> PowerupCatalog {
    let Some(path) = path else {
        return PowerupCatalog::builtin();
    };
    load_catalog(path).unwrap_or_else(|e| {
        warn!("{e}, using built-in powerups");
        PowerupCatalog::builtin()
    })
}
