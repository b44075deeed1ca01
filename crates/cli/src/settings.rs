use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use video_edit_core::shared::constants::{DEFAULT_CODEC, DEFAULT_PREVIEW_DELAY_MS};

/// Persistent editor preferences. Every field has a default so older or
/// partial files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub codec: String,
    pub preview_enabled: bool,
    pub preview_delay_ms: u64,
    /// Write a preview snapshot every N frames.
    pub snapshot_every: usize,
    pub preview_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            codec: DEFAULT_CODEC.to_string(),
            preview_enabled: true,
            preview_delay_ms: DEFAULT_PREVIEW_DELAY_MS,
            snapshot_every: 1,
            preview_path: None,
            font_path: None,
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("video-edit").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files give the defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring invalid settings in {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("No config directory on this platform")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Snapshot path, defaulting to a file in the system temp directory.
    pub fn preview_path(&self) -> PathBuf {
        self.preview_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("video-edit-preview.png"))
    }
}
