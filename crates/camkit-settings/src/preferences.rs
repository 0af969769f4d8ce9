//! Persistable user preferences.
//!
//! Captures the bridge values worth keeping between sessions. Files are
//! JSON or TOML, chosen by extension. Missing fields fall back to their
//! defaults so older preference files keep loading after new fields are
//! added.

use crate::bridge::{FlagKey, ScalarKey, SettingsBridge};
use crate::error::{SettingsError, SettingsResult};
use camkit_core::{BoundaryMode, Units, DEFAULT_REFRESH_HZ};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// User preferences persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Active unit system.
    pub unit: Units,
    /// Boundary interpretation mode.
    pub boundary_mode: BoundaryMode,
    /// Run the preview refresh callback during generation.
    pub show_progress_preview: bool,
    /// Build collision geometry for generation runs.
    pub collision_detection: bool,
    /// Upper bound on progress refresh side effects per second.
    pub progress_max_hz: f64,
    /// Clearance height for drop-style vertical retracts.
    pub safety_height: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            unit: Units::Mm,
            boundary_mode: BoundaryMode::Inside,
            show_progress_preview: false,
            collision_detection: false,
            progress_max_hz: DEFAULT_REFRESH_HZ,
            safety_height: 5.0,
        }
    }
}

impl Preferences {
    /// Load preferences from a JSON or TOML file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let preferences: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            ));
        };

        debug!(path = %path.display(), "loaded preferences");
        Ok(preferences)
    }

    /// Save preferences to a JSON or TOML file.
    ///
    /// The parent directory is created when it does not exist yet.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(format!("TOML serialization: {}", e)))?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            ));
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "saved preferences");
        Ok(())
    }

    /// The per-user preferences file location.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no user configuration directory".to_string())
        })?;
        path.push("camkit");
        path.push("preferences.json");
        Ok(path)
    }

    /// Push these preferences into a bridge.
    pub fn apply_to(&self, bridge: &mut SettingsBridge) {
        bridge.set_unit(self.unit);
        bridge.set_boundary_mode(self.boundary_mode);
        bridge.set_flag(FlagKey::ShowProgressPreview, self.show_progress_preview);
        bridge.set_flag(FlagKey::CollisionDetection, self.collision_detection);
        bridge.set_scalar(ScalarKey::ProgressMaxHz, self.progress_max_hz);
        bridge.set_scalar(ScalarKey::SafetyHeight, self.safety_height);
    }

    /// Snapshot the persistable values out of a bridge.
    pub fn capture_from(bridge: &SettingsBridge) -> Self {
        Self {
            unit: bridge.unit(),
            boundary_mode: bridge.boundary_mode(),
            show_progress_preview: bridge.flag(FlagKey::ShowProgressPreview),
            collision_detection: bridge.flag(FlagKey::CollisionDetection),
            progress_max_hz: bridge.scalar(ScalarKey::ProgressMaxHz),
            safety_height: bridge.scalar(ScalarKey::SafetyHeight),
        }
    }
}
