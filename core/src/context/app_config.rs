//! Persisted application settings
//!
//! Loaded once at startup and saved once at shutdown through `confy`
//! (`ffradar/settings.toml` in the platform config directory).

use ffradar_types::{OverlayConfig, ScannerConfig, UpdateConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::presets::PresetStore;

pub const APP_NAME: &str = "ffradar";
pub const CONFIG_NAME: &str = "settings";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub overlay: OverlayConfig,
    pub updates: UpdateConfig,
    pub presets: PresetStore,
}

/// confy-backed persistence for [`AppConfig`]
pub trait AppConfigExt: Sized {
    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable
    fn load() -> Self;

    fn save(&self) -> Result<(), confy::ConfyError>;

    fn config_path() -> Option<std::path::PathBuf>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        let mut config: AppConfig = match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                AppConfig::default()
            }
        };
        config.presets.normalize();
        info!(presets = config.presets.len(), active = ?config.presets.active_name(), "Settings loaded");
        config
    }

    fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    fn config_path() -> Option<std::path::PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffradar_types::{ActorFilter, ActorFilterPreset, ActorType};

    #[test]
    fn test_default_config_has_one_preset() {
        let config = AppConfig::default();
        assert_eq!(config.presets.len(), 1);
        assert_eq!(config.scanner.process_name, "ffxiv_dx11.exe");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut preset = ActorFilterPreset::new("Hunt");
        preset.show_only_matching = true;
        preset.filters.push(ActorFilter {
            match_type: ActorType::Treasure,
            use_match_type: true,
            ..Default::default()
        });

        let mut config = AppConfig {
            presets: PresetStore::from_parts(vec![preset], Some("Hunt".to_string())),
            ..Default::default()
        };
        config.overlay.close_range = 42.0;

        let text = toml::to_string(&config).unwrap();
        let loaded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_toml_round_trip_without_active_preset() {
        let config = AppConfig {
            presets: PresetStore::from_parts(
                vec![ActorFilterPreset::new("Default"), ActorFilterPreset::new("Beta")],
                None,
            ),
            ..Default::default()
        };

        let text = toml::to_string(&config).unwrap();
        let loaded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded.presets.active_name(), None);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let loaded: AppConfig = toml::from_str(
            r#"
[overlay]
close_range = 10.0
"#,
        )
        .unwrap();
        assert_eq!(loaded.overlay.close_range, 10.0);
        assert_eq!(loaded.overlay.viewport_width, 1920);
        assert_eq!(loaded.presets.active_name(), Some("Default"));
        assert!(loaded.updates.enabled);
    }
}
