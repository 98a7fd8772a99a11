//! Scanner, overlay and update-check configuration blocks
//!
//! These are embedded in the persisted app config. Every field has a serde
//! default so older or hand-edited settings files keep loading.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Scanner
// ─────────────────────────────────────────────────────────────────────────────

/// How a signature match is turned into a data address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    /// `match + operand_offset + 4 + disp32` (x64 RIP-relative operand)
    #[default]
    RipRelative,
    /// Absolute 64-bit address stored at `match + operand_offset`
    Absolute,
}

/// Code signature locating one block of game data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// Name used in logs and errors
    pub name: String,
    /// IDA-style byte pattern, `??` for wildcards
    pub pattern: String,
    #[serde(default)]
    pub kind: SignatureKind,
    /// Byte index of the address operand inside the match
    #[serde(default)]
    pub operand_offset: usize,
    /// Follow one pointer after resolving the operand
    #[serde(default)]
    pub deref: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Executable name of the game process (case-insensitive)
    pub process_name: String,
    /// Milliseconds between scan ticks
    pub tick_interval_ms: u64,
    pub actor_table: SignatureConfig,
    pub camera: SignatureConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            process_name: "ffxiv_dx11.exe".to_string(),
            tick_interval_ms: 100,
            actor_table: SignatureConfig {
                name: "actorTable".to_string(),
                pattern: "48 8D 0D ?? ?? ?? ?? E8 ?? ?? ?? ?? 44 0F B6 83".to_string(),
                kind: SignatureKind::RipRelative,
                operand_offset: 3,
                deref: false,
            },
            camera: SignatureConfig {
                name: "camera".to_string(),
                pattern: "48 8B 05 ?? ?? ?? ?? 48 89 4C 24 ?? 4C 8D 4C 24".to_string(),
                kind: SignatureKind::RipRelative,
                operand_offset: 3,
                deref: true,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay
// ─────────────────────────────────────────────────────────────────────────────

/// Thresholds and surface size used by the overlay projector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Maximum distance (game units) for `WhenClose`
    pub close_range: f32,
    /// Half-angle of the look-at cone in degrees
    pub look_at_cone_deg: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Print distances with a decimal comma
    pub european_number_format: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            close_range: 20.0,
            look_at_cone_deg: 15.0,
            viewport_width: 1920,
            viewport_height: 1080,
            european_number_format: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update check
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub enabled: bool,
    /// GitHub `owner/repo` whose latest release is compared
    pub repository: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repository: "ffradar/ffradar".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_config_toml_defaults() {
        let config: ScannerConfig = toml::from_str(r#"process_name = "game.exe""#).unwrap();
        assert_eq!(config.process_name, "game.exe");
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.actor_table.name, "actorTable");
    }

    #[test]
    fn test_signature_toml() {
        let toml = r#"
name = "camera"
pattern = "48 8B 05 ?? ?? ?? ??"
kind = "absolute"
operand_offset = 3
deref = true
"#;
        let sig: SignatureConfig = toml::from_str(toml).unwrap();
        assert_eq!(sig.kind, SignatureKind::Absolute);
        assert_eq!(sig.operand_offset, 3);
        assert!(sig.deref);
    }

    #[test]
    fn test_overlay_config_partial() {
        let config: OverlayConfig = toml::from_str("close_range = 35.5").unwrap();
        assert_eq!(config.close_range, 35.5);
        assert_eq!(config.viewport_width, 1920);
        assert!(!config.european_number_format);

        let config: OverlayConfig = toml::from_str("european_number_format = true").unwrap();
        assert!(config.european_number_format);
        assert_eq!(config.close_range, 20.0);
    }
}
