// Tunables for the whole sketch, loadable from a TOML file.
// Every section has defaults, so a partial file only overrides what it names.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
    pub wall: WallConfig,
    pub damage: DamageConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: 640, height: 480 }
    }
}

/// Distances are canvas pixels, frame counts are render frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Finger tip to MCP distance under which a finger counts as curled (lighter).
    pub lighter_curl: f32,
    /// Tighter curl threshold used by the fist test.
    pub fist_curl: f32,
    /// Thumb tip to index MCP distance under which the thumb is closed (fist).
    pub fist_thumb: f32,
    /// Thumb tip to index tip distance that counts as a pinch.
    pub pinch: f32,
    pub fist_detection_frames: u32,
    pub fist_loss_frames: u32,
    /// Vertical distance from the lower anchor up to the upper anchor.
    pub pump_offset: f32,
    /// How close the fist must come to an anchor to reach it.
    pub pump_reach: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            lighter_curl: 70.0,
            fist_curl: 55.0,
            fist_thumb: 45.0,
            pinch: 50.0,
            fist_detection_frames: 10,
            fist_loss_frames: 15,
            pump_offset: 250.0,
            pump_reach: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub rows: u32,
    pub columns: u32,
    pub brick_width: f32,
    pub brick_height: f32,
    /// Mortar between neighbouring columns. Rows stack flush.
    pub gap: f32,
    /// Maximum horizontal jitter per brick, in pixels either way.
    pub jitter: f32,
    pub boundary_thickness: f32,
    pub ceiling: bool,
    pub gravity: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            rows: 7,
            columns: 12,
            brick_width: 80.0,
            brick_height: 40.0,
            gap: 4.0,
            jitter: 2.0,
            boundary_thickness: 40.0,
            ceiling: false,
            gravity: 900.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Destroyed bricks needed before a fresh row drops in.
    pub blocks_to_spawn: u32,
    /// Total destroyed bricks that wins the game; no rows spawn past it.
    pub blocks_broken_to_win: u32,
    /// Breakage removed by one lighter frame.
    pub lighter_rate: u8,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self { blocks_to_spawn: 15, blocks_broken_to_win: 100, lighter_rate: 1 }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::ConfigWrite(e.to_string()))?;
        fs::write(path.as_ref(), content).map_err(|e| Error::ConfigWrite(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        let bad = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return bad("canvas size must be non-zero");
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return bad("camera size must be non-zero");
        }
        let g = &self.gesture;
        if g.fist_curl >= g.lighter_curl {
            return bad("gesture.fist_curl must be tighter than gesture.lighter_curl");
        }
        if g.fist_thumb >= g.lighter_curl {
            return bad("gesture.fist_thumb must be tighter than gesture.lighter_curl");
        }
        if g.fist_detection_frames == 0 {
            return bad("gesture.fist_detection_frames must be at least 1");
        }
        if g.pinch <= 0.0 {
            return bad("gesture.pinch must be positive");
        }
        if g.pump_reach <= 0.0 {
            return bad("gesture.pump_reach must be positive");
        }
        let w = &self.wall;
        if w.rows == 0 || w.columns == 0 {
            return bad("wall needs at least one row and one column");
        }
        if w.brick_width <= 0.0 || w.brick_height <= 0.0 {
            return bad("brick dimensions must be positive");
        }
        if w.gap <= 0.0 {
            return bad("wall.gap must be positive");
        }
        if self.damage.blocks_to_spawn == 0 {
            return bad("damage.blocks_to_spawn must be at least 1");
        }
        if self.damage.blocks_broken_to_win == 0 {
            return bad("damage.blocks_broken_to_win must be at least 1");
        }
        if self.damage.lighter_rate == 0 {
            return bad("damage.lighter_rate must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[wall]\nrows = 3\n").unwrap();
        assert_eq!(cfg.wall.rows, 3);
        assert_eq!(cfg.wall.columns, WallConfig::default().columns);
        assert_eq!(cfg.gesture, GestureConfig::default());
    }

    #[test]
    fn loose_fist_threshold_is_rejected() {
        let mut cfg = Config::default();
        cfg.gesture.fist_curl = cfg.gesture.lighter_curl + 1.0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_win_count_is_rejected() {
        let mut cfg = Config::default();
        cfg.damage.blocks_broken_to_win = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("blocks_broken_to_win"));
    }

    #[test]
    fn non_positive_distances_are_rejected() {
        let cases: [fn(&mut Config); 4] = [
            |c| c.gesture.pinch = 0.0,
            |c| c.gesture.pump_reach = -5.0,
            |c| c.wall.gap = 0.0,
            |c| c.wall.gap = -1.0,
        ];
        for edit in cases {
            let mut cfg = Config::default();
            edit(&mut cfg);
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))), "{cfg:?}");
        }
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("ice-wall-config-{}.toml", std::process::id()));
        let mut cfg = Config::default();
        cfg.damage.blocks_to_spawn = 7;
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
