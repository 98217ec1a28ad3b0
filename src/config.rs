use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::animation::WipeStyle;
use crate::cli::Cli;
use crate::error::{ShatterError, ShatterResult};
use crate::params::{AnimationParams, LOCAL_DELAY_MAX};

pub const DEFAULT_SEED: u64 = 0x5EED;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Startup configuration, read from JSON and overridden by CLI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShatterConfig {
    pub params: AnimationParams,
    pub wipe: WipeStyle,
    pub seed: u64,
    pub wireframe: bool,
    /// Drive `progress` from the camera azimuth
    pub follow_camera: bool,
    /// Keep the point light next to the camera
    pub light_follows_camera: bool,
    pub mesh_scale: f32,
    /// Render the shadow map from the light
    pub shadows: bool,
    /// Draw the shadow-receiving floor plane
    pub floor: bool,
    pub window: WindowConfig,
}

impl Default for ShatterConfig {
    fn default() -> Self {
        Self {
            params: AnimationParams::default(),
            wipe: WipeStyle::default(),
            seed: DEFAULT_SEED,
            wireframe: false,
            follow_camera: true,
            light_follows_camera: true,
            mesh_scale: 1.0,
            shadows: true,
            floor: true,
            window: WindowConfig::default(),
        }
    }
}

impl ShatterConfig {
    pub fn load(path: &Path) -> ShatterResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and sanitize a JSON document
    pub fn from_json(text: &str) -> ShatterResult<Self> {
        let raw: Self = serde_json::from_str(text).map_err(|e| ShatterError::config(e.to_string()))?;
        Ok(raw.sanitized())
    }

    /// Copy with every value forced into range
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.params = self.params.clamped();
        if out.params != self.params {
            log::warn!("Config parameters clamped to {:?}", out.params);
        }

        let defaults = WipeStyle::default();
        out.wipe.force = if self.wipe.force.is_finite() {
            self.wipe.force.max(0.0).min(LOCAL_DELAY_MAX)
        } else {
            defaults.force
        };
        for (channel, fallback) in out
            .wipe
            .color_a
            .iter_mut()
            .chain(out.wipe.color_b.iter_mut())
            .zip(defaults.color_a.iter().chain(defaults.color_b.iter()))
        {
            *channel = if channel.is_finite() {
                channel.max(0.0).min(1.0)
            } else {
                *fallback
            };
        }

        if !(self.mesh_scale.is_finite() && self.mesh_scale > 0.0) {
            log::warn!("Ignoring mesh scale {}", self.mesh_scale);
            out.mesh_scale = 1.0;
        }
        out.window.width = out.window.width.max(1);
        out.window.height = out.window.height.max(1);
        out
    }

    /// Apply command line overrides on top of the file values
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(scale) = cli.scale {
            self.mesh_scale = scale;
        }
        if cli.no_shadows {
            self.shadows = false;
        }
        self.sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(ShatterConfig::from_json("{}").unwrap(), ShatterConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ShatterConfig::from_json(r#"{"bloom": true}"#).unwrap_err();
        assert!(matches!(err, ShatterError::Config(_)));
    }

    #[test]
    fn force_never_reaches_one() {
        let cfg = ShatterConfig::from_json(r#"{"wipe": {"force": 1.0}}"#).unwrap();
        assert!(cfg.wipe.force < 1.0);
    }

    #[test]
    fn shadows_can_be_turned_off_from_either_side() {
        let cfg = ShatterConfig::from_json(r#"{"shadows": false, "floor": false}"#).unwrap();
        assert!(!cfg.shadows && !cfg.floor);

        let cli = Cli::parse_from(["shatter", "--no-shadows"]);
        let cfg = ShatterConfig::default().apply_cli(&cli);
        assert!(!cfg.shadows);
        assert!(cfg.floor);
    }

    #[test]
    fn bad_scale_falls_back() {
        let mut cfg = ShatterConfig::default();
        cfg.mesh_scale = -2.0;
        assert_eq!(cfg.sanitized().mesh_scale, 1.0);
    }
}
