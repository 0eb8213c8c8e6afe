// Tunables, optionally overridden by ./fluid-reveal.yaml.
// Every field has a default, so a partial file only changes what it names.

use crate::compositor::EdgePlacement;
use crate::error::Error;
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "fluid-reveal.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side of the square trail field, in cells (independent of window size).
    pub field_size: usize,
    /// Multiplier applied to every cell each tick.
    pub decay: f32,
    /// Distance (unit coords) at which a stroke's deposit falls to zero.
    pub line_width: f32,
    /// Deposit added at distance 0 from the stroke.
    pub intensity: f32,
    /// Shorter pointer displacements deposit nothing.
    pub min_segment: f32,
    /// Without movement for this long, the pointer counts as idle.
    pub idle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    /// Native windows don't report one, so it is configured (capped at 2).
    pub device_pixel_ratio: f32,
    /// Field value where the reveal edge sits.
    pub threshold: f32,
    /// Edge softness per unit of device pixel ratio.
    pub edge_width: f32,
    /// `above` (band starts at the threshold) or `centered` (band straddles it).
    pub edge_placement: EdgePlacement,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub top: PathBuf,
    pub bottom: PathBuf,
    /// 0xRRGGBB shown until (or instead of) the top picture.
    pub top_placeholder: u32,
    /// 0xRRGGBB shown until (or instead of) the bottom picture.
    pub bottom_placeholder: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field_size: 500,
            decay: 0.94,
            line_width: 0.09,
            intensity: 0.3,
            min_segment: 0.001,
            idle_ms: 100,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            target_fps: 60,
            device_pixel_ratio: 1.0,
            threshold: 0.02,
            edge_width: 0.004,
            edge_placement: EdgePlacement::Above,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            top: PathBuf::from("assets/portrait_top.jpg"),
            bottom: PathBuf::from("assets/portrait_bottom.png"),
            top_placeholder: 0x00_00_00_FF,
            bottom_placeholder: 0x00_FF_00_00,
        }
    }
}

impl Config {
    /// Parse YAML text and check the values make sense.
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        let cfg: Config = serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the simulator or compositor can't run with.
    pub fn validate(&self) -> Result<(), Error> {
        let sim = &self.simulation;
        if sim.field_size == 0 {
            return Err(Error::Config("simulation.field_size must be > 0".into()));
        }
        if !(sim.decay > 0.0 && sim.decay <= 1.0) {
            return Err(Error::Config("simulation.decay must be in (0, 1]".into()));
        }
        if !(sim.line_width > 0.0) {
            return Err(Error::Config("simulation.line_width must be > 0".into()));
        }
        if !(sim.intensity >= 0.0) || !(sim.min_segment >= 0.0) {
            return Err(Error::Config(
                "simulation.intensity and simulation.min_segment must be >= 0".into(),
            ));
        }
        let disp = &self.display;
        if disp.width == 0 || disp.height == 0 {
            return Err(Error::Config("display.width and display.height must be > 0".into()));
        }
        if !(disp.device_pixel_ratio > 0.0) {
            return Err(Error::Config("display.device_pixel_ratio must be > 0".into()));
        }
        if !(disp.edge_width >= 0.0) {
            return Err(Error::Config("display.edge_width must be >= 0".into()));
        }
        Ok(())
    }
}

/// Read ./fluid-reveal.yaml if present; any problem falls back to defaults.
pub fn load() -> Config {
    load_from(Path::new(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("failed to read {}: {e}; using defaults", path.display());
            return Config::default();
        }
    };
    match Config::from_yaml(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{} rejected ({e}); using defaults", path.display());
            Config::default()
        }
    }
}
