/// TOML configuration: view defaults and the list of wire-frame models
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::render::Color;
use crate::transform::{
    RotationState, DEFAULT_X_ROTATION, DEFAULT_Y_ROTATION, DEFAULT_Z_ROTATION,
};

/// Radians of rotation per pixel of pointer drag
pub const DEFAULT_DRAG_SPEED: f64 = 0.01;

fn default_rotation_x() -> f64 {
    DEFAULT_X_ROTATION
}
fn default_rotation_y() -> f64 {
    DEFAULT_Y_ROTATION
}
fn default_rotation_z() -> f64 {
    DEFAULT_Z_ROTATION
}
fn default_drag_speed() -> f64 {
    DEFAULT_DRAG_SPEED
}
fn default_line_color() -> Color {
    Color::BLACK
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewSettings {
    #[serde(default = "default_rotation_x")]
    pub default_rotation_x: f64,
    #[serde(default = "default_rotation_y")]
    pub default_rotation_y: f64,
    #[serde(default = "default_rotation_z")]
    pub default_rotation_z: f64,
    #[serde(default = "default_drag_speed")]
    pub drag_speed: f64,
    #[serde(default = "default_line_color")]
    pub line_color: Color,
}

impl ViewSettings {
    pub fn default_rotation(&self) -> RotationState {
        RotationState::new(
            self.default_rotation_x,
            self.default_rotation_y,
            self.default_rotation_z,
        )
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_rotation_x: default_rotation_x(),
            default_rotation_y: default_rotation_y(),
            default_rotation_z: default_rotation_z(),
            drag_speed: default_drag_speed(),
            line_color: default_line_color(),
        }
    }
}

/// One `[[wire_frames]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireFrameEntry {
    pub id: u32,
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WireFrameConfig {
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub wire_frames: Vec<WireFrameEntry>,
}

impl WireFrameConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// The first existing file among [`config_paths`].
    pub fn discover() -> Option<PathBuf> {
        config_paths().into_iter().find(|path| path.exists())
    }
}

/// Where a configuration file is looked for, in order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("wf3d.toml"), PathBuf::from(".wf3d.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("wf3d").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".wf3d.toml"));
    }

    paths
}
