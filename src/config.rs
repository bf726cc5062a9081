//! Scene configuration: window, camera, meshes, assets and the body table.
//!
//! Everything has a built-in default matching the stock solar system. A RON
//! file can override any part of it; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::body::{Body, BodyKind};
use crate::error::ConfigError;
use crate::sphere::Sphere;

pub const CONFIG_PATH: &str = "res/space.ron";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub sphere: SphereConfig,
    pub light: LightConfig,
    pub assets: AssetConfig,
    pub bodies: BodyTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// How far the camera sits back from the origin along +Z.
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphereConfig {
    pub horizontal: u32,
    pub vertical: u32,
    pub radius: f64,
    pub center: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub color: [f32; 3],
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub texture_dir: PathBuf,
    pub texture_extension: String,
    pub backdrop_texture: String,
    /// Played once in the background. `None` keeps the scene silent.
    pub music: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub kind: BodyKind,
    pub translation: [f32; 3],
    pub scale: [f32; 3],
    /// Radians per second around the local Y axis.
    pub spin_rate: f32,
    /// Radians per second around the sun. Ignored for stars.
    #[serde(default)]
    pub orbit_rate: f32,
}

/// Ordered: the star comes first, then planets outwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BodyTable(pub Vec<BodyConfig>);

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 960,
            title: "space".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 500.0,
            far: 30000.0,
            distance: 3500.0,
        }
    }
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            horizontal: 500,
            vertical: 500,
            radius: 450.0,
            center: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            position: [1.0, 1.0, 1000.0],
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("res/textures"),
            texture_extension: "jpg".to_string(),
            backdrop_texture: "stars".to_string(),
            music: Some(PathBuf::from("res/music/interstellar.mp3")),
        }
    }
}

impl SphereConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Sphere::mesh_size(self.horizontal, self.vertical) {
            Some(_) => Ok(()),
            None => Err(ConfigError::SphereTooLarge {
                horizontal: self.horizontal,
                vertical: self.vertical,
            }),
        }
    }
}

fn body(name: &str, kind: BodyKind, translation: [f32; 3], scale: [f32; 3], spin_rate: f32, orbit_rate: f32) -> BodyConfig {
    BodyConfig {
        name: name.to_string(),
        kind: kind,
        translation: translation,
        scale: scale,
        spin_rate: spin_rate,
        orbit_rate: orbit_rate,
    }
}

impl Default for BodyTable {
    fn default() -> Self {
        use BodyKind::{Planet, Star};

        BodyTable(vec![
            body("sun", Star, [0.0, 0.0, 0.0], [1.1, 1.0, 1.0], 0.03, 0.0),
            body("mercury", Planet, [600.0, 300.0, 0.0], [0.12, 0.1, 0.1], 0.1, 0.01),
            body("venus", Planet, [900.0, 600.0, 0.0], [0.34, 0.3, 0.3], -0.09, -0.03),
            body("earth", Planet, [1300.0, -300.0, 0.0], [0.34, 0.3, 0.3], 0.05, 0.04),
            body("mars", Planet, [1700.0, 900.0, 0.0], [0.23, 0.2, 0.2], -0.06, 0.02),
            body("jupiter", Planet, [2300.0, 450.0, 0.0], [0.78, 0.7, 0.7], 0.07, -0.03),
            body("saturn", Planet, [3100.0, -150.0, 0.0], [0.67, 0.6, 0.6], -0.12, 0.01),
            body("uranus", Planet, [3900.0, -50.0, 0.0], [0.45, 0.4, 0.4], -0.1, 0.02),
            body("neptune", Planet, [4600.0, -750.0, 0.0], [0.34, 0.3, 0.3], 0.08, -0.04),
        ])
    }
}

impl Config {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(ConfigError::ParseError)?;
        config.sphere.validate()?;

        Ok(config)
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using built-in scene");
            return Ok(Self::default());
        }

        let source = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config = Self::parse(&source)?;
        info!(path = %path.display(), bodies = config.bodies.0.len(), "loaded config");

        Ok(config)
    }

    fn texture_path(&self, name: &str) -> PathBuf {
        self.assets.texture_dir.join(name).with_extension(&self.assets.texture_extension)
    }

    /// One texture per body, in table order, then the backdrop last.
    pub fn texture_paths(&self) -> Vec<PathBuf> {
        self.bodies.0.iter()
            .map(|b| self.texture_path(&b.name))
            .chain(std::iter::once(self.texture_path(&self.assets.backdrop_texture)))
            .collect()
    }

    pub fn backdrop_texture(&self) -> usize {
        self.bodies.0.len()
    }

    pub fn build_bodies(&self) -> Vec<Body> {
        self.bodies.0.iter().enumerate().map(|(i, b)| {
            Body::new(
                &b.name,
                b.kind,
                Vector3::from(b.translation),
                Vector3::from(b.scale),
                b.spin_rate,
                b.orbit_rate,
                i
            )
        }).collect()
    }
}
