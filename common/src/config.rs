use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings for a hollowing run. Every field has a default so a config file
/// only needs to list the values it changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HollowConfig {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Target wall thickness in mm.
    pub wall_thickness: f32,
    pub method: HollowMethod,

    /// Bounds on the scale factor used by [`HollowMethod::Scale`].
    pub min_scale: f32,
    pub max_scale: f32,

    /// Fraction of the wall thickness that every inner vertex must keep from
    /// the outer surface when using [`HollowMethod::Offset`].
    pub min_wall_ratio: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HollowMethod {
    /// Move every vertex inward so each adjacent face ends up the wall
    /// thickness away from its original plane.
    #[default]
    Offset,
    /// Shrink a copy of the mesh about its centroid.
    Scale,
}

impl HollowConfig {
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {}", err);
                HollowConfig::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(if path.exists() {
            let file = fs::read(path)?;
            let string = String::from_utf8_lossy(&file);
            let config = toml::from_str(&string)?;
            info!("Loaded config from `{}`", path.display());
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let string = toml::to_string(self)?;
        fs::write(path, string)?;
        Ok(())
    }
}

impl Default for HollowConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Top.stl"),
            output: PathBuf::from("Top_hollow.stl"),

            wall_thickness: 2.0,
            method: HollowMethod::Offset,

            min_scale: 0.7,
            max_scale: 0.95,
            min_wall_ratio: 0.5,
        }
    }
}

impl HollowMethod {
    pub const ALL: [HollowMethod; 2] = [HollowMethod::Offset, HollowMethod::Scale];

    pub fn name(&self) -> &'static str {
        match self {
            HollowMethod::Offset => "offset",
            HollowMethod::Scale => "scale",
        }
    }
}

impl FromStr for HollowMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown method `{s}`, expected `offset` or `scale`"))
    }
}

impl fmt::Display for HollowMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: HollowConfig = toml::from_str("wall_thickness = 1.5\nmethod = \"scale\"").unwrap();
        assert_eq!(config.wall_thickness, 1.5);
        assert_eq!(config.method, HollowMethod::Scale);
        assert_eq!(config.input, PathBuf::from("Top.stl"));
        assert_eq!(config.max_scale, 0.95);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hollow.toml");

        let config = HollowConfig {
            wall_thickness: 3.0,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(HollowConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HollowConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config, HollowConfig::default());
    }

    #[test]
    fn broken_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "wall_thickness = \"thick\"").unwrap();
        assert!(HollowConfig::load(&path).is_err());
        assert_eq!(HollowConfig::load_or_default(&path), HollowConfig::default());
    }

    #[test]
    fn method_from_str() {
        assert_eq!("Offset".parse::<HollowMethod>(), Ok(HollowMethod::Offset));
        assert_eq!("scale".parse::<HollowMethod>(), Ok(HollowMethod::Scale));
        assert!("shell".parse::<HollowMethod>().is_err());
    }
}
