use std::path::PathBuf;

use clap::Parser;
use common::config::{HollowConfig, HollowMethod};

#[derive(Debug, Parser)]
/// Generates a hollowed copy of a solid STL part.
pub struct Args {
    #[arg(long)]
    /// Mesh to hollow, defaults to `Top.stl`.
    pub input: Option<PathBuf>,
    #[arg(long)]
    /// Where to write the hollowed mesh, defaults to `Top_hollow.stl`. Must
    /// not be the input file.
    pub output: Option<PathBuf>,

    #[arg(long)]
    /// Wall thickness in mm, defaults to 2.0.
    pub wall_thickness: Option<f32>,
    #[arg(long)]
    /// How the cavity is built, either `offset` or `scale`.
    pub method: Option<HollowMethod>,

    #[arg(long, default_value = "hollow.toml")]
    /// TOML file with default settings. Flags take precedence over it.
    pub config: PathBuf,

    #[arg(long)]
    /// Analyze and hollow the mesh without writing any output.
    pub dry_run: bool,
    #[arg(short, long)]
    /// Log everything, not just progress messages.
    pub verbose: bool,
}

impl Args {
    pub fn hollow_config(&self) -> HollowConfig {
        let mut config = HollowConfig::load_or_default(&self.config);

        if let Some(input) = &self.input {
            config.input = input.clone();
        }

        if let Some(output) = &self.output {
            config.output = output.clone();
        }

        if let Some(wall_thickness) = self.wall_thickness {
            config.wall_thickness = wall_thickness;
        }

        if let Some(method) = self.method {
            config.method = method;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use clap::Parser;
    use common::config::{HollowConfig, HollowMethod};

    use super::Args;

    #[test]
    fn defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("hollow.toml");
        let args = Args::parse_from(["hollow", "--config", config.to_str().unwrap()]);

        assert!(!args.dry_run);
        assert_eq!(args.hollow_config(), HollowConfig::default());
        assert_eq!(args.hollow_config().input, Path::new("Top.stl"));
        assert_eq!(args.hollow_config().output, Path::new("Top_hollow.stl"));
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("hollow.toml");
        fs::write(&config, "wall_thickness = 3.0\nmethod = \"scale\"\nmax_scale = 0.9\n").unwrap();

        let args = Args::parse_from(["hollow", "--config", config.to_str().unwrap()]);
        let loaded = args.hollow_config();
        assert_eq!(loaded.wall_thickness, 3.0);
        assert_eq!(loaded.method, HollowMethod::Scale);
        assert_eq!(loaded.max_scale, 0.9);

        let args = Args::parse_from([
            "hollow",
            "--config",
            config.to_str().unwrap(),
            "--wall-thickness",
            "1.5",
            "--method",
            "offset",
            "--output",
            "out.stl",
        ]);
        let loaded = args.hollow_config();
        assert_eq!(loaded.wall_thickness, 1.5);
        assert_eq!(loaded.method, HollowMethod::Offset);
        assert_eq!(loaded.output, Path::new("out.stl"));
        assert_eq!(loaded.max_scale, 0.9);
    }

    #[test]
    fn bad_method() {
        assert!(Args::try_parse_from(["hollow", "--method", "shell"]).is_err());
    }
}
