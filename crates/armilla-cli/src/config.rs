//! Configuration file loading for the CLI.
//!
//! An explicit `--config` path wins; otherwise the user's configuration
//! directory is probed for `config.toml`. A missing default file is not an
//! error, an unreadable or unparseable explicit file is.

use std::{fs, path::PathBuf};

use directories::ProjectDirs;
use log::debug;
use serde::Deserialize;

use armilla::config::CompileConfig;

use crate::CliError;

/// Top-level structure of the CLI's TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    compile: CompileConfig,
}

/// The default configuration file path, if a home directory exists.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "armilla", "armilla")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the compile configuration.
pub fn load(explicit_path: Option<&str>) -> Result<CompileConfig, CliError> {
    let path = match explicit_path {
        Some(path) => PathBuf::from(path),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No configuration file found; using defaults");
                return Ok(CompileConfig::default());
            }
        },
    };

    debug!(path:? = path; "Loading configuration");
    let content = fs::read_to_string(&path)?;
    let file: FileConfig = toml::from_str(&content)
        .map_err(|err| CliError::Config(path.display().to_string(), err.to_string()))?;
    Ok(file.compile)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_default_config_yields_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config.spacing().node_spacing(), 50.0);
    }

    #[test]
    fn explicit_config_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[compile]\ndiagram_type = \"flowchart\"\n[compile.spacing]\nnode_spacing = 25.0"
        )
        .unwrap();

        let config = load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.diagram_type(), Some("flowchart"));
        assert_eq!(config.spacing().node_spacing(), 25.0);
    }

    #[test]
    fn unparseable_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml {{").unwrap();
        assert!(load(Some(file.path().to_str().unwrap())).is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        assert!(load(Some("/definitely/not/a/real/path.toml")).is_err());
    }
}
