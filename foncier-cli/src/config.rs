//! Configuration handling for the foncier CLI
//!
//! Supports loading configuration from foncier.toml files with CLI argument
//! overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub maps: MapsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// DVF transactions CSV (optionally gzip-compressed)
    #[serde(default = "default_dvf_path")]
    pub dvf: PathBuf,

    /// Region boundaries (GeoJSON FeatureCollection)
    #[serde(default = "default_regions_path")]
    pub regions: PathBuf,

    /// Department boundaries (GeoJSON FeatureCollection)
    #[serde(default = "default_departments_path")]
    pub departments: PathBuf,

    /// Commune boundaries (GeoJSON FeatureCollection)
    #[serde(default = "default_communes_path")]
    pub communes: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for aggregates, the hierarchy export and map artifacts
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Restrict maps to one property type (e.g. "Maison"); empty means all
    #[serde(default)]
    pub property_kind: Option<String>,
}

// Default value functions
fn default_threads() -> usize {
    num_cpus::get()
}
fn default_dvf_path() -> PathBuf {
    PathBuf::from("data/dvf.csv.gz")
}
fn default_regions_path() -> PathBuf {
    PathBuf::from("data/regions.geojson")
}
fn default_departments_path() -> PathBuf {
    PathBuf::from("data/departements.geojson")
}
fn default_communes_path() -> PathBuf {
    PathBuf::from("data/communes.geojson")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dvf: default_dvf_path(),
            regions: default_regions_path(),
            departments: default_departments_path(),
            communes: default_communes_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            property_kind: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            data: DataConfig::default(),
            output: OutputConfig::default(),
            maps: MapsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find foncier.toml in current directory
                let default_path = PathBuf::from("foncier.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: foncier.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).expect("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert_eq!(config.data.dvf, PathBuf::from("data/dvf.csv.gz"));
        assert!(config.maps.property_kind.is_none());
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let config = Config::default();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config.general.threads, loaded_config.general.threads);
        assert_eq!(config.data.communes, loaded_config.data.communes);
        assert_eq!(config.output.dir, loaded_config.output.dir);

        Ok(())
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(
            temp_file.path(),
            "[general]\nthreads = 2\n\n[data]\n\n[output]\n\n[maps]\nproperty_kind = \"Maison\"\n",
        )?;

        let config = Config::load_from_file(temp_file.path())?;
        assert_eq!(config.general.threads, 2);
        assert_eq!(config.data.regions, PathBuf::from("data/regions.geojson"));
        assert_eq!(config.maps.property_kind.as_deref(), Some("Maison"));

        Ok(())
    }

    #[test]
    fn test_example_toml_generation() {
        let example = Config::example_toml();
        assert!(example.contains("[general]"));
        assert!(example.contains("[data]"));
        assert!(example.contains("[output]"));
    }
}
