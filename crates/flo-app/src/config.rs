//! Codec session configuration (YAML or JSON).

use std::path::Path;

use flo_core::CancelToken;
use flo_model::Component;
use flo_store::{DEFAULT_CHUNK_SIZE, WriteOptions};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Rows per batch; `null` writes each component in a single batch.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: Option<usize>,
    /// Component keys to process; empty means all.
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub hdf5: Hdf5Config,
    /// Promote component warnings to a failure.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hdf5Config {
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
}

fn default_chunk_size() -> Option<usize> {
    Some(DEFAULT_CHUNK_SIZE)
}

fn default_compression_level() -> u8 {
    flo_hdf5::DEFAULT_COMPRESSION
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            include: Vec::new(),
            exclude: Vec::new(),
            hdf5: Hdf5Config::default(),
            strict: false,
        }
    }
}

impl Default for Hdf5Config {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
        }
    }
}

impl CodecConfig {
    /// Loads a config file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: CodecConfig = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects unknown component keys, a zero chunk size and gzip levels above 9.
    pub fn validate(&self) -> AppResult<()> {
        for key in self.include.iter().chain(&self.exclude) {
            if Component::from_key(key).is_none() {
                return Err(AppError::Config(format!("unknown component '{}'", key)));
            }
        }
        if self.chunk_size == Some(0) {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.hdf5.compression_level > 9 {
            return Err(AppError::Config(format!(
                "hdf5.compression_level must be 0..=9, got {}",
                self.hdf5.compression_level
            )));
        }
        Ok(())
    }

    pub fn selects(&self, component: Component) -> bool {
        let listed = |keys: &[String]| {
            keys.iter()
                .any(|k| Component::from_key(k) == Some(component))
        };
        (self.include.is_empty() || listed(&self.include)) && !listed(&self.exclude)
    }

    pub fn write_options(&self, cancel: Option<&CancelToken>) -> WriteOptions {
        let options = WriteOptions::default().with_chunk_size(self.chunk_size);
        match cancel {
            Some(token) => options.with_cancel(token.clone()),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flo_model::CellArrayKind;

    #[test]
    fn yaml_defaults_and_null_chunk() {
        let config: CodecConfig = serde_yaml::from_str("strict: true\n").unwrap();
        assert_eq!(config.chunk_size, Some(DEFAULT_CHUNK_SIZE));
        assert_eq!(config.hdf5.compression_level, 4);
        assert!(config.strict);

        let unbounded: CodecConfig = serde_yaml::from_str("chunk_size: null\n").unwrap();
        assert_eq!(unbounded.chunk_size, None);
    }

    #[test]
    fn include_and_exclude_select_components() {
        let config = CodecConfig {
            include: vec!["grid".into(), "arf".into(), "tolspatial".into()],
            exclude: vec!["arf".into()],
            ..Default::default()
        };
        config.validate().unwrap();
        assert!(config.selects(Component::Grid));
        assert!(config.selects(Component::CellArray(CellArrayKind::TolSpatial)));
        assert!(!config.selects(Component::ReductionFactors));
        assert!(!config.selects(Component::Rain));
    }

    #[test]
    fn unknown_component_is_rejected() {
        let config = CodecConfig {
            exclude: vec!["nope".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn json_config_loads() {
        let path = std::env::temp_dir().join("flo_app_config.json");
        std::fs::write(&path, r#"{"chunk_size": 500, "hdf5": {"compression_level": 9}}"#).unwrap();
        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config.chunk_size, Some(500));
        assert_eq!(config.hdf5.compression_level, 9);
    }
}
