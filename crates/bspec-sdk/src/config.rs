use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BSpecError, BSpecResult};

/// Default cap on a single asset payload: 64 MiB.
pub const DEFAULT_MAX_ASSET_SIZE: u64 = 64 * 1024 * 1024;

/// Identifier length cap applied by [`ValidationConfig::strict`].
pub const STRICT_MAX_ID_LENGTH: usize = 256;

/// Configuration for an open archive.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// compression_level = 9
///
/// [validation]
/// strict = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// zstd level used when saving.
    pub compression_level: i32,
    /// Largest accepted asset payload in bytes.
    pub max_asset_size: u64,
    pub validation: ValidationConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: bspec_pack::DEFAULT_COMPRESSION_LEVEL,
            max_asset_size: DEFAULT_MAX_ASSET_SIZE,
            validation: ValidationConfig::default(),
        }
    }
}

impl ArchiveConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> BSpecResult<Self> {
        toml::from_str(text).map_err(|e| BSpecError::Serialization(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> BSpecResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::archive::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "archive config loaded");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> BSpecResult<String> {
        toml::to_string(self).map_err(|e| BSpecError::Serialization(e.to_string()))
    }
}

/// Document validation rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Enforce the BSpec authoring conventions on top of the minimal schema:
    /// `TYPE-kebab-name` ids, `type` matching the id prefix, semver
    /// `version`, non-empty `title`, string `tags`.
    pub strict: bool,
    /// Longest accepted identifier in bytes. Unlimited when unset.
    pub max_id_length: Option<usize>,
}

impl ValidationConfig {
    /// Authoring conventions on, identifiers capped at
    /// [`STRICT_MAX_ID_LENGTH`] bytes.
    pub fn strict() -> Self {
        Self {
            strict: true,
            max_id_length: Some(STRICT_MAX_ID_LENGTH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults() {
        let config = ArchiveConfig::default();
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.max_asset_size, 64 * 1024 * 1024);
        assert!(!config.validation.strict);
        assert_eq!(config.validation.max_id_length, None);
        assert_eq!(ValidationConfig::strict().max_id_length, Some(STRICT_MAX_ID_LENGTH));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ArchiveConfig::from_toml_str(
            "compression_level = 9\n\n[validation]\nstrict = true\n",
        )
        .unwrap();
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.max_asset_size, DEFAULT_MAX_ASSET_SIZE);
        assert!(config.validation.strict);
        assert_eq!(config.validation.max_id_length, None);

        let capped = ArchiveConfig::from_toml_str("[validation]\nmax_id_length = 8\n").unwrap();
        assert_eq!(capped.validation.max_id_length, Some(8));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ArchiveConfig::from_toml_str("").unwrap(), ArchiveConfig::default());
    }

    #[test]
    fn bad_toml_is_serialization_error() {
        let err = ArchiveConfig::from_toml_str("compression_level = \"high\"").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SerializationError);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ArchiveConfig::default();
        config.max_asset_size = 1024;
        config.validation = ValidationConfig::strict();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ArchiveConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bspec.toml");
        std::fs::write(&path, "max_asset_size = 10\n").unwrap();
        assert_eq!(ArchiveConfig::load(&path).unwrap().max_asset_size, 10);

        let err = ArchiveConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileNotFound);
    }
}
