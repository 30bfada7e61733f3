//! Archive-relative asset paths.
//!
//! Valid asset paths:
//! - Must be non-empty and at most [`MAX_ASSET_PATH_LEN`] bytes
//! - Must be relative (no leading `/`)
//! - Must not contain `\` or NUL
//! - Components between slashes must be non-empty and must not be `.` or `..`

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest accepted asset path, in bytes.
pub const MAX_ASSET_PATH_LEN: usize = 1024;

/// Characters that are forbidden anywhere in an asset path.
const FORBIDDEN_CHARS: &[char] = &['\\', '\0'];

/// A validated, archive-relative asset path such as `img/logo.png`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Validate and wrap an asset path.
    ///
    /// ```
    /// use bspec_types::AssetPath;
    ///
    /// assert!(AssetPath::new("img/logo.png").is_ok());
    /// assert!(AssetPath::new("/etc/passwd").is_err());
    /// assert!(AssetPath::new("img/../secret").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        validate_asset_path(&path)?;
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_asset_path(path: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidAssetPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("asset path must not be empty".into()));
    }
    if path.len() > MAX_ASSET_PATH_LEN {
        return Err(invalid(format!(
            "asset path exceeds {MAX_ASSET_PATH_LEN} bytes"
        )));
    }
    for ch in FORBIDDEN_CHARS {
        if path.contains(*ch) {
            return Err(invalid(format!("contains forbidden character: {ch:?}")));
        }
    }
    if path.starts_with('/') {
        return Err(invalid("asset path must be relative".into()));
    }
    for component in path.split('/') {
        match component {
            "" => return Err(invalid("path components must not be empty".into())),
            "." | ".." => {
                return Err(invalid(format!(
                    "path component {component:?} is not allowed"
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

impl TryFrom<String> for AssetPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

impl Borrow<str> for AssetPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetPath({:?})", self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
