//! Dependency scan output consumed by the pre-bundle hooks.
//!
//! Both maps are keyed by flattened id (see [`crate::flatten_id`]) and are
//! read-only for the lifetime of a pass.

use crate::config::PrebundleConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Statically detected imports and exports of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportsData {
    /// Imported symbol names.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Exported symbol names (`"default"` for a default export).
    #[serde(default)]
    pub exports: Vec<String>,
    /// Whether the entry contains `export * from` re-exports.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_re_exports: bool,
}

impl ExportsData {
    /// Create exports data from import and export name lists.
    pub fn new<I, E, S, T>(imports: I, exports: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            imports: imports.into_iter().map(Into::into).collect(),
            exports: exports.into_iter().map(Into::into).collect(),
            has_re_exports: false,
        }
    }

    /// Mark the entry as containing wildcard re-exports.
    #[must_use]
    pub fn with_re_exports(mut self, has_re_exports: bool) -> Self {
        self.has_re_exports = has_re_exports;
        self
    }

    /// No static imports and no static exports: treated as a CommonJS module.
    #[must_use]
    pub fn is_commonjs_like(&self) -> bool {
        self.imports.is_empty() && self.exports.is_empty()
    }

    /// Whether `default` is among the exports.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.exports.iter().any(|name| name == "default")
    }
}

/// The qualified entry map and the exports metadata map for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsManifest {
    /// Flattened id → absolute entry file.
    #[serde(default)]
    pub qualified: BTreeMap<String, PathBuf>,
    /// Flattened id → exports data.
    #[serde(default)]
    pub exports: BTreeMap<String, ExportsData>,
}

impl DepsManifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry under an already flattened id.
    pub fn entry(
        mut self,
        flat_id: impl Into<String>,
        path: impl Into<PathBuf>,
        exports: ExportsData,
    ) -> Self {
        let flat_id = flat_id.into();
        self.qualified.insert(flat_id.clone(), path.into());
        self.exports.insert(flat_id, exports);
        self
    }

    /// Real file of an entry.
    #[must_use]
    pub fn entry_path(&self, flat_id: &str) -> Option<&Path> {
        self.qualified.get(flat_id).map(PathBuf::as_path)
    }

    /// Exports data of an entry.
    #[must_use]
    pub fn exports_data(&self, flat_id: &str) -> Option<&ExportsData> {
        self.exports.get(flat_id)
    }

    /// Whether `flat_id` is a qualified entry.
    #[must_use]
    pub fn contains(&self, flat_id: &str) -> bool {
        self.qualified.contains_key(flat_id)
    }

    /// Number of qualified entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.qualified.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty()
    }
}

/// On-disk form of a pass: both maps plus an optional config block.
///
/// ```json
/// {
///   "qualified": { "lodash": "/proj/node_modules/lodash/lodash.js" },
///   "exports": { "lodash": { "imports": [], "exports": [] } },
///   "config": { "root": "/proj", "pnp": false }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassManifest {
    #[serde(flatten)]
    pub deps: DepsManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PrebundleConfig>,
}

impl PassManifest {
    /// Read a pass manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_lookup() {
        let manifest = DepsManifest::new().entry(
            "lodash",
            "/proj/node_modules/lodash/lodash.js",
            ExportsData::default(),
        );

        assert!(manifest.contains("lodash"));
        assert!(!manifest.contains("react"));
        assert_eq!(
            manifest.entry_path("lodash"),
            Some(Path::new("/proj/node_modules/lodash/lodash.js"))
        );
        assert!(manifest.exports_data("lodash").unwrap().is_commonjs_like());
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_exports_data_shape() {
        let data = ExportsData::new(["react"], ["default", "useState"]);
        assert!(data.has_default());
        assert!(!data.is_commonjs_like());

        let data = ExportsData::new(Vec::<String>::new(), ["foo"]);
        assert!(!data.has_default());
    }

    #[test]
    fn test_pass_manifest_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pass.json");
        std::fs::write(
            &path,
            r#"{
                "qualified": { "vue": "/proj/node_modules/vue/dist/vue.mjs" },
                "exports": { "vue": { "imports": ["@vue/shared"], "exports": ["ref"], "has_re_exports": true } },
                "config": { "root": "/proj" }
            }"#,
        )
        .unwrap();

        let pass = PassManifest::load(&path).unwrap();
        assert!(pass.deps.contains("vue"));
        assert!(pass.deps.exports_data("vue").unwrap().has_re_exports);
        assert_eq!(pass.config.unwrap().root, PathBuf::from("/proj"));
    }

    #[test]
    fn test_pass_manifest_errors() {
        let dir = tempdir().unwrap();

        let missing = PassManifest::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, Error::ManifestRead { .. }));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let bad = PassManifest::load(&path).unwrap_err();
        assert!(matches!(bad, Error::ManifestParse { .. }));
    }
}
