//! Proxy modules for qualified entries.

use super::DepPrebundlePlugin;
use crate::error::{Error, Result};
use crate::hooks::{LoadOutput, Loader};
use crate::manifest::ExportsData;
use crate::paths::{absolutize, relative_import_path};

/// Re-export source for an entry at `import_path`.
///
/// - no imports and no exports (CommonJS-like): default import re-exported
///   as default
/// - a `default` export: the same default line
/// - any named export or wildcard re-export: `export * from`
///
/// Always one or two lines, joined with `\n`.
#[must_use]
pub fn proxy_module_source(import_path: &str, data: &ExportsData) -> String {
    // JSON string escaping is a valid JS string literal
    let specifier = serde_json::to_string(import_path)
        .unwrap_or_else(|_| format!("\"{import_path}\""));
    let default_line = format!("import d from {specifier};export default d;");

    let mut lines = Vec::with_capacity(2);
    if data.is_commonjs_like() {
        lines.push(default_line);
    } else {
        if data.has_default() {
            lines.push(default_line);
        }
        let named = data
            .exports
            .first()
            .map_or(true, |first| first != "default");
        if data.has_re_exports || data.exports.len() > 1 || named {
            lines.push(format!("export * from {specifier};"));
        }
    }
    lines.join("\n")
}

impl DepPrebundlePlugin {
    pub(super) fn load_dep_proxy(&self, flat_id: &str) -> Result<LoadOutput> {
        let entry_file = self
            .manifest
            .entry_path(flat_id)
            .ok_or_else(|| Error::entry_metadata_missing(flat_id, "entry file"))?;
        let data = self
            .manifest
            .exports_data(flat_id)
            .ok_or_else(|| Error::entry_metadata_missing(flat_id, "exports data"))?;

        let import_path = relative_import_path(self.root(), &absolutize(entry_file));
        let contents = proxy_module_source(&import_path, data);

        let loader = entry_file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Loader::from_extension)
            .unwrap_or(Loader::Js);

        // The PnP loader reads raw files itself and needs no base directory
        let resolve_dir = (!self.config.pnp).then(|| self.root().to_path_buf());

        Ok(LoadOutput::source(contents, loader).with_resolve_dir(resolve_dir))
    }
}
