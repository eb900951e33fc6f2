//! Filesystem resolver for standalone use.
//!
//! Resolves specifiers against a conventional `node_modules` tree:
//!
//! - Relative: `./utils`, `../lib/foo`
//! - Absolute: `/abs/path/to/module`
//! - Bare: `lodash`, `@scope/pkg`, `react/jsx-runtime`
//!
//! Node built-ins and `"browser": { "x": false }` entries resolve to the
//! browser-external marker when targeting the browser.

#![allow(clippy::unused_self)]

use super::{IdResolver, BROWSER_EXTERNAL_ID};
use crate::specifier::{
    is_bare_specifier, is_external_url, package_name, split_package_specifier, split_query,
};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Extensions probed for extensionless specifiers, in order.
const EXTENSIONS: &[&str] = &[".mjs", ".js", ".mts", ".ts", ".jsx", ".tsx", ".json"];

/// Index files probed for directory specifiers, in order.
const INDEX_FILES: &[&str] = &["index.mjs", "index.js", "index.ts", "index.jsx", "index.tsx"];

/// Node built-in modules.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Resolver backed by the filesystem and an alias table.
#[derive(Debug, Clone)]
pub struct FsResolver {
    /// Directory used when a request has no importer.
    root: PathBuf,
    /// `(from, to)` alias pairs, matched exactly or as `from/` prefixes.
    aliases: Vec<(String, String)>,
    /// Target the browser: built-ins become browser-external.
    browser: bool,
}

impl FsResolver {
    /// Create a browser-targeting resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            aliases: Vec::new(),
            browser: true,
        }
    }

    /// Add an alias.
    pub fn alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.push((from.into(), to.into()));
        self
    }

    /// Target the browser (`true`, default) or a server runtime.
    pub fn browser(mut self, browser: bool) -> Self {
        self.browser = browser;
        self
    }

    /// Resolve synchronously. See [`IdResolver::resolve`].
    #[must_use]
    pub fn resolve_sync(
        &self,
        specifier: &str,
        importer: Option<&str>,
        alias_only: bool,
    ) -> Option<String> {
        let aliased = self.apply_alias(specifier);
        if alias_only {
            return aliased;
        }
        let specifier = aliased.as_deref().unwrap_or(specifier);

        let (bare, query) = split_query(specifier);
        let resolved = self.resolve_path(bare, importer)?;
        Some(format!("{resolved}{query}"))
    }

    fn apply_alias(&self, specifier: &str) -> Option<String> {
        for (from, to) in &self.aliases {
            if specifier == from {
                return Some(to.clone());
            }
            if let Some(rest) = specifier.strip_prefix(from.as_str()) {
                if rest.starts_with('/') {
                    return Some(format!("{to}{rest}"));
                }
            }
        }
        None
    }

    /// Directory a request resolves from.
    fn base_dir(&self, importer: Option<&str>) -> PathBuf {
        match importer.filter(|imp| !imp.is_empty()) {
            Some(imp) => match imp.strip_suffix("/*") {
                Some("") => PathBuf::from("/"),
                Some(dir) => PathBuf::from(dir),
                None => Path::new(imp)
                    .parent()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf),
            },
            None => self.root.clone(),
        }
    }

    fn resolve_path(&self, specifier: &str, importer: Option<&str>) -> Option<String> {
        if is_external_url(specifier) {
            return Some(specifier.to_string());
        }

        if let Some(builtin) = specifier.strip_prefix("node:") {
            return self.builtin(builtin);
        }
        if NODE_BUILTINS.contains(&package_name(specifier)) {
            return self.builtin(specifier);
        }

        let base = self.base_dir(importer);
        let found = if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier == "."
            || specifier == ".."
        {
            self.resolve_file_or_directory(&base.join(specifier))
        } else if Path::new(specifier).is_absolute() {
            self.resolve_file_or_directory(Path::new(specifier))
        } else if is_bare_specifier(specifier) {
            if self.browser && importer_disables(&base, specifier) {
                return Some(format!("{BROWSER_EXTERNAL_ID}:{specifier}"));
            }
            return self.resolve_bare(specifier, &base);
        } else {
            None
        }?;

        Some(canonical(&found))
    }

    fn builtin(&self, id: &str) -> Option<String> {
        self.browser
            .then(|| format!("{BROWSER_EXTERNAL_ID}:{id}"))
    }

    /// Resolve a bare specifier by walking up `node_modules` directories.
    fn resolve_bare(&self, specifier: &str, from_dir: &Path) -> Option<String> {
        let (pkg_name, subpath) = split_package_specifier(specifier);

        let mut current = Some(from_dir);
        while let Some(dir) = current {
            let pkg_dir = dir.join("node_modules").join(pkg_name);
            if pkg_dir.is_dir() {
                let pkg_json = read_package_json(&pkg_dir.join("package.json"));

                // The nearest package directory wins, even if it has no match
                let entry = match subpath {
                    Some(sub) => self.resolve_package_subpath(&pkg_dir, pkg_json.as_ref(), sub),
                    None => self.resolve_package_entry(&pkg_dir, pkg_json.as_ref()),
                };
                return entry.map(|entry| canonical(&entry));
            }
            current = dir.parent();
        }

        None
    }

    /// Resolve `pkg/subpath` through `exports`, falling back to the file tree.
    fn resolve_package_subpath(
        &self,
        pkg_dir: &Path,
        pkg_json: Option<&Value>,
        subpath: &str,
    ) -> Option<PathBuf> {
        if let Some(exports) = pkg_json.and_then(|json| json.get("exports")) {
            let entry = self.resolve_exports(exports, &format!("./{subpath}"))?;
            return self.resolve_file_or_directory(&pkg_dir.join(entry));
        }
        self.resolve_file_or_directory(&pkg_dir.join(subpath))
    }

    /// Resolve the package entry point: `exports`, `browser`, `module`, `main`,
    /// then `index.*`.
    fn resolve_package_entry(&self, pkg_dir: &Path, pkg_json: Option<&Value>) -> Option<PathBuf> {
        if let Some(json) = pkg_json {
            if let Some(exports) = json.get("exports") {
                let entry = self.resolve_exports(exports, ".")?;
                return self.resolve_file_or_directory(&pkg_dir.join(entry));
            }

            let browser_main = self
                .browser
                .then(|| json.get("browser").and_then(Value::as_str))
                .flatten();
            let fields = [
                browser_main,
                json.get("module").and_then(Value::as_str),
                json.get("main").and_then(Value::as_str),
            ];
            for field in fields.into_iter().flatten() {
                if let Some(found) = self.resolve_file_or_directory(&pkg_dir.join(field)) {
                    return Some(found);
                }
            }
        }

        self.resolve_index(pkg_dir)
    }

    /// Resolve the `exports` field for `subpath` (`.` or `./x`).
    fn resolve_exports(&self, exports: &Value, subpath: &str) -> Option<String> {
        match exports {
            Value::String(s) if subpath == "." => Some(s.clone()),
            Value::Object(map) => {
                let has_subpath_keys = map.keys().any(|k| k.starts_with('.'));
                if !has_subpath_keys {
                    // Conditions at the root apply to "." only
                    return (subpath == ".")
                        .then(|| self.resolve_export_value(exports))
                        .flatten();
                }
                if let Some(value) = map.get(subpath) {
                    return self.resolve_export_value(value);
                }
                // "./*" style patterns
                map.iter().find_map(|(key, value)| {
                    let (prefix, suffix) = key.split_once('*')?;
                    let matched = subpath.strip_prefix(prefix)?.strip_suffix(suffix)?;
                    let target = self.resolve_export_value(value)?;
                    Some(target.replace('*', matched))
                })
            }
            _ => None,
        }
    }

    /// Resolve a single export value (handles conditions).
    fn resolve_export_value(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.iter().find_map(|v| self.resolve_export_value(v)),
            Value::Object(map) => {
                let conditions: &[&str] = if self.browser {
                    &["browser", "import", "module", "default", "require"]
                } else {
                    &["node", "import", "module", "default", "require"]
                };
                conditions
                    .iter()
                    .filter_map(|c| map.get(*c))
                    .find_map(|v| self.resolve_export_value(v))
            }
            _ => None,
        }
    }

    /// Resolve a path that might be a file or directory.
    fn resolve_file_or_directory(&self, target: &Path) -> Option<PathBuf> {
        if target.is_file() {
            return Some(target.to_path_buf());
        }

        for ext in EXTENSIONS {
            let with_ext = PathBuf::from(format!("{}{}", target.display(), ext));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }

        if target.is_dir() {
            if let Some(main) = read_package_json(&target.join("package.json"))
                .as_ref()
                .and_then(|json| json.get("main").and_then(Value::as_str).map(String::from))
            {
                if let Some(found) = self.resolve_file_or_directory(&target.join(main)) {
                    return Some(found);
                }
            }
            return self.resolve_index(target);
        }

        None
    }

    fn resolve_index(&self, dir: &Path) -> Option<PathBuf> {
        INDEX_FILES
            .iter()
            .map(|index| dir.join(index))
            .find(|path| path.is_file())
    }
}

impl IdResolver for FsResolver {
    fn resolve<'a>(
        &'a self,
        id: &'a str,
        importer: Option<&'a str>,
        alias_only: bool,
    ) -> BoxFuture<'a, Option<String>> {
        futures::future::ready(self.resolve_sync(id, importer, alias_only)).boxed()
    }
}

fn read_package_json(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Whether the package owning `from_dir` maps `specifier` to `false` in its
/// `browser` field. Only the nearest `package.json` counts.
fn importer_disables(from_dir: &Path, specifier: &str) -> bool {
    from_dir
        .ancestors()
        .map(|dir| dir.join("package.json"))
        .find(|path| path.is_file())
        .and_then(|path| read_package_json(&path))
        .is_some_and(|json| is_browser_disabled(&json, specifier))
}

/// `"browser": { "<specifier>": false }` disables a module for the browser.
fn is_browser_disabled(pkg_json: &Value, specifier: &str) -> bool {
    pkg_json
        .get("browser")
        .and_then(Value::as_object)
        .and_then(|map| map.get(specifier))
        .is_some_and(|v| v == &Value::Bool(false))
}

fn canonical(path: &Path) -> String {
    dunce::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
