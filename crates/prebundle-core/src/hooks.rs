//! Hook contract between the host bundler and the pre-bundle layer.
//!
//! The host calls `resolve` for every import it meets and `load` for every
//! resolved module. Handlers are registered in a [`HookTable`] as ordered
//! `(filter, handler)` pairs: the first matching handler that returns a result
//! wins, and a handler returning `None` lets the next matching rule try.

use bytes::Bytes;
use regex_lite::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;

/// Namespace a resolved module lives in.
///
/// `File` is the host's default namespace for real files; the others route
/// loads to a synthesis handler instead of a disk read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    #[default]
    File,
    /// Proxy modules for qualified entries.
    Dep,
    /// Stubs for modules disabled in the current target environment.
    BrowserExternal,
}

impl Namespace {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dep => "dep",
            Self::BrowserExternal => "browser-external",
        }
    }

    /// Parse a namespace name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "file" => Some(Self::File),
            "dep" => Some(Self::Dep),
            "browser-external" => Some(Self::BrowserExternal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content kind the host should parse a loaded module as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Css,
    Text,
    /// Let the host pick based on the file itself (binary-safe).
    Default,
}

impl Loader {
    /// Loader for a file extension (without the dot).
    ///
    /// `mjs` and `cjs` collapse to `js`, `mts` and `cts` to `ts`.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(Self::Js),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::Ts),
            "tsx" => Some(Self::Tsx),
            "json" => Some(Self::Json),
            "css" => Some(Self::Css),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Jsx => "jsx",
            Self::Ts => "ts",
            Self::Tsx => "tsx",
            Self::Json => "json",
            Self::Css => "css",
            Self::Text => "text",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of a resolve request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveArgs {
    /// The import specifier as written.
    pub path: String,
    /// Importing module, `None` for a pass entry point.
    pub importer: Option<String>,
    /// Explicit directory to resolve from.
    pub resolve_dir: Option<PathBuf>,
}

impl ResolveArgs {
    /// A top-level entry request (no importer).
    pub fn entry(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// A request issued from `importer`.
    pub fn new(path: impl Into<String>, importer: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            importer: Some(importer.into()),
            resolve_dir: None,
        }
    }

    /// Set the explicit resolution directory.
    pub fn with_resolve_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resolve_dir = Some(dir.into());
        self
    }

    /// Whether this is a top-level entry request.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.importer.as_deref().map_or(true, str::is_empty)
    }
}

/// Result of a handled resolve request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveOutput {
    /// Resolved path, or a virtual id inside `namespace`.
    pub path: String,
    /// Leave the import untouched in the output.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
    /// Namespace for the subsequent load; `None` means the host default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

impl ResolveOutput {
    /// A plain resolved path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            external: false,
            namespace: None,
        }
    }

    /// An external reference.
    pub fn external(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            external: true,
            namespace: None,
        }
    }

    /// A virtual id in `namespace`.
    pub fn namespaced(path: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            path: path.into(),
            external: false,
            namespace: Some(namespace),
        }
    }
}

/// Arguments of a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadArgs {
    /// Resolved path or virtual id.
    pub path: String,
    pub namespace: Namespace,
}

impl LoadArgs {
    pub fn new(path: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            path: path.into(),
            namespace,
        }
    }

    /// Load args for a previous resolve result.
    #[must_use]
    pub fn from_resolved(resolved: &ResolveOutput) -> Self {
        Self::new(resolved.path.clone(), resolved.namespace.unwrap_or_default())
    }
}

/// Result of a handled load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutput {
    /// Module contents. Synthesized modules are UTF-8, raw reads may not be.
    pub contents: Bytes,
    pub loader: Loader,
    /// Base directory for relative imports inside `contents`.
    pub resolve_dir: Option<PathBuf>,
}

impl LoadOutput {
    /// Create a load result from generated source text.
    pub fn source(code: impl Into<String>, loader: Loader) -> Self {
        Self {
            contents: Bytes::from(code.into()),
            loader,
            resolve_dir: None,
        }
    }

    /// Set the base directory.
    pub fn with_resolve_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.resolve_dir = dir;
        self
    }

    /// Contents as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

/// Matcher for resolve requests: a regex over the specifier.
#[derive(Debug, Clone)]
pub struct ResolveFilter {
    pattern: Regex,
}

impl ResolveFilter {
    pub fn new(pattern: &str) -> crate::Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }

    /// Whether this filter claims `specifier`.
    #[must_use]
    pub fn matches(&self, specifier: &str) -> bool {
        self.pattern.is_match(specifier)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Matcher for load requests: a regex over the path, optionally restricted to
/// one namespace.
#[derive(Debug, Clone)]
pub struct LoadFilter {
    pattern: Regex,
    namespace: Option<Namespace>,
}

impl LoadFilter {
    pub fn new(pattern: &str) -> crate::Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
            namespace: None,
        })
    }

    /// Restrict the filter to one namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Whether this filter claims the load request.
    #[must_use]
    pub fn matches(&self, args: &LoadArgs) -> bool {
        self.namespace.map_or(true, |ns| ns == args.namespace) && self.pattern.is_match(&args.path)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }
}

fn compile(pattern: &str) -> crate::Result<Regex> {
    Regex::new(pattern).map_err(|source| crate::Error::InvalidFilter {
        pattern: pattern.to_string(),
        source,
    })
}

/// Ordered resolve and load rules.
///
/// Rules are evaluated in registration order. Callers iterate the matching
/// handlers and stop at the first one that produces a result.
#[derive(Debug, Clone)]
pub struct HookTable<R, L> {
    resolve: Vec<(ResolveFilter, R)>,
    load: Vec<(LoadFilter, L)>,
}

impl<R, L> Default for HookTable<R, L> {
    fn default() -> Self {
        Self {
            resolve: Vec::new(),
            load: Vec::new(),
        }
    }
}

impl<R, L> HookTable<R, L> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolve rule after all existing ones.
    pub fn on_resolve(&mut self, filter: ResolveFilter, handler: R) {
        self.resolve.push((filter, handler));
    }

    /// Register a load rule after all existing ones.
    pub fn on_load(&mut self, filter: LoadFilter, handler: L) {
        self.load.push((filter, handler));
    }

    /// Resolve handlers whose filter claims `specifier`, in order.
    pub fn resolve_handlers<'a>(&'a self, specifier: &'a str) -> impl Iterator<Item = &'a R> + 'a {
        self.resolve
            .iter()
            .filter(move |(filter, _)| filter.matches(specifier))
            .map(|(_, handler)| handler)
    }

    /// Load handlers whose filter claims `args`, in order.
    pub fn load_handlers<'a>(&'a self, args: &'a LoadArgs) -> impl Iterator<Item = &'a L> + 'a {
        self.load
            .iter()
            .filter(move |(filter, _)| filter.matches(args))
            .map(|(_, handler)| handler)
    }

    /// All resolve rules, in order.
    #[must_use]
    pub fn resolve_rules(&self) -> &[(ResolveFilter, R)] {
        &self.resolve
    }

    /// All load rules, in order.
    #[must_use]
    pub fn load_rules(&self) -> &[(LoadFilter, L)] {
        &self.load
    }
}
