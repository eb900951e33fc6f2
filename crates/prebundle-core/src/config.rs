use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extensions that are always left external: stylesheets, preprocessors and
/// single-file component formats.
pub const EXTERNAL_TYPES: &[&str] = &[
    "css", "less", "sass", "scss", "styl", "stylus", "pcss", "postcss", "vue", "svelte", "marko",
    "astro",
];

/// Asset extensions declared by default.
pub const KNOWN_ASSET_TYPES: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "jfif", "pjpeg", "pjp", "gif", "svg", "ico", "webp", "avif",
    // media
    "mp4", "webm", "ogg", "mp3", "wav", "flac", "aac",
    // fonts
    "woff", "woff2", "eot", "ttf", "otf",
    // other
    "webmanifest", "pdf", "txt",
];

/// Configuration for one pre-bundle pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrebundleConfig {
    /// Project root. Proxy modules import entries relative to this directory.
    pub root: PathBuf,

    /// Whether the package manager uses plug-and-play resolution.
    pub pnp: bool,

    /// Declared asset extensions (without the leading dot).
    pub asset_extensions: Vec<String>,

    /// Extra asset extensions on top of `asset_extensions`.
    pub assets_include: Vec<String>,
}

impl Default for PrebundleConfig {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            pnp: false,
            asset_extensions: KNOWN_ASSET_TYPES.iter().map(ToString::to_string).collect(),
            assets_include: Vec::new(),
        }
    }
}

impl PrebundleConfig {
    /// Create a new config rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Enable or disable the plug-and-play overlay.
    #[must_use]
    pub fn with_pnp(mut self, pnp: bool) -> Self {
        self.pnp = pnp;
        self
    }

    /// Add extra asset extensions.
    #[must_use]
    pub fn with_assets_include<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets_include
            .extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Every extension the asset externalizer claims, deduplicated, in
    /// declaration order.
    #[must_use]
    pub fn externalized_extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let all = EXTERNAL_TYPES
            .iter()
            .map(|ext| (*ext).to_string())
            .chain(self.asset_extensions.iter().cloned())
            .chain(self.assets_include.iter().cloned());

        for ext in all {
            let ext = ext.trim_start_matches('.').to_string();
            if !ext.is_empty() && !out.contains(&ext) {
                out.push(ext);
            }
        }
        out
    }
}
