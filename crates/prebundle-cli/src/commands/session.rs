//! Plugin setup shared by every command that runs the hooks.

use miette::{IntoDiagnostic, Result};
use prebundle_core::{
    detect_pnp, DepPrebundlePlugin, FsResolver, PassManifest, PrebundleConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Global flags that shape the pass.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub manifest: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub pnp: bool,
    pub ssr: bool,
    pub aliases: Vec<String>,
}

impl SessionOptions {
    /// Build the pass config: manifest config first, then flag overrides.
    ///
    /// PnP is on if the manifest or the flag says so, or if the root has a
    /// PnP manifest file.
    pub fn config(&self, from_manifest: Option<PrebundleConfig>) -> PrebundleConfig {
        let mut config = from_manifest.unwrap_or_default();
        if let Some(root) = &self.root {
            config.root.clone_from(root);
        }
        let pnp = config.pnp || self.pnp || detect_pnp(&config.root);
        config.with_pnp(pnp)
    }

    /// `FROM=TO` pairs; malformed entries are skipped with a warning.
    pub fn alias_pairs(&self) -> Vec<(String, String)> {
        self.aliases
            .iter()
            .filter_map(|raw| match raw.split_once('=') {
                Some((from, to)) if !from.trim().is_empty() => {
                    Some((from.trim().to_string(), to.trim().to_string()))
                }
                _ => {
                    tracing::warn!(alias = %raw, "ignoring alias, expected FROM=TO");
                    None
                }
            })
            .collect()
    }

    /// Load the manifest and create the plugin.
    pub fn plugin(&self) -> prebundle_core::Result<DepPrebundlePlugin> {
        let pass = match &self.manifest {
            Some(path) => PassManifest::load(path)?,
            None => PassManifest::default(),
        };
        let config = self.config(pass.config);

        let resolver = self
            .alias_pairs()
            .into_iter()
            .fold(
                FsResolver::new(config.root.clone()).browser(!self.ssr),
                |resolver, (from, to)| resolver.alias(from, to),
            );

        tracing::debug!(
            root = %config.root.display(),
            pnp = config.pnp,
            ssr = self.ssr,
            entries = pass.deps.len(),
            "session ready"
        );
        DepPrebundlePlugin::new(pass.deps, config, Arc::new(resolver))
    }
}

/// Single-threaded runtime for one command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()
}
