//! Plug-and-play fallbacks.
//!
//! With PnP there is no `node_modules` tree to walk, so anything the other
//! rules leave unhandled is resolved by the project resolver and loaded as raw
//! bytes.

use super::DepPrebundlePlugin;
use crate::error::{Error, Result};
use crate::hooks::{LoadOutput, Loader, ResolveArgs, ResolveOutput};
use std::path::Path;

const PNP_MANIFESTS: &[&str] = &[".pnp.cjs", ".pnp.js"];

/// Whether `root` is a plug-and-play install.
#[must_use]
pub fn detect_pnp(root: &Path) -> bool {
    PNP_MANIFESTS.iter().any(|name| root.join(name).is_file())
}

impl DepPrebundlePlugin {
    pub(super) async fn resolve_pnp(&self, args: &ResolveArgs) -> Option<ResolveOutput> {
        let resolved = self
            .adapter
            .resolve(
                &args.path,
                args.importer.as_deref(),
                args.resolve_dir.as_deref(),
            )
            .await?;
        Some(ResolveOutput::path(resolved))
    }

    pub(super) async fn load_pnp_raw(&self, path: &str) -> Result<LoadOutput> {
        let contents = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })?;
        Ok(LoadOutput {
            contents: contents.into(),
            loader: Loader::Default,
            resolve_dir: None,
        })
    }
}
