//! Asset externalizer.
//!
//! Stylesheets, component formats and declared assets are never inlined into
//! a pre-bundled dependency; the reference is kept as an external import.

use super::DepPrebundlePlugin;
use crate::hooks::{ResolveArgs, ResolveOutput};

impl DepPrebundlePlugin {
    /// Mark a matched asset external if it resolves. Unresolved assets fall
    /// through to later rules.
    pub(super) async fn resolve_external_asset(&self, args: &ResolveArgs) -> Option<ResolveOutput> {
        let resolved = self
            .adapter
            .resolve(&args.path, args.importer.as_deref(), None)
            .await?;
        Some(ResolveOutput::external(resolved))
    }
}
