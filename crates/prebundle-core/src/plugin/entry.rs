//! Entry router for bare specifiers.
//!
//! The first reference to a qualified entry (from the pass itself, with no
//! importer) is routed into the `dep` namespace under its flattened id, so the
//! output file is named after the dependency. Every deeper reference to the
//! same entry resolves to its real file, so the bundler sees one module
//! identity and never emits a second copy.

use super::DepPrebundlePlugin;
use crate::hooks::{Namespace, ResolveArgs, ResolveOutput};
use crate::paths::absolutize;
use crate::resolver::BROWSER_EXTERNAL_ID;
use crate::specifier::{flatten_id, is_external_url};
use std::borrow::Cow;
use std::path::Path;

/// Alias rewrites followed when looking for an entry. Bounded so a cyclic
/// alias table cannot loop.
const MAX_ALIAS_HOPS: usize = 1;

impl DepPrebundlePlugin {
    pub(super) async fn resolve_bare_import(&self, args: &ResolveArgs) -> Option<ResolveOutput> {
        let is_entry = args.is_entry();

        let mut candidate = Cow::Borrowed(args.path.as_str());
        let mut hops = 0;
        loop {
            if let Some(output) = self.resolve_entry(&candidate, is_entry) {
                return Some(output);
            }
            if hops == MAX_ALIAS_HOPS {
                break;
            }
            hops += 1;
            let aliased = self.adapter.resolve_alias(&candidate).await;
            match aliased {
                Some(aliased) if aliased != candidate => {
                    tracing::trace!(specifier = %args.path, aliased = %aliased, "alias hop");
                    candidate = Cow::Owned(aliased);
                }
                _ => break,
            }
        }

        let resolved = self
            .adapter
            .resolve(&args.path, args.importer.as_deref(), None)
            .await?;

        if resolved.starts_with(BROWSER_EXTERNAL_ID) {
            return Some(ResolveOutput::namespaced(
                args.path.clone(),
                Namespace::BrowserExternal,
            ));
        }
        if is_external_url(&resolved) {
            return Some(ResolveOutput::external(resolved));
        }
        Some(ResolveOutput::path(
            absolutize(Path::new(&resolved)).to_string_lossy(),
        ))
    }

    /// Route `id` if it flattens to a qualified entry.
    fn resolve_entry(&self, id: &str, is_entry: bool) -> Option<ResolveOutput> {
        let flat_id = flatten_id(id);
        let entry_file = self.manifest.entry_path(&flat_id)?;

        if is_entry {
            Some(ResolveOutput::namespaced(flat_id, Namespace::Dep))
        } else {
            Some(ResolveOutput::path(entry_file.to_string_lossy()))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PrebundleConfig;
    use crate::hooks::{Namespace, ResolveArgs, ResolveOutput};
    use crate::manifest::{DepsManifest, ExportsData};
    use crate::resolver::{FnResolver, BROWSER_EXTERNAL_ID};
    use crate::DepPrebundlePlugin;
    use std::sync::Arc;

    fn manifest() -> DepsManifest {
        DepsManifest::new()
            .entry(
                "lodash",
                "/proj/node_modules/lodash/lodash.js",
                ExportsData::default(),
            )
            .entry(
                "@vue_shared",
                "/proj/node_modules/@vue/shared/dist/shared.esm-bundler.js",
                ExportsData::new(Vec::<String>::new(), ["isArray"]),
            )
            .entry(
                "react-dom_client",
                "/proj/node_modules/react-dom/client.js",
                ExportsData::default(),
            )
    }

    fn plugin() -> DepPrebundlePlugin {
        let resolver = FnResolver(|id: &str, _importer: Option<&str>, alias_only: bool| {
            if alias_only {
                return match id {
                    "_" => Some("lodash".to_string()),
                    "chain-a" => Some("chain-b".to_string()),
                    "chain-b" => Some("lodash".to_string()),
                    "self-alias" => Some("self-alias".to_string()),
                    _ => None,
                };
            }
            match id {
                "fs" => Some(format!("{BROWSER_EXTERNAL_ID}:fs")),
                "cdn-lib" => Some("https://cdn.example.com/lib.js".to_string()),
                "vue" => Some("/proj/node_modules/vue/index.mjs".to_string()),
                _ => None,
            }
        });
        DepPrebundlePlugin::new(manifest(), PrebundleConfig::new("/proj"), Arc::new(resolver))
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_entry_routes_to_dep_then_real_path() {
        let plugin = plugin();
        let cases = [
            ("lodash", "lodash"),
            ("@vue/shared", "@vue_shared"),
            ("react-dom/client", "react-dom_client"),
        ];
        for (spec, flat) in cases {
            let top = plugin.resolve(&ResolveArgs::entry(spec)).await.unwrap();
            assert_eq!(top, ResolveOutput::namespaced(flat, Namespace::Dep));

            let nested = plugin
                .resolve(&ResolveArgs::new(spec, "/proj/node_modules/x/index.js"))
                .await
                .unwrap();
            let real = plugin.manifest().entry_path(flat).unwrap();
            assert_eq!(nested, ResolveOutput::path(real.to_string_lossy()));
            assert_eq!(nested.namespace, None);
        }
    }

    #[tokio::test]
    async fn test_alias_to_entry() {
        let plugin = plugin();
        let top = plugin.resolve(&ResolveArgs::entry("_")).await.unwrap();
        assert_eq!(top, ResolveOutput::namespaced("lodash", Namespace::Dep));

        let nested = plugin
            .resolve(&ResolveArgs::new("_", "/proj/src/a.js"))
            .await
            .unwrap();
        assert_eq!(
            nested,
            ResolveOutput::path("/proj/node_modules/lodash/lodash.js")
        );
    }

    #[tokio::test]
    async fn test_alias_chain_is_bounded() {
        let plugin = plugin();
        // chain-a -> chain-b -> lodash needs two hops; only one is followed
        assert_eq!(plugin.resolve(&ResolveArgs::entry("chain-a")).await, None);
        assert_eq!(
            plugin.resolve(&ResolveArgs::entry("chain-b")).await,
            Some(ResolveOutput::namespaced("lodash", Namespace::Dep))
        );
        assert_eq!(plugin.resolve(&ResolveArgs::entry("self-alias")).await, None);
    }

    #[tokio::test]
    async fn test_browser_external() {
        let plugin = plugin();
        let out = plugin
            .resolve(&ResolveArgs::new("fs", "/proj/node_modules/x/index.js"))
            .await
            .unwrap();
        assert_eq!(
            out,
            ResolveOutput::namespaced("fs", Namespace::BrowserExternal)
        );
    }

    #[tokio::test]
    async fn test_fallback_resolution() {
        let plugin = plugin();
        assert_eq!(
            plugin
                .resolve(&ResolveArgs::new("vue", "/proj/src/main.js"))
                .await,
            Some(ResolveOutput::path("/proj/node_modules/vue/index.mjs"))
        );
        assert_eq!(
            plugin.resolve(&ResolveArgs::entry("cdn-lib")).await,
            Some(ResolveOutput::external("https://cdn.example.com/lib.js"))
        );
        assert_eq!(plugin.resolve(&ResolveArgs::entry("unknown-pkg")).await, None);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let plugin = plugin();
        for args in [
            ResolveArgs::entry("lodash"),
            ResolveArgs::new("lodash", "/proj/src/a.js"),
            ResolveArgs::new("vue", "/proj/src/a.js"),
            ResolveArgs::entry("unknown-pkg"),
        ] {
            let first = plugin.resolve(&args).await;
            let second = plugin.resolve(&args).await;
            assert_eq!(first, second);
        }
    }
}
