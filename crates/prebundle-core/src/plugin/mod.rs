//! The dependency pre-bundle plugin.
//!
//! Registers, in order:
//!
//! 1. asset externalizer (stylesheets, component formats, declared assets)
//! 2. entry router (bare specifiers)
//! 3. proxy module loader (`dep` namespace)
//! 4. browser-external stub loader (`browser-external` namespace)
//! 5. plug-and-play resolve and load fallbacks, only when PnP is active

mod browser_external;
mod entry;
mod externalize;
mod pnp;
mod proxy;

pub use browser_external::browser_external_source;
pub use pnp::detect_pnp;
pub use proxy::proxy_module_source;

use crate::config::PrebundleConfig;
use crate::error::Result;
use crate::hooks::{
    HookTable, LoadArgs, LoadFilter, LoadOutput, Namespace, ResolveArgs, ResolveFilter,
    ResolveOutput,
};
use crate::manifest::DepsManifest;
use crate::paths::absolutize;
use crate::resolver::{IdResolver, ResolverAdapter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Bare specifiers: word character or `@` first, no `:` before the first `/`.
pub const BARE_IMPORT_FILTER: &str = r"^[\w@][^:/]*(/|$)";

/// Matches every request.
const CATCH_ALL_FILTER: &str = ".*";

/// Resolve handlers, in the order they are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveHook {
    ExternalAsset,
    BareImport,
    PnpFallback,
}

impl ResolveHook {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalAsset => "external-asset",
            Self::BareImport => "bare-import",
            Self::PnpFallback => "pnp-resolve",
        }
    }
}

/// Load handlers, in the order they are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadHook {
    DepProxy,
    BrowserExternal,
    PnpRaw,
}

impl LoadHook {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepProxy => "dep-proxy",
            Self::BrowserExternal => "browser-external",
            Self::PnpRaw => "pnp-load",
        }
    }
}

/// Resolve/load hooks for one pre-bundle pass.
///
/// Holds only read-only pass data; every call is independent, so the host may
/// drive any number of requests concurrently.
#[derive(Debug)]
pub struct DepPrebundlePlugin {
    manifest: Arc<DepsManifest>,
    config: PrebundleConfig,
    adapter: ResolverAdapter,
    hooks: HookTable<ResolveHook, LoadHook>,
    root: OnceLock<PathBuf>,
}

impl DepPrebundlePlugin {
    /// Plugin name for diagnostics.
    pub const NAME: &'static str = "prebundle:dep-pre-bundle";

    /// Create the plugin for one pass.
    pub fn new(
        manifest: impl Into<Arc<DepsManifest>>,
        config: PrebundleConfig,
        resolver: Arc<dyn IdResolver>,
    ) -> Result<Self> {
        let manifest = manifest.into();
        let hooks = build_hooks(&config)?;
        tracing::debug!(
            entries = manifest.len(),
            pnp = config.pnp,
            resolve_rules = hooks.resolve_rules().len(),
            load_rules = hooks.load_rules().len(),
            "pre-bundle hooks registered"
        );

        Ok(Self {
            adapter: ResolverAdapter::new(resolver, manifest.clone()),
            manifest,
            config,
            hooks,
            root: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Absolute pass root, computed on first use.
    pub fn root(&self) -> &Path {
        self.root.get_or_init(|| absolutize(&self.config.root))
    }

    #[must_use]
    pub fn manifest(&self) -> &DepsManifest {
        &self.manifest
    }

    #[must_use]
    pub fn config(&self) -> &PrebundleConfig {
        &self.config
    }

    #[must_use]
    pub fn hooks(&self) -> &HookTable<ResolveHook, LoadHook> {
        &self.hooks
    }

    /// Resolve a specifier.
    ///
    /// Returns `None` when no rule handled it; the host then applies its own
    /// default resolution.
    pub async fn resolve(&self, args: &ResolveArgs) -> Option<ResolveOutput> {
        for hook in self.hooks.resolve_handlers(&args.path) {
            let result = match hook {
                ResolveHook::ExternalAsset => self.resolve_external_asset(args).await,
                ResolveHook::BareImport => self.resolve_bare_import(args).await,
                ResolveHook::PnpFallback => self.resolve_pnp(args).await,
            };
            if let Some(output) = result {
                tracing::debug!(
                    specifier = %args.path,
                    hook = hook.as_str(),
                    path = %output.path,
                    namespace = ?output.namespace,
                    external = output.external,
                    "resolved"
                );
                return Some(output);
            }
        }
        tracing::trace!(specifier = %args.path, "not handled");
        None
    }

    /// Load a resolved module.
    ///
    /// Returns `Ok(None)` when no rule handled it. Every load handler produces
    /// a result, so the first matching rule decides.
    pub async fn load(&self, args: &LoadArgs) -> Result<Option<LoadOutput>> {
        let Some(hook) = self.hooks.load_handlers(args).next() else {
            return Ok(None);
        };

        let output = match hook {
            LoadHook::DepProxy => self.load_dep_proxy(&args.path)?,
            LoadHook::BrowserExternal => self.load_browser_external(&args.path),
            LoadHook::PnpRaw => self.load_pnp_raw(&args.path).await?,
        };
        tracing::debug!(
            path = %args.path,
            namespace = %args.namespace,
            hook = hook.as_str(),
            loader = %output.loader,
            "loaded"
        );
        Ok(Some(output))
    }
}

/// Build the ordered rule table for `config`.
fn build_hooks(config: &PrebundleConfig) -> Result<HookTable<ResolveHook, LoadHook>> {
    let mut hooks = HookTable::new();

    hooks.on_resolve(
        ResolveFilter::new(&externalized_filter(&config.externalized_extensions()))?,
        ResolveHook::ExternalAsset,
    );
    hooks.on_resolve(
        ResolveFilter::new(BARE_IMPORT_FILTER)?,
        ResolveHook::BareImport,
    );

    hooks.on_load(
        LoadFilter::new(CATCH_ALL_FILTER)?.in_namespace(Namespace::Dep),
        LoadHook::DepProxy,
    );
    hooks.on_load(
        LoadFilter::new(CATCH_ALL_FILTER)?.in_namespace(Namespace::BrowserExternal),
        LoadHook::BrowserExternal,
    );

    // Registered last so they only see requests nothing else claimed
    if config.pnp {
        hooks.on_resolve(
            ResolveFilter::new(CATCH_ALL_FILTER)?,
            ResolveHook::PnpFallback,
        );
        hooks.on_load(LoadFilter::new(CATCH_ALL_FILTER)?, LoadHook::PnpRaw);
    }

    Ok(hooks)
}

/// `\.(css|less|...)(\?.*)?$`
fn externalized_filter(extensions: &[String]) -> String {
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|ext| regex_lite::escape(ext))
        .collect();
    format!(r"\.({})(\?.*)?$", alternatives.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Loader;
    use crate::manifest::ExportsData;
    use crate::resolver::FnResolver;

    fn plugin(pnp: bool) -> DepPrebundlePlugin {
        let manifest = DepsManifest::new().entry(
            "lodash",
            "/proj/node_modules/lodash/lodash.js",
            ExportsData::default(),
        );
        let resolver = FnResolver(|id: &str, _importer: Option<&str>, alias_only: bool| {
            if alias_only {
                return None;
            }
            Some(format!("/proj/resolved/{id}"))
        });
        DepPrebundlePlugin::new(
            manifest,
            PrebundleConfig::new("/proj").with_pnp(pnp),
            Arc::new(resolver),
        )
        .unwrap()
    }

    #[test]
    fn test_hook_registration_order() {
        let resolve: Vec<_> = plugin(false)
            .hooks()
            .resolve_rules()
            .iter()
            .map(|(_, hook)| *hook)
            .collect();
        assert_eq!(resolve, vec![ResolveHook::ExternalAsset, ResolveHook::BareImport]);

        let plugin = plugin(true);
        let resolve: Vec<_> = plugin.hooks().resolve_rules().iter().map(|(_, h)| *h).collect();
        assert_eq!(resolve.last(), Some(&ResolveHook::PnpFallback));
        let load: Vec<_> = plugin.hooks().load_rules().iter().map(|(_, h)| *h).collect();
        assert_eq!(
            load,
            vec![LoadHook::DepProxy, LoadHook::BrowserExternal, LoadHook::PnpRaw]
        );
    }

    #[test]
    fn test_externalized_filter() {
        let filter = ResolveFilter::new(&externalized_filter(&[
            "css".to_string(),
            "c++".to_string(),
        ]))
        .unwrap();
        assert!(filter.matches("./a.css"));
        assert!(filter.matches("./a.css?inline&lang=x"));
        assert!(filter.matches("./a.c++"));
        assert!(!filter.matches("./a.cssx"));
        assert!(!filter.matches("./a.css.js"));
    }

    #[test]
    fn test_bare_filter() {
        let filter = ResolveFilter::new(BARE_IMPORT_FILTER).unwrap();
        assert!(filter.matches("lodash"));
        assert!(filter.matches("@scope/pkg/sub"));
        assert!(filter.matches("a"));
        assert!(!filter.matches("./a"));
        assert!(!filter.matches("/a"));
        assert!(!filter.matches("node:fs"));
        assert!(!filter.matches("virtual:mod/x"));
    }

    #[tokio::test]
    async fn test_unhandled_without_pnp() {
        let plugin = plugin(false);
        assert_eq!(plugin.resolve(&ResolveArgs::entry("./src/main.js")).await, None);
        let load = plugin
            .load(&LoadArgs::new("/proj/src/main.js", Namespace::File))
            .await
            .unwrap();
        assert_eq!(load, None);
    }

    #[tokio::test]
    async fn test_root_is_lazy_and_stable() {
        let plugin = plugin(false);
        assert_eq!(plugin.root(), Path::new("/proj"));
        assert!(std::ptr::eq(plugin.root(), plugin.root()));
        assert_eq!(plugin.name(), "prebundle:dep-pre-bundle");

        let output = plugin
            .load(&LoadArgs::new("lodash", Namespace::Dep))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(output.loader, Loader::Js);
    }
}
