//! Bridge to the project's module resolver.
//!
//! The pre-bundle hooks never implement resolution themselves. They call an
//! [`IdResolver`] through the [`ResolverAdapter`], which fixes up importer
//! context first so virtual entry ids never reach the resolver.

mod fs;

pub use fs::FsResolver;

use crate::manifest::DepsManifest;
use crate::paths::{to_slash, wildcard_importer};
use futures::future::{BoxFuture, FutureExt};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// Prefix a resolver returns for modules disabled in the current target
/// environment (e.g. Node built-ins in a browser build).
pub const BROWSER_EXTERNAL_ID: &str = "__browser-external";

/// A module resolver.
///
/// `resolve` returns the resolved id, or `None` when nothing was found. With
/// `alias_only` set, only alias rewriting is applied and the aliased id is
/// returned without touching the filesystem.
pub trait IdResolver: Send + Sync {
    fn resolve<'a>(
        &'a self,
        id: &'a str,
        importer: Option<&'a str>,
        alias_only: bool,
    ) -> BoxFuture<'a, Option<String>>;
}

/// Adapter turning a synchronous closure into an [`IdResolver`].
pub struct FnResolver<F>(pub F);

impl<F> IdResolver for FnResolver<F>
where
    F: Fn(&str, Option<&str>, bool) -> Option<String> + Send + Sync,
{
    fn resolve<'a>(
        &'a self,
        id: &'a str,
        importer: Option<&'a str>,
        alias_only: bool,
    ) -> BoxFuture<'a, Option<String>> {
        futures::future::ready((self.0)(id, importer, alias_only)).boxed()
    }
}

/// Resolver wrapper that rewrites importer context before delegating.
#[derive(Clone)]
pub struct ResolverAdapter {
    resolver: Arc<dyn IdResolver>,
    manifest: Arc<DepsManifest>,
}

impl ResolverAdapter {
    pub fn new(resolver: Arc<dyn IdResolver>, manifest: Arc<DepsManifest>) -> Self {
        Self { resolver, manifest }
    }

    /// Resolve `id` from `importer`.
    ///
    /// An explicit `resolve_dir` wins and becomes a `<dir>/*` importer. An
    /// importer that is a qualified entry id is swapped for the entry's real
    /// file.
    pub async fn resolve(
        &self,
        id: &str,
        importer: Option<&str>,
        resolve_dir: Option<&Path>,
    ) -> Option<String> {
        let importer = self.importer_context(importer, resolve_dir);
        let resolved = self.resolver.resolve(id, importer.as_deref(), false).await;
        tracing::trace!(id, importer = ?importer, resolved = ?resolved, "resolver call");
        resolved
    }

    /// Apply alias rewriting only.
    pub async fn resolve_alias(&self, id: &str) -> Option<String> {
        self.resolver.resolve(id, None, true).await
    }

    fn importer_context<'a>(
        &self,
        importer: Option<&'a str>,
        resolve_dir: Option<&Path>,
    ) -> Option<Cow<'a, str>> {
        if let Some(dir) = resolve_dir {
            return Some(Cow::Owned(wildcard_importer(dir)));
        }
        let importer = importer.filter(|imp| !imp.is_empty())?;
        match self.manifest.entry_path(importer) {
            Some(real) => Some(Cow::Owned(to_slash(real))),
            None => Some(Cow::Borrowed(importer)),
        }
    }
}

impl std::fmt::Debug for ResolverAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverAdapter")
            .field("entries", &self.manifest.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ExportsData;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records the importer each call received.
    struct Recorder {
        calls: Mutex<Vec<(String, Option<String>, bool)>>,
    }

    impl IdResolver for Recorder {
        fn resolve<'a>(
            &'a self,
            id: &'a str,
            importer: Option<&'a str>,
            alias_only: bool,
        ) -> BoxFuture<'a, Option<String>> {
            self.calls.lock().unwrap().push((
                id.to_string(),
                importer.map(String::from),
                alias_only,
            ));
            futures::future::ready(Some(format!("/resolved/{id}"))).boxed()
        }
    }

    fn adapter() -> (ResolverAdapter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            calls: Mutex::new(Vec::new()),
        });
        let manifest = DepsManifest::new().entry(
            "lodash",
            "/proj/node_modules/lodash/lodash.js",
            ExportsData::default(),
        );
        (
            ResolverAdapter::new(recorder.clone(), Arc::new(manifest)),
            recorder,
        )
    }

    #[tokio::test]
    async fn test_entry_importer_is_translated() {
        let (adapter, recorder) = adapter();
        adapter.resolve("./chunk.js", Some("lodash"), None).await;

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(
            calls[0].1.as_deref(),
            Some("/proj/node_modules/lodash/lodash.js")
        );
        assert!(!calls[0].2);
    }

    #[tokio::test]
    async fn test_resolve_dir_wins() {
        let (adapter, recorder) = adapter();
        let dir = PathBuf::from("/proj/src");
        let resolved = adapter.resolve("vue", Some("lodash"), Some(&dir)).await;

        assert_eq!(resolved.as_deref(), Some("/resolved/vue"));
        assert_eq!(
            recorder.calls.lock().unwrap()[0].1.as_deref(),
            Some("/proj/src/*")
        );
    }

    #[tokio::test]
    async fn test_plain_importer_passes_through() {
        let (adapter, recorder) = adapter();
        adapter.resolve("vue", Some("/proj/src/main.ts"), None).await;
        adapter.resolve("vue", None, None).await;
        adapter.resolve_alias("vue").await;

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].1.as_deref(), Some("/proj/src/main.ts"));
        assert_eq!(calls[1].1, None);
        assert_eq!(calls[2], ("vue".to_string(), None, true));
    }

    #[tokio::test]
    async fn test_fn_resolver() {
        let resolver = FnResolver(|id: &str, _importer: Option<&str>, alias_only: bool| {
            (!alias_only).then(|| format!("/x/{id}"))
        });
        assert_eq!(resolver.resolve("a", None, false).await.as_deref(), Some("/x/a"));
        assert_eq!(resolver.resolve("a", None, true).await, None);
    }
}
