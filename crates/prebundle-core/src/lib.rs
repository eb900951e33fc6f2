#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

//! Resolution and synthetic-module layer for a dependency pre-bundling pass.
//!
//! The host bundler calls [`DepPrebundlePlugin::resolve`] and
//! [`DepPrebundlePlugin::load`] for every module reference it meets. The plugin
//! walks an ordered [`HookTable`] and answers with a routing decision, or
//! `None` to let the host fall back to its own default handling.

pub mod config;
pub mod error;
pub mod hooks;
pub mod manifest;
pub mod paths;
pub mod plugin;
pub mod resolver;
pub mod specifier;
pub mod version;

pub use config::PrebundleConfig;
pub use error::{Error, Result};
pub use hooks::{
    HookTable, LoadArgs, LoadFilter, LoadOutput, Loader, Namespace, ResolveArgs, ResolveFilter,
    ResolveOutput,
};
pub use manifest::{DepsManifest, ExportsData, PassManifest};
pub use plugin::{
    browser_external_source, detect_pnp, proxy_module_source, DepPrebundlePlugin, LoadHook,
    ResolveHook,
};
pub use resolver::{FnResolver, FsResolver, IdResolver, ResolverAdapter, BROWSER_EXTERNAL_ID};
pub use specifier::flatten_id;
pub use version::VERSION;
