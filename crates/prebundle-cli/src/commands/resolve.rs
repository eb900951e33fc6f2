//! `prebundle resolve` command implementation.

use super::session::{runtime, SessionOptions};
use miette::Result;
use prebundle_core::{ResolveArgs, ResolveOutput};
use serde::Serialize;
use std::path::PathBuf;

/// Resolve command action.
#[derive(Debug, Clone)]
pub struct ResolveAction {
    pub specifier: String,
    /// Importing module; `None` for a top-level entry.
    pub importer: Option<String>,
    pub resolve_dir: Option<PathBuf>,
}

impl ResolveAction {
    fn args(&self) -> ResolveArgs {
        ResolveArgs {
            path: self.specifier.clone(),
            importer: self.importer.clone(),
            resolve_dir: self.resolve_dir.clone(),
        }
    }
}

/// JSON output for the resolve command.
#[derive(Serialize)]
struct ResolveResultJson<'a> {
    ok: bool,
    specifier: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    importer: Option<&'a str>,
    handled: bool,
    result: Option<&'a ResolveOutput>,
}

/// Run the resolve command.
pub fn run(session: &SessionOptions, action: ResolveAction, json: bool) -> Result<()> {
    let plugin = match session.plugin() {
        Ok(plugin) => plugin,
        Err(e) => return super::fail(e, json),
    };

    let args = action.args();
    let output = runtime()?.block_on(plugin.resolve(&args));

    if json {
        return super::print_json(&ResolveResultJson {
            ok: true,
            specifier: &action.specifier,
            importer: action.importer.as_deref(),
            handled: output.is_some(),
            result: output.as_ref(),
        });
    }

    match output {
        Some(output) => println!("{}", describe(&output)),
        None => println!("unhandled"),
    }
    Ok(())
}

/// One-line human summary of a resolve result.
fn describe(output: &ResolveOutput) -> String {
    let mut line = output.path.clone();
    if let Some(namespace) = output.namespace {
        line = format!("{namespace}:{line}");
    }
    if output.external {
        line.push_str(" (external)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use prebundle_core::Namespace;

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&ResolveOutput::namespaced("lodash", Namespace::Dep)),
            "dep:lodash"
        );
        assert_eq!(
            describe(&ResolveOutput::external("/p/a.css")),
            "/p/a.css (external)"
        );
        assert_eq!(describe(&ResolveOutput::path("/p/a.js")), "/p/a.js");
    }
}
