//! `prebundle load` command implementation.

use super::session::{runtime, SessionOptions};
use miette::{IntoDiagnostic, Result};
use prebundle_core::{LoadArgs, LoadOutput, Namespace};
use serde::Serialize;
use std::io::{ErrorKind, Write};

/// Load command action.
#[derive(Debug, Clone)]
pub struct LoadAction {
    pub path: String,
    pub namespace: Namespace,
}

/// JSON output for the load command.
#[derive(Serialize)]
struct LoadResultJson<'a> {
    ok: bool,
    path: &'a str,
    namespace: Namespace,
    handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    loader: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolve_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<String>,
}

impl<'a> LoadResultJson<'a> {
    fn new(action: &'a LoadAction, output: Option<&LoadOutput>) -> Self {
        Self {
            ok: true,
            path: &action.path,
            namespace: action.namespace,
            handled: output.is_some(),
            loader: output.map(|o| o.loader.as_str()),
            resolve_dir: output
                .and_then(|o| o.resolve_dir.as_ref())
                .map(|dir| dir.display().to_string()),
            contents: output.map(|o| o.text().into_owned()),
        }
    }
}

/// Run the load command.
///
/// Human mode writes the module contents to stdout unchanged.
pub fn run(session: &SessionOptions, action: LoadAction, json: bool) -> Result<()> {
    let plugin = match session.plugin() {
        Ok(plugin) => plugin,
        Err(e) => return super::fail(e, json),
    };

    let args = LoadArgs::new(action.path.clone(), action.namespace);
    let output = match runtime()?.block_on(plugin.load(&args)) {
        Ok(output) => output,
        Err(e) => return super::fail(e, json),
    };

    if json {
        return super::print_json(&LoadResultJson::new(&action, output.as_ref()));
    }

    match output {
        Some(output) => {
            tracing::info!(loader = %output.loader, "loaded {}", action.path);
            write_contents(&mut std::io::stdout().lock(), &output.contents)?;
        }
        None => eprintln!("unhandled: {} [{}]", action.path, action.namespace),
    }
    Ok(())
}

/// Write module contents. A closed reader (e.g. `| head`) is not an error.
fn write_contents(out: &mut impl Write, contents: &[u8]) -> Result<()> {
    match out.write_all(contents).and_then(|()| out.flush()) {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e).into_diagnostic(),
        _ => Ok(()),
    }
}
