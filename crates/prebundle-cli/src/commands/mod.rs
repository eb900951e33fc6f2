pub mod hooks;
pub mod load;
pub mod resolve;
pub mod session;
pub mod version;

use miette::{IntoDiagnostic, Result};
use prebundle_core::Error;
use serde::Serialize;

/// Error object in `--json` output.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&Error> for ErrorJson {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            path: err.path().map(|p| p.display().to_string()),
        }
    }
}

#[derive(Serialize)]
struct FailureJson {
    ok: bool,
    error: ErrorJson,
}

/// Print a serializable value as one JSON line on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value).into_diagnostic()?);
    Ok(())
}

/// Report a core error and stop.
///
/// In JSON mode the error goes to stdout as `{ok: false, error}` and the
/// process exits with status 1; otherwise it becomes a diagnostic.
pub fn fail(err: Error, json: bool) -> Result<()> {
    if json {
        print_json(&FailureJson {
            ok: false,
            error: ErrorJson::from(&err),
        })?;
        std::process::exit(1);
    }
    Err(err).into_diagnostic()
}
