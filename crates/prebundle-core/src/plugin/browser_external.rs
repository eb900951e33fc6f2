//! Stubs for modules disabled in the browser build.

use super::DepPrebundlePlugin;
use crate::hooks::{LoadOutput, Loader};

/// Source for a module whose default export throws on any property access.
#[must_use]
pub fn browser_external_source(specifier: &str) -> String {
    let id = escape_template(specifier);
    format!(
        "export default new Proxy({{}}, {{\n  get(_, key) {{\n    throw new Error(`Module \"{id}\" has been externalized for browser compatibility. Cannot access \"{id}.${{String(key)}}\" in client code.`)\n  }}\n}})"
    )
}

/// Escape text for a JS template literal.
fn escape_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

impl DepPrebundlePlugin {
    pub(super) fn load_browser_external(&self, specifier: &str) -> LoadOutput {
        LoadOutput::source(browser_external_source(specifier), Loader::Js)
    }
}
