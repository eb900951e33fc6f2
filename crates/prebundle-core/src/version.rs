/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version line printed by `prebundle version`.
#[must_use]
pub fn version_string() -> String {
    format!("prebundle {VERSION}")
}
