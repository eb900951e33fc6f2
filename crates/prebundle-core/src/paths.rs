//! Path helpers shared by the hooks and the filesystem resolver.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and drop `.`/`..`
/// components lexically. Does not touch the filesystem.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    normalize(&abs_path)
}

/// Lexically normalize a path.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Convert a path to a string with forward slashes.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Importer that tells a resolver "resolve as if from this directory".
#[must_use]
pub fn wildcard_importer(dir: &Path) -> String {
    let mut dir = to_slash(dir);
    while dir.ends_with('/') && dir.len() > 1 {
        dir.pop();
    }
    if dir.ends_with('/') {
        format!("{dir}*")
    } else {
        format!("{dir}/*")
    }
}

/// Module-relative import path from `root` to `file`.
///
/// Always starts with `./` or `../` so the bundler never reads it as a bare
/// specifier. Falls back to the absolute path when no relative form exists
/// (e.g. a different drive on Windows).
#[must_use]
pub fn relative_import_path(root: &Path, file: &Path) -> String {
    let Some(relative) = pathdiff::diff_paths(file, root) else {
        return to_slash(file);
    };
    if relative.is_absolute() {
        return to_slash(&relative);
    }

    let relative = to_slash(&relative);
    if relative.starts_with("./") || relative.starts_with("../") {
        relative
    } else if relative.is_empty() {
        ".".to_string()
    } else {
        format!("./{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/proj/./src/../node_modules/a.js")),
            PathBuf::from("/proj/node_modules/a.js")
        );
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_wildcard_importer() {
        assert_eq!(wildcard_importer(Path::new("/proj/src")), "/proj/src/*");
        assert_eq!(wildcard_importer(Path::new("/proj/src/")), "/proj/src/*");
        assert_eq!(wildcard_importer(Path::new("/")), "/*");
    }

    #[test]
    fn test_relative_import_path() {
        assert_eq!(
            relative_import_path(
                Path::new("/proj"),
                Path::new("/proj/node_modules/lodash/lodash.js")
            ),
            "./node_modules/lodash/lodash.js"
        );
        assert_eq!(
            relative_import_path(
                Path::new("/repo/packages/app"),
                Path::new("/repo/node_modules/vue/index.mjs")
            ),
            "../../node_modules/vue/index.mjs"
        );
    }
}
