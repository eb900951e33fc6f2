//! Import specifier classification and flattening.

/// Flatten a package or package sub-path specifier into an entry key.
///
/// `/` and `:` become `_`, `.` becomes `__`, and a nested-dependency
/// separator `a > b` becomes `a___b`.
#[must_use]
pub fn flatten_id(id: &str) -> String {
    let segments: Vec<&str> = id.split('>').collect();
    let last = segments.len() - 1;
    let mut flat = String::with_capacity(id.len() + 8);

    for (i, segment) in segments.into_iter().enumerate() {
        let mut segment = segment;
        if i > 0 {
            flat.push_str("___");
            segment = segment.trim_start();
        }
        if i < last {
            segment = segment.trim_end();
        }
        for c in segment.chars() {
            match c {
                '/' | ':' => flat.push('_'),
                '.' => flat.push_str("__"),
                c => flat.push(c),
            }
        }
    }

    flat
}

/// Check if a specifier is bare: starts with a word character or `@` and has
/// no `:` before the first `/`.
#[must_use]
pub fn is_bare_specifier(specifier: &str) -> bool {
    let Some(first) = specifier.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphanumeric() || first == '_' || first == '@') {
        return false;
    }
    let head = specifier.split('/').next().unwrap_or(specifier);
    !head.contains(':')
}

/// Check if a specifier points at a remote URL.
#[must_use]
pub fn is_external_url(specifier: &str) -> bool {
    specifier.starts_with("http://")
        || specifier.starts_with("https://")
        || specifier.starts_with("//")
}

/// Get the package name from a specifier (handles subpaths and scoped packages).
#[must_use]
pub fn package_name(specifier: &str) -> &str {
    let end = if specifier.starts_with('@') {
        // Scoped: @scope/pkg or @scope/pkg/subpath
        specifier
            .match_indices('/')
            .nth(1)
            .map_or(specifier.len(), |(i, _)| i)
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };
    &specifier[..end]
}

/// Split a package specifier into its name and optional subpath.
#[must_use]
pub fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name = package_name(specifier);
    let subpath = specifier[name.len()..]
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty());
    (name, subpath)
}

/// Split off a `?query` suffix.
#[must_use]
pub fn split_query(specifier: &str) -> (&str, &str) {
    match specifier.find('?') {
        Some(i) => specifier.split_at(i),
        None => (specifier, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_id() {
        assert_eq!(flatten_id("lodash"), "lodash");
        assert_eq!(flatten_id("@vue/shared"), "@vue_shared");
        assert_eq!(flatten_id("lodash/fp.js"), "lodash_fp__js");
        assert_eq!(flatten_id("virtual:thing"), "virtual_thing");
        assert_eq!(flatten_id("vue > @vue/shared"), "vue___@vue_shared");
        assert_eq!(flatten_id("a>b"), "a___b");
    }

    #[test]
    fn test_is_bare_specifier() {
        assert!(is_bare_specifier("react"));
        assert!(is_bare_specifier("@scope/pkg"));
        assert!(is_bare_specifier("lodash/get"));
        assert!(is_bare_specifier("a"));
        assert!(is_bare_specifier("pkg/a:b"));
        assert!(!is_bare_specifier("./local"));
        assert!(!is_bare_specifier("../parent"));
        assert!(!is_bare_specifier("/absolute"));
        assert!(!is_bare_specifier("node:fs"));
        assert!(!is_bare_specifier("C:\\proj\\a.js"));
        assert!(!is_bare_specifier(""));
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("react"), "react");
        assert_eq!(package_name("react/jsx-runtime"), "react");
        assert_eq!(package_name("@scope/pkg"), "@scope/pkg");
        assert_eq!(package_name("@scope/pkg/utils"), "@scope/pkg");
        assert_eq!(package_name("@scope"), "@scope");
    }

    #[test]
    fn test_split_package_specifier() {
        assert_eq!(split_package_specifier("lodash"), ("lodash", None));
        assert_eq!(split_package_specifier("lodash/get"), ("lodash", Some("get")));
        assert_eq!(
            split_package_specifier("@babel/core/lib/parse"),
            ("@babel/core", Some("lib/parse"))
        );
    }

    #[test]
    fn test_split_query_and_urls() {
        assert_eq!(split_query("a.css?inline"), ("a.css", "?inline"));
        assert_eq!(split_query("a.css"), ("a.css", ""));
        assert!(is_external_url("https://cdn.example.com/x.js"));
        assert!(is_external_url("//cdn.example.com/x.js"));
        assert!(!is_external_url("/proj/x.js"));
    }
}
