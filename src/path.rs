//! Request path normalization.
//!
//! The canonical form of a path has a single leading `/`, no empty segments,
//! no `.` or `..` segments and no trailing `/` (except the root itself).
//! `..` at the root stays at the root.
//!
//! Most request paths are already canonical, so [`normalize`] first scans and
//! only allocates when it finds something to rewrite.

use std::borrow::Cow;

/// Returns the canonical form of `path`, borrowing whenever possible.
pub(crate) fn normalize(path: &str) -> Cow<'_, str> {
    if needs_cleaning(path) {
        return Cow::Owned(clean(path));
    }
    // Only a single trailing slash can be left at this point.
    match path.strip_suffix('/') {
        Some("") | None => Cow::Borrowed(path),
        Some(trimmed) => Cow::Borrowed(trimmed),
    }
}

fn needs_cleaning(path: &str) -> bool {
    !path.starts_with('/')
        || path.contains("//")
        || path.split('/').any(|seg| seg == "." || seg == "..")
}

fn clean(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            seg => stack.push(seg),
        }
    }

    if stack.is_empty() {
        return "/".to_owned();
    }
    let mut out = String::with_capacity(path.len() + 1);
    for seg in stack {
        out.push('/');
        out.push_str(seg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_paths_are_borrowed() {
        for path in ["/", "/users", "/users/42/posts", "/a.b/c..d"] {
            let normalized = normalize(path);
            assert!(matches!(normalized, Cow::Borrowed(_)), "{path}");
            assert_eq!(normalized, path);
        }
    }

    #[test]
    fn trailing_slash_is_trimmed_without_allocating() {
        let normalized = normalize("/users/");
        assert!(matches!(normalized, Cow::Borrowed(_)));
        assert_eq!(normalized, "/users");
    }

    #[test]
    fn cleans_paths() {
        let cases = [
            ("", "/"),
            ("users", "/users"),
            ("//", "/"),
            ("/api///v1///status", "/api/v1/status"),
            ("/api/v1//", "/api/v1"),
            ("/a/./b", "/a/b"),
            ("/a/b/..", "/a"),
            ("/a/b/../c", "/a/c"),
            ("/a/b/../../..", "/"),
            ("/../a", "/a"),
            ("/./", "/"),
            ("/a/..b/c", "/a/..b/c"),
        ];
        for (input, want) in cases {
            assert_eq!(normalize(input), want, "normalize({input:?})");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for path in ["/a//b/./c/../d/", "x/y/..", "/", "/q/"] {
            let once = normalize(path).into_owned();
            assert_eq!(normalize(&once), once);
        }
    }
}
