//! Identifier sanitization and collision-free name generation.

use std::collections::{HashMap, HashSet};

/// Separator between a name and its uniquifying numeric suffix.
pub const SUFFIX_SEPARATOR: &str = "__";

/// Rewrites `name` into a legal Verilog identifier.
///
/// Empty input becomes `_`, a leading digit gains a `_` prefix, and every
/// character that is not ASCII alphanumeric is replaced by `_`.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    out.extend(
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    out
}

/// Hands out sanitized names that have not been handed out before.
///
/// The first request for `foo` yields `foo`; later ones yield `foo__1`,
/// `foo__2`, and so on, skipping anything already reserved.
#[derive(Debug, Clone, Default)]
pub struct NameUniquer {
    used: HashSet<String>,
    next_suffix: HashMap<String, u64>,
}

impl NameUniquer {
    /// Creates an empty uniquer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh name derived from `prefix` and marks it used.
    pub fn unique_name(&mut self, prefix: &str) -> String {
        let root = strip_suffix(&sanitize_identifier(prefix)).to_string();
        if self.used.insert(root.clone()) {
            return root;
        }
        let next = self.next_suffix.entry(root.clone()).or_insert(1);
        loop {
            let candidate = format!("{root}{SUFFIX_SEPARATOR}{next}");
            *next += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Marks `name` as used. Returns false if it already was.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.used.insert(name.to_string())
    }

    /// Returns true if `name` has been handed out or reserved.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

/// Strips a trailing `__<digits>` so `foo__3` uniquifies as `foo`.
fn strip_suffix(name: &str) -> &str {
    match name.rsplit_once(SUFFIX_SEPARATOR) {
        Some((root, digits))
            if !root.is_empty()
                && !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            root
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_identifier(""), "_");
        assert_eq!(sanitize_identifier("foo"), "foo");
        assert_eq!(sanitize_identifier("3com"), "_3com");
        assert_eq!(sanitize_identifier("a.b-c d"), "a_b_c_d");
        assert_eq!(sanitize_identifier("_ok_1"), "_ok_1");
        assert_eq!(sanitize_identifier("9"), "_9");
    }

    #[test]
    fn sequential_suffixes() {
        let mut u = NameUniquer::new();
        assert_eq!(u.unique_name("foo"), "foo");
        assert_eq!(u.unique_name("foo"), "foo__1");
        assert_eq!(u.unique_name("foo"), "foo__2");
        assert_eq!(u.unique_name("bar"), "bar");
    }

    #[test]
    fn suffixed_request_shares_root() {
        let mut u = NameUniquer::new();
        assert_eq!(u.unique_name("foo__7"), "foo");
        assert_eq!(u.unique_name("foo"), "foo__1");
    }

    #[test]
    fn skips_reserved() {
        let mut u = NameUniquer::new();
        assert!(u.reserve("x"));
        assert!(u.reserve("x__1"));
        assert!(!u.reserve("x"));
        assert_eq!(u.unique_name("x"), "x__2");
        assert!(u.is_used("x__2"));
    }

    #[test]
    fn sanitizes_before_uniquing() {
        let mut u = NameUniquer::new();
        assert_eq!(u.unique_name("a.b"), "a_b");
        assert_eq!(u.unique_name("a-b"), "a_b__1");
        assert_eq!(u.unique_name(""), "_");
    }
}
