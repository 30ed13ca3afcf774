//! Scope names, the public scope catalog, and the per-operation required set.
use std::collections::BTreeSet;
use std::fmt;

pub const TRADE: &str = "trade";
pub const ADMIN: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeInfo {
    pub name: &'static str,
    pub description: &'static str,
}

const CATALOG: &[ScopeInfo] = &[
    ScopeInfo {
        name: TRADE,
        description: "create and run trade systems",
    },
    ScopeInfo {
        name: ADMIN,
        description: "ultimate access",
    },
];

/// Scopes a token may be issued with.
pub fn catalog() -> &'static [ScopeInfo] {
    CATALOG
}

pub fn describe(name: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.description)
}

pub fn is_known(name: &str) -> bool {
    describe(name).is_some()
}

/// First name not in the catalog, if any.
pub fn first_unknown<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    names.iter().map(|s| s.as_ref()).find(|s| !is_known(s))
}

/// Capabilities demanded by one protected operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredScopes(BTreeSet<String>);

impl RequiredScopes {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scopes.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-separated, sorted (OAuth2 `scope` parameter form).
    pub fn scope_str(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    /// First required scope not present in `granted`.
    pub fn first_missing(&self, granted: &BTreeSet<String>) -> Option<&str> {
        self.iter().find(|s| !granted.contains(*s))
    }
}

impl fmt::Display for RequiredScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope_str())
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredScopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for RequiredScopes {
    fn from(scopes: [S; N]) -> Self {
        Self::new(scopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(scopes: &[&str]) -> BTreeSet<String> {
        scopes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scope_str_is_sorted_and_space_separated() {
        let required = RequiredScopes::from(["trade", "admin"]);
        assert_eq!(required.scope_str(), "admin trade");
        assert_eq!(RequiredScopes::none().scope_str(), "");
        assert!(RequiredScopes::none().is_empty());
    }

    #[test]
    fn subset_has_no_missing_scope() {
        let required = RequiredScopes::from([TRADE]);
        assert_eq!(required.first_missing(&granted(&["trade", "admin"])), None);
        assert_eq!(RequiredScopes::none().first_missing(&granted(&[])), None);
    }

    #[test]
    fn reports_first_missing_scope() {
        let required = RequiredScopes::from(["admin", "trade"]);
        assert_eq!(required.first_missing(&granted(&["trade"])), Some("admin"));
    }

    #[test]
    fn catalog_describes_known_scopes() {
        assert_eq!(describe(TRADE), Some("create and run trade systems"));
        assert!(is_known(ADMIN));
        assert!(!is_known("root"));
    }

    #[test]
    fn first_unknown_skips_catalog_names() {
        assert_eq!(first_unknown(&[TRADE, ADMIN]), None);
        assert_eq!(first_unknown(&["trade", "root", "sudo"]), Some("root"));
        assert_eq!(first_unknown::<&str>(&[]), None);
    }
}
