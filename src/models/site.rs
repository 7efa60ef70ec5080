use serde::{Deserialize, Serialize};
use std::fmt;

/// One roster entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Site {
    /// Display name used in the report
    pub name: String,
    /// Absolute http(s) URL probed with a single GET
    pub url: String,
}

impl Site {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Builds the reference roster from `(name, url)` pairs
    pub fn roster_from_pairs(pairs: &[(&str, &str)]) -> Vec<Site> {
        pairs.iter().map(|(name, url)| Site::new(*name, *url)).collect()
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
