//! Registered upstream representation.

use url::Url;

/// A single registered upstream application.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Logical name the upstream registered under.
    pub name: String,
    /// Pre-parsed callback URL; only scheme and authority are used when
    /// forwarding, the inbound path and query replace any callback path.
    pub callback: Url,
}

impl Upstream {
    /// Create a new upstream entry.
    pub fn new(name: impl Into<String>, callback: Url) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.name, self.callback)
    }
}
