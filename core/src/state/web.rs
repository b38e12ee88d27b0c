use std::fmt;

/// Address of the web dashboard. The empty value means no browser UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebUrl(String);

impl WebUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into().trim().to_string())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host the web server binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebHost(String);

impl WebHost {
    pub const WILDCARD: &'static str = "0.0.0.0";

    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
