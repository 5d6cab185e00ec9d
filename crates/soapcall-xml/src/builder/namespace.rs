use core::fmt;
use std::hash::Hash;

/// An XML namespace, identified by its URI only.
///
/// Prefixes are not part of a namespace's identity: the same URI may be
/// declared under several aliases, and the alias used for a given element is
/// resolved from the declarations in scope when the document is written.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Namespace<'a> {
    pub url: &'a str,
}

impl PartialEq for Namespace<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl fmt::Display for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}

impl Hash for Namespace<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl<'a> From<&'a str> for Namespace<'a> {
    fn from(url: &'a str) -> Self {
        Self::new(url)
    }
}

impl<'a> Namespace<'a> {
    /// Creates a new instance of `Namespace` with the given URI.
    ///
    /// # Example
    ///
    /// ```
    /// use soapcall_xml::builder::Namespace;
    /// let namespace = Namespace::new("http://schemas.xmlsoap.org/soap/envelope/");
    /// ```
    pub fn new(uri: &'a str) -> Self {
        Self { url: uri }
    }
}
