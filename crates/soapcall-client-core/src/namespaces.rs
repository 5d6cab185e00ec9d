use crate::{SoapCoreError, envelope::SOAP_ENVELOPE_NS};

/// Prefix that, when declared, also becomes the envelope's default namespace.
pub const TARGET_NAMESPACE_PREFIX: &str = "targetNamespace";
/// Prefix bound by the envelope itself.
pub const SOAP_PREFIX: &str = "soap";

/// User-declared envelope namespaces, in declaration order.
///
/// A prefix is bound at most once: re-declaring it with the same URI is a
/// no-op, with a different URI a [`SoapCoreError::NamespaceConflict`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<(), SoapCoreError> {
        self.declare_all([(prefix.into(), uri.into())])
    }

    /// Declares every pair or none of them.
    pub fn declare_all<P, U>(
        &mut self,
        mapping: impl IntoIterator<Item = (P, U)>,
    ) -> Result<(), SoapCoreError>
    where
        P: Into<String>,
        U: Into<String>,
    {
        let mut pending: Vec<(String, String)> = Vec::new();

        for (prefix, uri) in mapping {
            let (prefix, uri) = (prefix.into(), uri.into());

            let bound = if prefix == SOAP_PREFIX {
                Some(SOAP_ENVELOPE_NS)
            } else {
                self.get(&prefix).or_else(|| {
                    pending
                        .iter()
                        .find(|(existing, _)| *existing == prefix)
                        .map(|(_, uri)| uri.as_str())
                })
            };

            match bound {
                Some(existing) if existing == uri => {}
                Some(existing) => {
                    return Err(SoapCoreError::NamespaceConflict {
                        existing: existing.to_owned(),
                        prefix,
                        attempted: uri,
                    });
                }
                None => pending.push((prefix, uri)),
            }
        }

        self.entries.extend(pending);
        Ok(())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        prefix == SOAP_PREFIX || self.get(prefix).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.get(TARGET_NAMESPACE_PREFIX)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeclaring_same_uri_is_a_noop() {
        let mut table = NamespaceTable::new();
        table.declare("ns0", "urn:a").unwrap();
        table.declare("ns0", "urn:a").unwrap();

        assert_eq!(table.iter().collect::<Vec<_>>(), vec![("ns0", "urn:a")]);
    }

    #[test]
    fn test_rebinding_prefix_fails() {
        let mut table = NamespaceTable::new();
        table.declare("ns0", "urn:a").unwrap();

        let err = table.declare("ns0", "urn:b").unwrap_err();
        match err {
            SoapCoreError::NamespaceConflict {
                prefix,
                existing,
                attempted,
            } => {
                assert_eq!(prefix, "ns0");
                assert_eq!(existing, "urn:a");
                assert_eq!(attempted, "urn:b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(table.get("ns0"), Some("urn:a"));
    }

    #[test]
    fn test_bulk_declaration_is_all_or_nothing() {
        let mut table = NamespaceTable::new();
        table.declare("ns0", "urn:a").unwrap();

        let result = table.declare_all([("ns1", "urn:b"), ("ns0", "urn:other")]);
        assert!(result.is_err());
        assert_eq!(table.get("ns1"), None);

        let result = table.declare_all([("ns2", "urn:c"), ("ns2", "urn:d")]);
        assert!(result.is_err());
        assert_eq!(table.get("ns2"), None);
    }

    #[test]
    fn test_soap_prefix_is_reserved() {
        let mut table = NamespaceTable::new();
        table.declare(SOAP_PREFIX, SOAP_ENVELOPE_NS).unwrap();
        assert!(table.is_empty());

        assert!(table.declare(SOAP_PREFIX, "urn:not-soap").is_err());
    }

    #[test]
    fn test_target_namespace_prefix() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.target_namespace(), None);
        table.declare(TARGET_NAMESPACE_PREFIX, "urn:svc").unwrap();
        assert_eq!(table.target_namespace(), Some("urn:svc"));
    }
}
