use std::borrow::Cow;

use crate::builder::{AliasMap, Namespace, NamespaceWrite, XmlBuilderError};

/// Represents an XML attribute with a name and value.
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// The name of the attribute.
    name: &'a str,
    /// The value of the attribute, escaped when written.
    value: Cow<'a, str>,

    namespace: Option<Namespace<'a>>,
}

impl<'a> Attribute<'a> {
    /// Creates a new instance of `Attribute`.
    ///
    /// # Example
    ///
    /// ```
    /// use soapcall_xml::builder::Attribute;
    /// let attribute = Attribute::new("name", "value");
    /// ```
    pub fn new(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            value: value.into(),
            namespace: None,
        }
    }

    pub fn new_with_namespace(
        name: &'a str,
        value: impl Into<Cow<'a, str>>,
        namespace: Option<impl Into<Namespace<'a>>>,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            namespace: namespace.map(Into::into),
        }
    }

}

impl<'a> NamespaceWrite<'a> for Attribute<'a> {
    fn ns_write<W: std::io::Write>(
        &self,
        w: &mut W,
        alias_map: Option<&AliasMap<'a>>,
    ) -> Result<(), XmlBuilderError> {
        let name = match &self.namespace {
            None => Cow::Borrowed(self.name),
            Some(ns) => {
                let Some(map) = alias_map else {
                    return Err(XmlBuilderError::MissingAliasMapForAttribute {
                        attr: self.name.to_string(),
                        ns: ns.url.to_string(),
                    });
                };
                match map.get(ns) {
                    Some(Some(alias)) => Cow::Owned(format!("{alias}:{}", self.name)),
                    // Unprefixed attributes never pick up the default namespace.
                    Some(None) => {
                        return Err(XmlBuilderError::NamespaceHasNoAlias {
                            tag: self.name.to_string(),
                            ns: ns.url.to_string(),
                        });
                    }
                    None => {
                        return Err(XmlBuilderError::NamespaceNotDeclared {
                            tag: self.name.to_string(),
                            ns: ns.url.to_string(),
                        });
                    }
                }
            }
        };

        let value = quick_xml::escape::escape(self.value.as_ref());
        w.write_fmt(format_args!(" {name}=\"{value}\""))?;
        Ok(())
    }
}
