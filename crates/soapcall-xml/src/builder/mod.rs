//! A small XML writer with namespace-alias resolution.
//!
//! Elements carry the namespace they belong to and the `xmlns` declarations
//! they introduce; the alias used for every qualified name is resolved from
//! the declarations in scope while the tree is written.
mod attribute;
mod element;
mod namespace;

use std::collections::HashMap;

pub use self::attribute::*;
pub use self::element::*;
pub use self::namespace::*;

/// Namespace → alias bindings in scope; `None` marks the default namespace.
pub type AliasMap<'a> = HashMap<Namespace<'a>, Option<&'a str>>;

#[derive(Debug, thiserror::Error)]
pub enum XmlBuilderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("Missing alias map for attribute '{attr}' in namespace '{ns}'")]
    MissingAliasMapForAttribute { attr: String, ns: String },
    #[error("Namespace '{ns}' not declared for tag '{tag}'")]
    NamespaceNotDeclared { tag: String, ns: String },
    #[error("Namespace '{ns}' has no alias for tag '{tag}'")]
    NamespaceHasNoAlias { tag: String, ns: String },
}

pub trait NamespaceWrite<'a> {
    fn ns_write<W: std::io::Write>(
        &self,
        w: &mut W,
        aliases: Option<&AliasMap<'a>>,
    ) -> Result<(), XmlBuilderError>;
}

/// Writes an element tree; the root starts with no namespace in scope.
pub fn element_to_string(element: &Element<'_>) -> Result<String, XmlBuilderError> {
    let mut buf = Vec::new();
    element.ns_write(&mut buf, None)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_xml() {
        let xml_string = element_to_string(&Element::new("root")).unwrap();
        assert_eq!(xml_string, "<root/>");
    }

    #[test]
    fn test_xml_with_attributes() {
        let element = Element::new("root").add_attribute(Attribute::new("attr1", "value1"));
        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, r#"<root attr1="value1"/>"#);
    }

    #[test]
    fn test_xml_with_child_elements() {
        let element = Element::new("root").add_child(Element::new("child"));
        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<root><child/></root>");
    }

    #[test]
    fn test_xml_with_namespaces() {
        let element = Element::new("root")
            .set_namespace("http://example.com/ns1")
            .add_namespace_declaration("http://example.com/ns1", Some("ns1"));

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(
            xml_string,
            r#"<ns1:root xmlns:ns1="http://example.com/ns1"/>"#
        );
    }

    #[test]
    fn test_full_xml_document() {
        let child = Element::new("child")
            .set_namespace("http://example.com/ns2")
            .add_attribute(Attribute::new("attr2", "value2"));
        let element = Element::new("root")
            .set_namespace("http://example.com/ns1")
            .add_namespace_declaration("http://example.com/ns1", Some("ns1"))
            .add_namespace_declaration("http://example.com/ns2", Some("ns2"))
            .add_attribute(Attribute::new("attr1", "value1"))
            .add_child(child);

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(
            xml_string,
            concat!(
                r#"<ns1:root xmlns:ns1="http://example.com/ns1" xmlns:ns2="http://example.com/ns2" attr1="value1">"#,
                r#"<ns2:child attr2="value2"/></ns1:root>"#
            )
        );
    }

    #[test]
    fn test_setting_text_overwrites_children() {
        let element = Element::new("container")
            .add_child(Element::new("item"))
            .set_text("New text");

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<container>New text</container>");
    }

    #[test]
    fn test_adding_child_overwrites_text() {
        let element = Element::new("container")
            .set_text("Initial text")
            .add_child(Element::new("item"));

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<container><item/></container>");
    }

    #[test]
    fn test_owned_name_and_text() {
        let element = Element::new(String::from("count")).set_text(42.to_string());

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<count>42</count>");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let element = Element::new("test")
            .add_attribute(Attribute::new("name", r#"a "quoted" <value>"#))
            .set_text("Text with <>& characters");

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(
            xml_string,
            r#"<test name="a &quot;quoted&quot; &lt;value&gt;">Text with &lt;&gt;&amp; characters</test>"#
        );
    }

    #[test]
    fn test_raw_content_is_written_verbatim() {
        let element = Element::new("wrapper").set_raw("<a>1</a>\n<b/>");
        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<wrapper><a>1</a>\n<b/></wrapper>");
    }

    #[test]
    fn test_empty_raw_content_keeps_end_tag() {
        let element = Element::new("Header").set_raw("");
        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, "<Header></Header>");
    }

    #[test]
    fn test_inherited_namespace_declarations() {
        let grandchild = Element::new("grandchild").set_namespace("http://example.com/ns1");
        let child = Element::new("child")
            .set_namespace("http://example.com/ns2")
            .add_child(grandchild);
        let root = Element::new("root")
            .add_namespace_declaration("http://example.com/ns1", Some("ns1"))
            .add_namespace_declaration("http://example.com/ns2", Some("ns2"))
            .add_child(child);

        let xml_string = element_to_string(&root).unwrap();
        assert!(xml_string.contains("<ns2:child><ns1:grandchild/></ns2:child>"));
    }

    #[test]
    fn test_namespace_override_in_child() {
        let child = Element::new("child")
            .set_namespace("http://example.com/ns1")
            .add_namespace_declaration("http://example.com/ns1", Some("override"));
        let root = Element::new("root")
            .add_namespace_declaration("http://example.com/ns1", Some("ns1"))
            .add_child(child);

        let xml_string = element_to_string(&root).unwrap();
        assert!(xml_string.contains(r#"<override:child xmlns:override="http://example.com/ns1"/>"#));
    }

    #[test]
    fn test_first_alias_on_same_element_wins() {
        let element = Element::new("root")
            .set_namespace("urn:a")
            .add_namespace_declaration("urn:a", Some("first"))
            .add_namespace_declaration("urn:a", Some("second"));

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(
            xml_string,
            r#"<first:root xmlns:first="urn:a" xmlns:second="urn:a"/>"#
        );
    }

    #[test]
    fn test_default_namespace() {
        let element = Element::new("root")
            .set_namespace("http://example.com/default")
            .add_namespace_declaration("http://example.com/default", None);

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(xml_string, r#"<root xmlns="http://example.com/default"/>"#);
    }

    #[test]
    fn test_undeclared_namespace_is_an_error() {
        let element = Element::new("root").set_namespace("urn:missing");
        let err = element_to_string(&element).unwrap_err();
        assert!(matches!(err, XmlBuilderError::NamespaceNotDeclared { .. }));
    }

    #[test]
    fn test_attribute_with_namespace() {
        let attr = Attribute::new_with_namespace("attr", "value", Some("http://example.com"));
        let element = Element::new("test")
            .add_attribute(attr)
            .add_namespace_declaration("http://example.com", Some("ex"));

        let xml_string = element_to_string(&element).unwrap();
        assert_eq!(
            xml_string,
            r#"<test xmlns:ex="http://example.com" ex:attr="value"/>"#
        );
    }

    #[test]
    fn test_namespace_equality_ignores_alias() {
        let ns1 = Namespace::new("http://example.com");
        let ns2: Namespace = "http://example.com".into();
        assert_eq!(ns1, ns2);
        assert_ne!(ns1, Namespace::new("http://different.com"));
        assert_eq!(ns1.to_string(), "http://example.com");
    }
}
