//! XML → object mapping on top of `roxmltree`.
//!
//! Elements become JSON-like values keyed by their local name: text-only
//! elements map to strings, elements with children map to objects, and
//! repeated siblings collapse into arrays in document order. Attributes other
//! than namespace declarations are kept under [`ATTRIBUTES_KEY`].
pub use roxmltree::*;
use serde_json::{Map, Value};

/// Key under which non-namespace attributes of an element are collected.
pub const ATTRIBUTES_KEY: &str = "attributes";
/// Key holding the text of an element that also carries attributes.
pub const TEXT_KEY: &str = "$value";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub fn parse(xml: &str) -> Result<Document<'_>, roxmltree::Error> {
    roxmltree::Document::parse(xml)
}

/// Parses `xml` and maps its root element's content to a value.
///
/// The root element itself is not wrapped: for a SOAP envelope the result is
/// `{"Header": .., "Body": ..}`.
pub fn xml_to_value(xml: &str) -> Result<(String, Value), crate::XmlError> {
    let document = parse(xml)?;
    let root = document.root_element();
    tracing::trace!(root = root.tag_name().name(), "mapping XML document to value");
    Ok((root.tag_name().name().to_owned(), element_to_value(root)?))
}

pub fn element_to_value(node: Node<'_, '_>) -> Result<Value, crate::XmlError> {
    if !node.is_element() {
        return Err(crate::XmlError::InvalidNodeType {
            expected: NodeType::Element,
            found: node.node_type(),
        });
    }

    if is_nil(node) {
        return Ok(Value::Null);
    }

    let mut attributes = Map::new();
    for attribute in node.attributes() {
        if attribute.namespace() == Some(XSI_NAMESPACE) {
            continue;
        }
        attributes.insert(
            attribute.name().to_owned(),
            Value::String(attribute.value().to_owned()),
        );
    }

    let mut children = Map::new();
    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let value = element_to_value(child)?;
            insert_repeated(&mut children, child.tag_name().name(), value);
        } else if let Some(fragment) = child.text() {
            text.push_str(fragment);
        }
    }

    let text = text.trim();
    if children.is_empty() {
        if attributes.is_empty() {
            return Ok(if text.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::String(text.to_owned())
            });
        }
        if !text.is_empty() {
            children.insert(TEXT_KEY.to_owned(), Value::String(text.to_owned()));
        }
    }

    if !attributes.is_empty() {
        children.insert(ATTRIBUTES_KEY.to_owned(), Value::Object(attributes));
    }

    Ok(Value::Object(children))
}

fn is_nil(node: Node<'_, '_>) -> bool {
    node.attribute((XSI_NAMESPACE, "nil"))
        .is_some_and(|value| value == "true" || value == "1")
}

fn insert_repeated(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.get_mut(name) {
        None => {
            map.insert(name.to_owned(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}
