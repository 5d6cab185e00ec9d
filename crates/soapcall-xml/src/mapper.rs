//! Object → XML mappers for message bodies and header blocks.
//!
//! Values are `serde_json::Value` trees. Objects become one child element per
//! key (in key order), arrays repeat the element named by their key, scalars
//! become escaped text and `null` becomes an empty element.

use std::borrow::Cow;

use serde_json::Value;

use crate::builder::{Element, Namespace, element_to_string};

/// Key skipped by the RPC mapper; callers used it to smuggle a namespace in
/// with the arguments.
pub const RPC_XMLNS_KEY: &str = "_xmlns";

/// Prefix bound on an RPC wrapper whose namespace has no alias.
pub const RPC_WRAPPER_PREFIX: &str = "ns";

/// How the elements produced by a mapper are qualified.
#[derive(Debug, Clone, Copy)]
enum Qualifier<'a> {
    Unqualified,
    /// The alias is bound elsewhere (typically on the envelope).
    Prefix(&'a str),
    /// Elements live in the namespace, declared on each top-level element.
    Namespace {
        alias: Option<&'a str>,
        url: &'a str,
    },
}

impl<'a> Qualifier<'a> {
    fn new(alias: Option<&'a str>, url: Option<&'a str>) -> Self {
        match (alias, url) {
            (alias, Some(url)) => Self::Namespace { alias, url },
            (Some(alias), None) => Self::Prefix(alias),
            (None, None) => Self::Unqualified,
        }
    }

    fn element(self, name: &'a str) -> Element<'a> {
        match self {
            Self::Unqualified => Element::new(name),
            Self::Prefix(alias) => Element::new(format!("{alias}:{name}")),
            Self::Namespace { url, .. } => Element::new(name).set_namespace(Namespace::new(url)),
        }
    }

    fn declare(self, element: Element<'a>) -> Element<'a> {
        match self {
            Self::Namespace { alias, url } => element.add_namespace_declaration(url, alias),
            _ => element,
        }
    }
}

/// Serializes a document/literal message: `value` wrapped in the message's
/// declared element, every element qualified by `alias`/`namespace`.
pub fn object_to_document_xml(
    name: &str,
    value: &Value,
    alias: Option<&str>,
    namespace: Option<&str>,
) -> Result<String, crate::XmlError> {
    let qualifier = Qualifier::new(alias, namespace);
    let elements = value_to_elements(name, value, qualifier)
        .into_iter()
        .map(|element| qualifier.declare(element));
    write_all(elements)
}

/// Serializes an RPC message: a wrapper element named after the operation,
/// qualified by `alias`/`namespace`, with one unqualified accessor element per
/// argument.
///
/// A default-namespace declaration on the wrapper would be inherited by the
/// accessors, so a namespace without an alias is bound to
/// [`RPC_WRAPPER_PREFIX`] instead.
pub fn object_to_rpc_xml(
    name: &str,
    value: &Value,
    alias: Option<&str>,
    namespace: Option<&str>,
) -> Result<String, crate::XmlError> {
    let qualifier = Qualifier::new(alias.or(namespace.map(|_| RPC_WRAPPER_PREFIX)), namespace);
    let mut wrapper = qualifier.declare(qualifier.element(name));

    match value {
        Value::Object(arguments) => {
            for (key, argument) in arguments {
                if key == RPC_XMLNS_KEY {
                    continue;
                }
                wrapper = wrapper.add_children(value_to_elements(
                    key,
                    argument,
                    Qualifier::Unqualified,
                ));
            }
        }
        Value::Null => {}
        scalar => wrapper = wrapper.set_text(scalar_text(scalar)),
    }

    write_all(std::iter::once(wrapper))
}

/// Serializes an arbitrary value, used for SOAP header blocks.
///
/// With a `name` the whole value is wrapped in that element; without one an
/// object contributes one element per key and a scalar its escaped text.
/// `xmlns` declares the namespace of the produced elements under `alias` (or
/// as the default namespace when no alias is given).
pub fn object_to_xml(
    value: &Value,
    name: Option<&str>,
    alias: Option<&str>,
    xmlns: Option<&str>,
) -> Result<String, crate::XmlError> {
    let qualifier = Qualifier::new(alias, xmlns);

    let elements = match (name, value) {
        (Some(name), value) => value_to_elements(name, value, qualifier),
        (None, Value::Object(entries)) => entries
            .iter()
            .flat_map(|(key, child)| value_to_elements(key, child, qualifier))
            .collect(),
        (None, Value::Array(items)) => {
            let mut out = String::new();
            for item in items {
                out.push_str(&object_to_xml(item, None, alias, xmlns)?);
            }
            return Ok(out);
        }
        (None, Value::Null) => return Ok(String::new()),
        (None, scalar) => {
            return Ok(quick_xml::escape::partial_escape(scalar_text(scalar).as_ref()).into_owned());
        }
    };

    write_all(elements.into_iter().map(|element| qualifier.declare(element)))
}

fn value_to_elements<'a>(name: &'a str, value: &'a Value, qualifier: Qualifier<'a>) -> Vec<Element<'a>> {
    match value {
        Value::Array(items) => items
            .iter()
            .flat_map(|item| value_to_elements(name, item, qualifier))
            .collect(),
        Value::Object(entries) => {
            let children = entries
                .iter()
                .flat_map(|(key, child)| value_to_elements(key, child, qualifier))
                .collect();
            vec![qualifier.element(name).add_children(children)]
        }
        Value::Null => vec![qualifier.element(name)],
        scalar => vec![qualifier.element(name).set_text(scalar_text(scalar))],
    }
}

fn scalar_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Bool(flag) => Cow::Owned(flag.to_string()),
        Value::Number(number) => Cow::Owned(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Cow::Borrowed(""),
    }
}

fn write_all<'a>(elements: impl Iterator<Item = Element<'a>>) -> Result<String, crate::XmlError> {
    let mut out = String::new();
    for element in elements {
        out.push_str(&element_to_string(&element)?);
    }
    Ok(out)
}
