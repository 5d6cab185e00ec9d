//! In-memory service description: services → ports → binding → methods.
//!
//! Parsing a WSDL document into this model is not the job of this crate; the
//! model derives `Deserialize` so that a pre-processed description can be
//! loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Namespaces never contributed to the envelope by the definition.
const INFRASTRUCTURE_NAMESPACES: [&str; 3] = [
    "http://schemas.xmlsoap.org/",
    "http://www.w3.org/",
    "http://xml.apache.org/",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Rpc,
    Document,
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rpc => write!(f, "rpc"),
            Self::Document => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Where a document-style message element lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageShape {
    /// RPC-style message made of named parts.
    Parts(Vec<Part>),
    /// Document-style message: a single element named after the message.
    Element(ElementRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    #[serde(flatten)]
    pub shape: MessageShape,
}

impl Message {
    pub fn parts(name: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            name: name.into(),
            shape: MessageShape::Parts(parts),
        }
    }

    pub fn element(
        name: impl Into<String>,
        namespace_alias: Option<&str>,
        namespace_uri: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            shape: MessageShape::Element(ElementRef {
                namespace_alias: namespace_alias.map(str::to_owned),
                namespace_uri: namespace_uri.map(str::to_owned),
            }),
        }
    }

    fn describe(&self) -> Value {
        match &self.shape {
            MessageShape::Parts(parts) => {
                let parts: Map<String, Value> = parts
                    .iter()
                    .map(|part| {
                        let type_name = part.type_name.clone().map_or(Value::Null, Value::String);
                        (part.name.clone(), type_name)
                    })
                    .collect();
                json!({ "name": self.name, "parts": parts })
            }
            MessageShape::Element(element) => json!({
                "name": self.name,
                "element": self.name,
                "namespace": element.namespace_uri,
            }),
        }
    }
}

/// A single operation of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub input: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_action: Option<String>,
    /// `use` of the input body, `"encoded"` or `"literal"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_encoding: Option<String>,
}

impl Method {
    pub fn is_encoded(&self) -> bool {
        self.input_encoding.as_deref() == Some("encoded")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub location: String,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    pub target_namespace: String,
    /// Alias → URI table declared by the description.
    #[serde(default)]
    pub xmlns: BTreeMap<String, String>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Definitions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reverse lookup of the alias declared for `namespace`.
    pub fn alias_for(&self, namespace: &str) -> Option<&str> {
        self.xmlns
            .iter()
            .find(|(alias, uri)| !alias.is_empty() && uri.as_str() == namespace)
            .map(|(alias, _)| alias.as_str())
    }

    /// Namespaces of the description that belong on the envelope root.
    pub fn envelope_namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.xmlns
            .iter()
            .filter(|(alias, uri)| {
                !alias.is_empty()
                    && !INFRASTRUCTURE_NAMESPACES
                        .iter()
                        .any(|prefix| uri.starts_with(prefix))
            })
            .map(|(alias, uri)| (alias.as_str(), uri.as_str()))
    }

    /// Nested description: service → port → method → `{input, output}`.
    pub fn describe(&self) -> Value {
        let services: Map<String, Value> = self
            .services
            .iter()
            .map(|service| {
                let ports: Map<String, Value> = service
                    .ports
                    .iter()
                    .map(|port| {
                        let methods: Map<String, Value> = port
                            .binding
                            .methods
                            .iter()
                            .map(|method| {
                                let output = method.output.as_ref().map_or(Value::Null, Message::describe);
                                (
                                    method.name.clone(),
                                    json!({ "input": method.input.describe(), "output": output }),
                                )
                            })
                            .collect();
                        (port.name.clone(), Value::Object(methods))
                    })
                    .collect();
                (service.name.clone(), Value::Object(ports))
            })
            .collect();
        Value::Object(services)
    }
}
