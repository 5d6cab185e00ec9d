use serde_json::Value;
use soapcall_xml::XmlError;

/// Object ↔ XML conversion used for message bodies, header blocks and
/// responses. Every method is pure.
pub trait XmlMapper: std::fmt::Debug + Send + Sync {
    fn object_to_rpc_xml(
        &self,
        name: &str,
        value: &Value,
        alias: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<String, XmlError>;

    fn object_to_document_xml(
        &self,
        name: &str,
        value: &Value,
        alias: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<String, XmlError>;

    fn object_to_xml(
        &self,
        value: &Value,
        name: Option<&str>,
        alias: Option<&str>,
        xmlns: Option<&str>,
    ) -> Result<String, XmlError>;

    /// Parses a response document into `(root local name, content)`.
    fn xml_to_object(&self, xml: &str) -> Result<(String, Value), XmlError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultXmlMapper;

impl XmlMapper for DefaultXmlMapper {
    fn object_to_rpc_xml(
        &self,
        name: &str,
        value: &Value,
        alias: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<String, XmlError> {
        soapcall_xml::mapper::object_to_rpc_xml(name, value, alias, namespace)
    }

    fn object_to_document_xml(
        &self,
        name: &str,
        value: &Value,
        alias: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<String, XmlError> {
        soapcall_xml::mapper::object_to_document_xml(name, value, alias, namespace)
    }

    fn object_to_xml(
        &self,
        value: &Value,
        name: Option<&str>,
        alias: Option<&str>,
        xmlns: Option<&str>,
    ) -> Result<String, XmlError> {
        soapcall_xml::mapper::object_to_xml(value, name, alias, xmlns)
    }

    fn xml_to_object(&self, xml: &str) -> Result<(String, Value), XmlError> {
        soapcall_xml::parser::xml_to_value(xml)
    }
}
