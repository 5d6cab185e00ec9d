use soapcall_xml::builder::{Attribute, Element, element_to_string};

use crate::namespaces::{NamespaceTable, SOAP_PREFIX};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Everything that goes into one request envelope.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParts<'a> {
    /// Adds `soap:encodingStyle` for SOAP-encoded RPC bodies.
    pub encoded: bool,
    pub user_namespaces: &'a NamespaceTable,
    /// Alias/URI pairs contributed by the service description.
    pub definition_namespaces: &'a [(&'a str, &'a str)],
    pub soap_headers: &'a [String],
    pub security_xml: Option<&'a str>,
    pub body: &'a str,
}

/// Assembles a SOAP 1.1 envelope.
///
/// The root declares the `soap` prefix, every user namespace (plus a default
/// namespace when `targetNamespace` was declared) and the description's
/// namespaces whose prefix the user did not claim. The header section is
/// always present: attached fragments joined by newlines, then the security
/// contribution.
pub fn build_envelope(parts: EnvelopeParts<'_>) -> Result<String, soapcall_xml::XmlError> {
    let mut envelope = Element::new("Envelope")
        .set_namespace(SOAP_ENVELOPE_NS)
        .add_namespace_declaration(SOAP_ENVELOPE_NS, Some(SOAP_PREFIX));

    for (prefix, uri) in parts.user_namespaces.iter() {
        envelope = envelope.add_namespace_declaration(uri, Some(prefix));
    }
    if let Some(target_namespace) = parts.user_namespaces.target_namespace() {
        envelope = envelope.add_namespace_declaration(target_namespace, None);
    }

    for &(alias, uri) in parts.definition_namespaces {
        if !parts.user_namespaces.contains_prefix(alias) {
            envelope = envelope.add_namespace_declaration(uri, Some(alias));
        }
    }

    if parts.encoded {
        envelope = envelope.add_attribute(Attribute::new_with_namespace(
            "encodingStyle",
            SOAP_ENCODING_NS,
            Some(SOAP_ENVELOPE_NS),
        ));
    }

    let mut header = parts.soap_headers.join("\n");
    if let Some(security_xml) = parts.security_xml {
        header.push_str(security_xml);
    }

    let envelope = envelope
        .add_child(
            Element::new("Header")
                .set_namespace(SOAP_ENVELOPE_NS)
                .set_raw(header),
        )
        .add_child(
            Element::new("Body")
                .set_namespace(SOAP_ENVELOPE_NS)
                .set_raw(parts.body),
        );

    Ok(element_to_string(&envelope)?)
}
