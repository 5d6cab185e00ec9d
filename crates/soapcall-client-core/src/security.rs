use std::fmt::Debug;

use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use soapcall_xml::builder::{Attribute, Element, element_to_string};

use crate::http::{Headers, RequestOptions};

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_TEXT: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Hooks a security scheme plugs into every outgoing request.
///
/// All hooks are optional; the defaults contribute nothing.
pub trait Security: Debug + Send + Sync {
    fn add_headers(&self, _headers: &mut Headers) {}

    fn add_options(&self, _options: &mut RequestOptions) {}

    /// XML appended to the envelope's header section.
    fn to_xml(&self) -> Result<String, soapcall_xml::XmlError> {
        Ok(String::new())
    }
}

/// HTTP basic authentication.
#[derive(Clone)]
pub struct BasicAuthSecurity {
    username: String,
    password: String,
}

impl BasicAuthSecurity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for BasicAuthSecurity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthSecurity")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Security for BasicAuthSecurity {
    /// Adds `Authorization: Basic <base64(username:password)>`.
    /// WARNING: never log the resulting header value.
    fn add_headers(&self, headers: &mut Headers) {
        let creds = format!("{}:{}", self.username, self.password);
        let b64 = base64::engine::general_purpose::STANDARD.encode(creds.as_bytes());
        headers.insert("Authorization", format!("Basic {b64}"));
    }
}

/// WS-Security `UsernameToken` with a plain-text password and a timestamp.
#[derive(Clone)]
pub struct WsSecurity {
    username: String,
    password: String,
    validity: Duration,
}

impl WsSecurity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            validity: Duration::minutes(10),
        }
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    fn security_header(&self, now: DateTime<Utc>) -> Result<String, soapcall_xml::XmlError> {
        let created = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let expires = (now + self.validity).to_rfc3339_opts(SecondsFormat::Secs, true);
        let timestamp_id = format!("Timestamp-{}", uuid::Uuid::new_v4());
        let token_id = format!("UsernameToken-{}", uuid::Uuid::new_v4());

        let timestamp = Element::new("Timestamp")
            .set_namespace(WSU_NS)
            .add_attribute(Attribute::new_with_namespace("Id", timestamp_id.as_str(), Some(WSU_NS)))
            .add_child(Element::new("Created").set_namespace(WSU_NS).set_text(created.as_str()))
            .add_child(Element::new("Expires").set_namespace(WSU_NS).set_text(expires.as_str()));

        let token = Element::new("UsernameToken")
            .set_namespace(WSSE_NS)
            .add_attribute(Attribute::new_with_namespace("Id", token_id.as_str(), Some(WSU_NS)))
            .add_child(
                Element::new("Username")
                    .set_namespace(WSSE_NS)
                    .set_text(self.username.as_str()),
            )
            .add_child(
                Element::new("Password")
                    .set_namespace(WSSE_NS)
                    .add_attribute(Attribute::new("Type", PASSWORD_TEXT))
                    .set_text(self.password.as_str()),
            )
            .add_child(Element::new("Created").set_namespace(WSU_NS).set_text(created.as_str()));

        let security = Element::new("Security")
            .set_namespace(WSSE_NS)
            .add_namespace_declaration(WSSE_NS, Some("wsse"))
            .add_namespace_declaration(WSU_NS, Some("wsu"))
            .add_child(timestamp)
            .add_child(token);

        Ok(element_to_string(&security)?)
    }
}

impl Debug for WsSecurity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSecurity")
            .field("username", &self.username)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl Security for WsSecurity {
    fn to_xml(&self) -> Result<String, soapcall_xml::XmlError> {
        self.security_header(Utc::now())
    }
}

/// Fixed transport options, e.g. a timeout or relaxed certificate checks.
#[derive(Debug, Clone, Default)]
pub struct ClientOptionsSecurity {
    options: RequestOptions,
}

impl ClientOptionsSecurity {
    pub fn new(options: RequestOptions) -> Self {
        Self { options }
    }
}

impl Security for ClientOptionsSecurity {
    fn add_options(&self, options: &mut RequestOptions) {
        options.merge(&self.options);
    }
}
