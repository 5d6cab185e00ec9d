use std::{
    borrow::Cow,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::{
    SoapCoreError,
    config::{ClientConfig, SoapActionResolver},
    debug::{DebugLabel, DebugSink, DebugTarget},
    definition::{Definitions, MessageShape, Method, Style},
    envelope::{EnvelopeParts, build_envelope},
    http::{
        CONTENT_TYPE_HEADER, Headers, HttpRequest, RequestOptions, SOAP_ACTION_HEADER,
        SOAP_CONTENT_TYPE,
    },
    mapper::XmlMapper,
    namespaces::NamespaceTable,
    proxy::{BoundMethod, ServiceProxies},
    response::{PendingResponse, PreparedCall},
    security::Security,
};

/// Arguments of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arguments {
    /// Serialized by the object-to-XML mappers.
    Structured(Value),
    /// Pre-serialized body, sent verbatim for document-style messages.
    Literal(String),
}

impl Arguments {
    fn as_value(&self) -> Cow<'_, Value> {
        match self {
            Self::Structured(value) => Cow::Borrowed(value),
            Self::Literal(text) => Cow::Owned(Value::String(text.clone())),
        }
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::Structured(Value::Object(Map::new()))
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Literal(text),
            other => Self::Structured(other),
        }
    }
}

impl From<String> for Arguments {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<&str> for Arguments {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_owned())
    }
}

/// A SOAP header block attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapHeader {
    Raw(String),
    Structured {
        value: Value,
        name: Option<String>,
        alias: Option<String>,
        xmlns: Option<String>,
    },
}

impl SoapHeader {
    pub fn structured(value: Value) -> Self {
        Self::Structured {
            value,
            name: None,
            alias: None,
            xmlns: None,
        }
    }
}

/// Invocation client: the configuration every call reads, and the request
/// half of the pipeline. Completion lives in [`PendingResponse`].
pub struct Client {
    definitions: Arc<Definitions>,
    endpoint: Option<String>,
    namespaces: NamespaceTable,
    extra_headers: Headers,
    soap_headers: Vec<String>,
    security: Option<Arc<dyn Security>>,
    soap_action: Option<SoapActionResolver>,
    debug: Option<Arc<dyn DebugSink>>,
    mapper: Arc<dyn XmlMapper>,
    proxies: ServiceProxies,
    last_request: Mutex<Option<String>>,
}

impl Client {
    pub fn new(definitions: Definitions, config: ClientConfig) -> Self {
        let ClientConfig {
            endpoint,
            debug,
            security,
            soap_action,
            mapper,
        } = config;

        let proxies = ServiceProxies::bind(&definitions, endpoint.as_deref());

        Self {
            definitions: Arc::new(definitions),
            endpoint,
            namespaces: NamespaceTable::new(),
            extra_headers: Headers::new(),
            soap_headers: Vec::new(),
            security,
            soap_action,
            debug: debug.map(DebugTarget::into_sink),
            mapper,
            proxies,
            last_request: Mutex::new(None),
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn proxies(&self) -> &ServiceProxies {
        &self.proxies
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    pub fn extra_headers(&self) -> &Headers {
        &self.extra_headers
    }

    pub fn declare_namespace(
        &mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<(), SoapCoreError> {
        self.namespaces.declare(prefix, uri)
    }

    pub fn declare_namespaces<P, U>(
        &mut self,
        mapping: impl IntoIterator<Item = (P, U)>,
    ) -> Result<(), SoapCoreError>
    where
        P: Into<String>,
        U: Into<String>,
    {
        self.namespaces.declare_all(mapping)
    }

    pub fn declare_extra_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.extra_headers.insert(name, value);
    }

    /// Later values win for names already present. An empty mapping is a no-op.
    pub fn declare_extra_headers<N, V>(&mut self, mapping: impl IntoIterator<Item = (N, V)>)
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.extra_headers.extend(mapping);
    }

    pub fn add_soap_header(&mut self, header: SoapHeader) -> Result<(), SoapCoreError> {
        let fragment = match header {
            SoapHeader::Raw(xml) => xml,
            SoapHeader::Structured {
                value,
                name,
                alias,
                xmlns,
            } => self.mapper.object_to_xml(
                &value,
                name.as_deref(),
                alias.as_deref(),
                xmlns.as_deref(),
            )?,
        };
        self.soap_headers.push(fragment);
        Ok(())
    }

    pub fn soap_headers(&self) -> &[String] {
        &self.soap_headers
    }

    /// Overrides every port location and rebinds all proxies.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        info!(%endpoint, "endpoint changed");
        self.proxies = ServiceProxies::bind(&self.definitions, Some(endpoint.as_str()));
        self.endpoint = Some(endpoint);
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn set_security(&mut self, security: Arc<dyn Security>) {
        self.security = Some(security);
    }

    pub fn clear_security(&mut self) {
        self.security = None;
    }

    pub fn set_soap_action(&mut self, resolver: SoapActionResolver) {
        self.soap_action = Some(resolver);
    }

    pub fn clear_soap_action(&mut self) {
        self.soap_action = None;
    }

    pub fn set_debug(&mut self, target: Option<DebugTarget>) {
        self.debug = target.map(DebugTarget::into_sink);
    }

    pub fn set_debug_sink(&mut self, sink: Arc<dyn DebugSink>) {
        self.debug = Some(sink);
    }

    pub fn describe(&self) -> Value {
        self.definitions.describe()
    }

    /// The last envelope this client assembled, if any.
    pub fn last_request(&self) -> Option<String> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn soap_action_for(&self, method: &Method) -> String {
        let namespace = self.definitions.target_namespace.as_str();
        if let Some(resolve) = &self.soap_action {
            return resolve(namespace, &method.name);
        }
        if let Some(action) = &method.soap_action {
            return action.clone();
        }
        if namespace.is_empty() {
            return method.name.clone();
        }
        format!("{}/{}", namespace.trim_end_matches('/'), method.name)
    }

    /// Looks up the flattened shortcut and prepares a call to it.
    pub fn prepare_by_name(
        &self,
        method: &str,
        arguments: &Arguments,
    ) -> Result<PreparedCall, SoapCoreError> {
        let bound = self
            .proxies
            .method(method)
            .ok_or_else(|| SoapCoreError::UnknownOperation(method.to_owned()))?;
        self.prepare_bound(bound, arguments)
    }

    pub fn prepare_bound(
        &self,
        bound: &BoundMethod,
        arguments: &Arguments,
    ) -> Result<PreparedCall, SoapCoreError> {
        self.prepare(&bound.method, arguments, &bound.location)
    }

    /// Builds the request for one call without sending it.
    ///
    /// Every precondition failure surfaces here, before anything is
    /// dispatched. The assembled envelope is recorded as the last request and
    /// handed to the debug sink.
    #[instrument(skip(self, method, arguments), fields(method = %method.name))]
    pub fn prepare(
        &self,
        method: &Method,
        arguments: &Arguments,
        location: &str,
    ) -> Result<PreparedCall, SoapCoreError> {
        url::Url::parse(location).map_err(|source| SoapCoreError::InvalidLocation {
            location: location.to_owned(),
            source,
        })?;

        let soap_action = self.soap_action_for(method);

        let mut headers = Headers::new();
        headers.insert(SOAP_ACTION_HEADER, format!("\"{soap_action}\""));
        headers.insert(CONTENT_TYPE_HEADER, SOAP_CONTENT_TYPE);

        let mut options = RequestOptions::new();
        if let Some(security) = &self.security {
            security.add_headers(&mut headers);
            security.add_options(&mut options);
        }

        let headers = headers.merged(&self.extra_headers);

        let (body, encoded) = self.build_body(method, arguments)?;

        let definition_namespaces: Vec<(&str, &str)> =
            self.definitions.envelope_namespaces().collect();
        let security_xml = self
            .security
            .as_ref()
            .map(|security| security.to_xml())
            .transpose()?;

        let xml = build_envelope(EnvelopeParts {
            encoded,
            user_namespaces: &self.namespaces,
            definition_namespaces: &definition_namespaces,
            soap_headers: &self.soap_headers,
            security_xml: security_xml.as_deref(),
            body: &body,
        })?;

        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(xml.clone());

        if let Some(sink) = &self.debug {
            sink.emit(DebugLabel::Request, &xml);
        }

        debug!(
            location,
            soap_action = %soap_action,
            body_length = xml.len(),
            "prepared request"
        );

        Ok(PreparedCall {
            request: HttpRequest {
                url: location.to_owned(),
                headers,
                body: xml,
                options,
            },
            pending: PendingResponse {
                method_name: method.name.clone(),
                output_name: method.output.as_ref().map(|output| output.name.clone()),
                debug: self.debug.clone(),
                mapper: Arc::clone(&self.mapper),
            },
        })
    }

    /// Serializes the message body; the flag asks for SOAP encoding.
    fn build_body(
        &self,
        method: &Method,
        arguments: &Arguments,
    ) -> Result<(String, bool), SoapCoreError> {
        let style_mismatch = |style| SoapCoreError::StyleMismatch {
            method: method.name.clone(),
            style,
        };

        match (&method.input.shape, arguments) {
            (MessageShape::Parts(_), arguments) => {
                if let Some(style @ Style::Document) = method.style {
                    return Err(style_mismatch(style));
                }
                let namespace = self.definitions.target_namespace.as_str();
                let namespace = (!namespace.is_empty()).then_some(namespace);
                let alias = namespace.and_then(|ns| self.definitions.alias_for(ns));
                let body = self.mapper.object_to_rpc_xml(
                    &method.name,
                    &arguments.as_value(),
                    alias,
                    namespace,
                )?;
                Ok((body, method.is_encoded()))
            }
            (MessageShape::Element(_), Arguments::Literal(body)) => Ok((body.clone(), false)),
            (MessageShape::Element(element), Arguments::Structured(value)) => {
                if let Some(style @ Style::Rpc) = method.style {
                    return Err(style_mismatch(style));
                }
                let body = self.mapper.object_to_document_xml(
                    &method.input.name,
                    value,
                    element.namespace_alias.as_deref(),
                    element.namespace_uri.as_deref(),
                )?;
                Ok((body, false))
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("namespaces", &self.namespaces)
            .field("extra_headers", &self.extra_headers)
            .field("soap_headers", &self.soap_headers.len())
            .field("security", &self.security)
            .field("soap_action", &self.soap_action.is_some())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
