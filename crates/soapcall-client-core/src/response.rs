use std::{fmt::Display, sync::Arc};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    debug::{DebugLabel, DebugSink},
    http::{HttpRequest, HttpResponse},
    mapper::XmlMapper,
};

const ENVELOPE: &str = "Envelope";
const BODY: &str = "Body";
const FAULT: &str = "Fault";
const RESPONSE_SUFFIX: &str = "Response";

#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("malformed response XML: {0}")]
    Xml(#[from] soapcall_xml::XmlError),

    #[error("response root is '{found}', expected a SOAP Envelope")]
    NotAnEnvelope { found: String },

    #[error("SOAP Fault {code}: {string}")]
    Fault {
        code: String,
        string: String,
        detail: Option<Value>,
    },
}

/// A response that arrived but could not be turned into a result. Keeps the
/// raw response so the caller can still inspect it.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ResponseFailure {
    #[source]
    pub error: ResponseParseError,
    pub response: Box<HttpResponse>,
}

impl ResponseFailure {
    pub fn body(&self) -> &str {
        &self.response.body
    }
}

/// Successful outcome of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `None` when the body holds neither the declared output element nor
    /// `<method>Response`.
    pub result: Option<Value>,
    pub raw_body: String,
}

/// Request ready for dispatch plus what is needed to read its reply.
#[derive(Debug)]
pub struct PreparedCall {
    pub request: HttpRequest,
    pub pending: PendingResponse,
}

impl PreparedCall {
    pub fn into_parts(self) -> (HttpRequest, PendingResponse) {
        (self.request, self.pending)
    }
}

/// Completion half of a call; consumed by exactly one of
/// [`PendingResponse::accept`] or [`PendingResponse::reject`].
#[derive(Debug)]
pub struct PendingResponse {
    pub(crate) method_name: String,
    pub(crate) output_name: Option<String>,
    pub(crate) debug: Option<Arc<dyn DebugSink>>,
    pub(crate) mapper: Arc<dyn XmlMapper>,
}

impl PendingResponse {
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The transport failed; the error is handed back untouched.
    pub fn reject<E: Display>(self, error: E) -> E {
        warn!(method = %self.method_name, %error, "transport failed");
        error
    }

    pub fn accept(self, response: HttpResponse) -> Result<Invocation, ResponseFailure> {
        if let Some(sink) = &self.debug {
            sink.emit(DebugLabel::Response, &response.body);
        }

        debug!(
            method = %self.method_name,
            status = response.status_code,
            body_length = response.body.len(),
            "received response"
        );

        match self.extract(&response.body) {
            Ok(result) => Ok(Invocation {
                result,
                raw_body: response.body,
            }),
            Err(error) => {
                warn!(method = %self.method_name, %error, "failed to parse response");
                Err(ResponseFailure {
                    error,
                    response: Box::new(response),
                })
            }
        }
    }

    fn extract(&self, body: &str) -> Result<Option<Value>, ResponseParseError> {
        let (root, envelope) = self.mapper.xml_to_object(body)?;
        if root != ENVELOPE {
            return Err(ResponseParseError::NotAnEnvelope { found: root });
        }

        let Some(body) = envelope.get(BODY) else {
            return Ok(None);
        };

        if let Some(fault) = body.get(FAULT) {
            return Err(fault_error(fault));
        }

        let lookup = |key: &str| body.get(key).filter(|value| !value.is_null()).cloned();

        // The declared output name and the `<method>Response` convention can
        // disagree for RPC/literal services, so both are tried.
        let result = self
            .output_name
            .as_deref()
            .and_then(lookup)
            .or_else(|| lookup(&format!("{}{RESPONSE_SUFFIX}", self.method_name)));

        Ok(result)
    }
}

fn fault_error(fault: &Value) -> ResponseParseError {
    let text = |key: &str| fault.get(key).map(value_text).unwrap_or_default();
    ResponseParseError::Fault {
        code: text("faultcode"),
        string: text("faultstring"),
        detail: fault.get("detail").cloned(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(entries) => entries
            .get(soapcall_xml::parser::TEXT_KEY)
            .map(value_text)
            .unwrap_or_default(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::DefaultXmlMapper;
    use serde_json::json;

    fn pending(method: &str, output: Option<&str>) -> PendingResponse {
        PendingResponse {
            method_name: method.to_owned(),
            output_name: output.map(str::to_owned),
            debug: None,
            mapper: Arc::new(DefaultXmlMapper),
        }
    }

    fn envelope(body: &str) -> String {
        format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{body}</soap:Body></soap:Envelope>"#
        )
    }

    #[test]
    fn test_result_under_declared_output_name() {
        let body = envelope("<GetResult><value>1</value></GetResult>");
        let invocation = pending("Get", Some("GetResult"))
            .accept(HttpResponse::new(200, body.clone()))
            .unwrap();

        assert_eq!(invocation.result, Some(json!({"value": "1"})));
        assert_eq!(invocation.raw_body, body);
    }

    #[test]
    fn test_falls_back_to_method_response() {
        let body = envelope("<GetResponse><value>1</value></GetResponse>");
        let invocation = pending("Get", Some("GetResult"))
            .accept(HttpResponse::new(200, body))
            .unwrap();

        assert_eq!(invocation.result, Some(json!({"value": "1"})));
    }

    #[test]
    fn test_declared_output_name_wins_over_method_response() {
        let body = envelope(
            "<GetResponse><value>fallback</value></GetResponse><GetResult><value>declared</value></GetResult>",
        );
        let invocation = pending("Get", Some("GetResult"))
            .accept(HttpResponse::new(200, body))
            .unwrap();

        assert_eq!(invocation.result, Some(json!({"value": "declared"})));
    }

    #[test]
    fn test_missing_result_is_not_an_error() {
        let body = envelope("<Other/>");
        let invocation = pending("Get", Some("GetResult"))
            .accept(HttpResponse::new(200, body))
            .unwrap();

        assert_eq!(invocation.result, None);
    }

    #[test]
    fn test_malformed_xml_keeps_raw_response() {
        let failure = pending("Get", None)
            .accept(HttpResponse::new(500, "<soap:Envelope"))
            .unwrap_err();

        assert!(matches!(failure.error, ResponseParseError::Xml(_)));
        assert_eq!(failure.response.status_code, 500);
        assert_eq!(failure.body(), "<soap:Envelope");
    }

    #[test]
    fn test_non_envelope_root() {
        let failure = pending("Get", None)
            .accept(HttpResponse::new(200, "<html><body/></html>"))
            .unwrap_err();

        match failure.error {
            ResponseParseError::NotAnEnvelope { found } => assert_eq!(found, "html"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fault_is_reported() {
        let body = envelope(
            "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>boom</faultstring></soap:Fault>",
        );
        let failure = pending("Get", None)
            .accept(HttpResponse::new(500, body))
            .unwrap_err();

        match &failure.error {
            ResponseParseError::Fault { code, string, .. } => {
                assert_eq!(code, "soap:Server");
                assert_eq!(string, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(failure.to_string(), "SOAP Fault soap:Server: boom");
    }

    #[test]
    fn test_reject_returns_the_error() {
        let error = pending("Get", None).reject("connection refused");
        assert_eq!(error, "connection refused");
    }
}
