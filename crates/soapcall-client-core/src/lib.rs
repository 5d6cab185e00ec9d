pub mod client;
pub mod config;
pub mod debug;
pub mod definition;
pub mod envelope;
pub mod http;
pub mod mapper;
pub mod namespaces;
pub mod proxy;
pub mod response;
pub mod security;

pub use client::{Arguments, Client, SoapHeader};
pub use config::{ClientConfig, SoapActionResolver};
pub use debug::{DebugLabel, DebugSink, DebugTarget};
pub use definition::{Definitions, Message, Method, Style};
pub use http::{Headers, HttpRequest, HttpResponse, RequestOptions};
pub use proxy::{BoundMethod, ServiceProxies};
pub use response::{Invocation, PendingResponse, PreparedCall, ResponseFailure, ResponseParseError};
pub use security::{BasicAuthSecurity, ClientOptionsSecurity, Security, WsSecurity};

#[derive(Debug, thiserror::Error)]
pub enum SoapCoreError {
    #[error("namespace prefix '{prefix}' is already bound to '{existing}', cannot rebind it to '{attempted}'")]
    NamespaceConflict {
        prefix: String,
        existing: String,
        attempted: String,
    },

    #[error("invalid message definition for {style} style binding of operation '{method}'")]
    StyleMismatch { method: String, style: Style },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid endpoint '{location}': {source}")]
    InvalidLocation {
        location: String,
        source: url::ParseError,
    },

    #[error("XML error: {0}")]
    Xml(#[from] soapcall_xml::XmlError),
}
