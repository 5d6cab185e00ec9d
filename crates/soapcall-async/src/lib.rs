use std::future::Future;

use futures::future::BoxFuture;
use soapcall_client_core::{HttpRequest, HttpResponse, Invocation, ResponseFailure};

pub mod client;
pub mod proxy;

pub use client::SoapClient;
pub use proxy::{MethodHandle, PortHandle, ServiceHandle};

/// Transport seam. Implementations send one POST and resolve once with the
/// raw response, whatever its status code.
pub trait HttpClient: Send + Sync + 'static {
    fn send_request(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = anyhow::Result<HttpResponse>> + Send;
}

/// Failures reported after a request was dispatched.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),

    #[error(transparent)]
    ResponseParse(#[from] ResponseFailure),
}

pub type InvocationResult = Result<Invocation, InvocationError>;

/// Completion of one dispatched call.
pub type InvocationFuture = BoxFuture<'static, InvocationResult>;
