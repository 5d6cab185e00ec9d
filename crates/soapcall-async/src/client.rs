use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use soapcall_client_core::{
    Arguments, Client, ClientConfig, Definitions, Method, PreparedCall, Security, SoapCoreError,
    SoapActionResolver, client::SoapHeader,
};
use tracing::{Instrument, debug, info_span, instrument};

use crate::{HttpClient, InvocationError, InvocationFuture, proxy::ServiceHandle};

/// Async SOAP client.
///
/// Configuration lives behind a single-writer/many-reader lock: registration
/// takes the write lock, calls hold the read lock only while the request is
/// prepared and never across the transport await. Clones share both the
/// configuration and the transport.
pub struct SoapClient<H> {
    core: Arc<RwLock<Client>>,
    http: Arc<H>,
}

impl<H> Clone for SoapClient<H> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            http: Arc::clone(&self.http),
        }
    }
}

impl<H: HttpClient> SoapClient<H> {
    pub fn new(definitions: Definitions, config: ClientConfig, http: H) -> Self {
        Self::from_client(Client::new(definitions, config), http)
    }

    pub fn from_client(client: Client, http: H) -> Self {
        Self {
            core: Arc::new(RwLock::new(client)),
            http: Arc::new(http),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Client> {
        self.core.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Client> {
        self.core.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access to the configuration.
    pub fn inspect<R>(&self, f: impl FnOnce(&Client) -> R) -> R {
        f(&self.read())
    }

    pub fn declare_namespace(
        &self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<(), SoapCoreError> {
        self.write().declare_namespace(prefix, uri)
    }

    pub fn declare_namespaces<P, U>(
        &self,
        mapping: impl IntoIterator<Item = (P, U)>,
    ) -> Result<(), SoapCoreError>
    where
        P: Into<String>,
        U: Into<String>,
    {
        self.write().declare_namespaces(mapping)
    }

    pub fn declare_extra_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write().declare_extra_header(name, value);
    }

    pub fn declare_extra_headers<N, V>(&self, mapping: impl IntoIterator<Item = (N, V)>)
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.write().declare_extra_headers(mapping);
    }

    pub fn add_soap_header(&self, header: SoapHeader) -> Result<(), SoapCoreError> {
        self.write().add_soap_header(header)
    }

    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        self.write().set_endpoint(endpoint);
    }

    pub fn set_security(&self, security: Arc<dyn Security>) {
        self.write().set_security(security);
    }

    pub fn set_soap_action(&self, resolver: SoapActionResolver) {
        self.write().set_soap_action(resolver);
    }

    pub fn clear_soap_action(&self) {
        self.write().clear_soap_action();
    }

    pub fn describe(&self) -> serde_json::Value {
        self.read().describe()
    }

    pub fn last_request(&self) -> Option<String> {
        self.read().last_request()
    }

    /// Proxy handle for `service`; see [`ServiceHandle`].
    pub fn service(&self, name: impl Into<String>) -> ServiceHandle<H> {
        ServiceHandle::new(self.clone(), name.into())
    }

    /// Flattened shortcut: the first method bound under `name`.
    pub fn method(&self, name: &str) -> Result<crate::MethodHandle<H>, SoapCoreError> {
        crate::MethodHandle::flattened(self.clone(), name)
    }

    /// Calls the flattened method `name`.
    ///
    /// Precondition failures (unknown operation, style mismatch, invalid
    /// location) are returned immediately; nothing is dispatched then. The
    /// returned future performs the single transport round trip.
    #[instrument(skip(self, arguments))]
    pub fn call(
        &self,
        name: &str,
        arguments: impl Into<Arguments>,
    ) -> Result<InvocationFuture, SoapCoreError> {
        let prepared = self.read().prepare_by_name(name, &arguments.into())?;
        Ok(self.dispatch(prepared))
    }

    /// Calls `method` against an explicit `location`.
    #[instrument(skip(self, method, arguments), fields(method = %method.name))]
    pub fn call_at(
        &self,
        method: &Method,
        arguments: impl Into<Arguments>,
        location: &str,
    ) -> Result<InvocationFuture, SoapCoreError> {
        let prepared = self.read().prepare(method, &arguments.into(), location)?;
        Ok(self.dispatch(prepared))
    }

    pub(crate) fn prepare_path(
        &self,
        service: &str,
        port: &str,
        method: &str,
        arguments: &Arguments,
    ) -> Result<PreparedCall, SoapCoreError> {
        self.inspect(|core| {
            let bound = core
                .proxies()
                .resolve(service, port, method)
                .ok_or_else(|| {
                    SoapCoreError::UnknownOperation(format!("{service}/{port}/{method}"))
                })?;
            core.prepare_bound(bound, arguments)
        })
    }

    pub(crate) fn prepare_flattened(
        &self,
        method: &str,
        arguments: &Arguments,
    ) -> Result<PreparedCall, SoapCoreError> {
        self.read().prepare_by_name(method, arguments)
    }

    pub(crate) fn dispatch(&self, prepared: PreparedCall) -> InvocationFuture {
        let http = Arc::clone(&self.http);
        let (request, pending) = prepared.into_parts();
        let span = info_span!("dispatch", method = pending.method_name(), url = %request.url);

        async move {
            debug!(body_length = request.body.len(), "sending request");
            match http.send_request(request).await {
                Ok(response) => pending.accept(response).map_err(InvocationError::from),
                Err(error) => Err(InvocationError::Transport(pending.reject(error))),
            }
        }
        .instrument(span)
        .boxed()
    }
}
