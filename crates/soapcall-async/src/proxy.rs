//! Bound proxy handles: `client.service(..).port(..).method(..)` and the
//! flattened `client.method(..)`.
//!
//! Handles name their target and resolve it at call time, so they follow
//! endpoint changes made after they were created.

use soapcall_client_core::{Arguments, BoundMethod, SoapCoreError};

use crate::{HttpClient, InvocationFuture, SoapClient};

pub struct ServiceHandle<H> {
    client: SoapClient<H>,
    service: String,
}

impl<H: HttpClient> ServiceHandle<H> {
    pub(crate) fn new(client: SoapClient<H>, service: String) -> Self {
        Self { client, service }
    }

    pub fn port(&self, name: impl Into<String>) -> PortHandle<H> {
        PortHandle {
            client: self.client.clone(),
            service: self.service.clone(),
            port: name.into(),
        }
    }
}

pub struct PortHandle<H> {
    client: SoapClient<H>,
    service: String,
    port: String,
}

impl<H: HttpClient> PortHandle<H> {
    pub fn method(&self, name: &str) -> Result<MethodHandle<H>, SoapCoreError> {
        let exists = self.client.inspect(|core| {
            core.proxies()
                .resolve(&self.service, &self.port, name)
                .is_some()
        });
        if !exists {
            return Err(SoapCoreError::UnknownOperation(format!(
                "{}/{}/{name}",
                self.service, self.port
            )));
        }

        Ok(MethodHandle {
            client: self.client.clone(),
            target: Target::Path {
                service: self.service.clone(),
                port: self.port.clone(),
                method: name.to_owned(),
            },
        })
    }
}

#[derive(Debug, Clone)]
enum Target {
    Path {
        service: String,
        port: String,
        method: String,
    },
    Flattened(String),
}

pub struct MethodHandle<H> {
    client: SoapClient<H>,
    target: Target,
}

impl<H> Clone for MethodHandle<H> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            target: self.target.clone(),
        }
    }
}

impl<H: HttpClient> MethodHandle<H> {
    pub(crate) fn flattened(client: SoapClient<H>, name: &str) -> Result<Self, SoapCoreError> {
        if client.inspect(|core| core.proxies().method(name).is_none()) {
            return Err(SoapCoreError::UnknownOperation(name.to_owned()));
        }
        Ok(Self {
            client,
            target: Target::Flattened(name.to_owned()),
        })
    }

    /// The method and location a call would use right now.
    pub fn bound(&self) -> Option<BoundMethod> {
        self.client.inspect(|core| {
            let proxies = core.proxies();
            match &self.target {
                Target::Path {
                    service,
                    port,
                    method,
                } => proxies.resolve(service, port, method),
                Target::Flattened(method) => proxies.method(method),
            }
            .cloned()
        })
    }

    pub fn call(&self, arguments: impl Into<Arguments>) -> Result<InvocationFuture, SoapCoreError> {
        let arguments = arguments.into();
        let prepared = match &self.target {
            Target::Path {
                service,
                port,
                method,
            } => self.client.prepare_path(service, port, method, &arguments)?,
            Target::Flattened(method) => self.client.prepare_flattened(method, &arguments)?,
        };
        Ok(self.client.dispatch(prepared))
    }

    /// Calls with an empty argument object.
    pub fn call_default(&self) -> Result<InvocationFuture, SoapCoreError> {
        self.call(Arguments::default())
    }
}
