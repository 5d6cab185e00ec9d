use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::definition::{Definitions, Method};

/// A method descriptor bound to the location calls are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundMethod {
    pub service: String,
    pub port: String,
    pub method: Arc<Method>,
    pub location: String,
}

type PortTable = HashMap<String, BoundMethod>;

/// Callable table built from a service description.
///
/// Every method is reachable through its `service/port/method` path. The
/// flattened `method` shortcut belongs to the first method bound under that
/// name, in description order.
#[derive(Debug, Clone, Default)]
pub struct ServiceProxies {
    services: HashMap<String, HashMap<String, PortTable>>,
    shortcuts: HashMap<String, BoundMethod>,
}

impl ServiceProxies {
    /// Binds every method of every port. `endpoint` overrides the declared
    /// port locations.
    pub fn bind(definitions: &Definitions, endpoint: Option<&str>) -> Self {
        let mut proxies = Self::default();

        for service in &definitions.services {
            let mut ports = HashMap::new();
            for port in &service.ports {
                let location = endpoint.unwrap_or(&port.location);
                let mut methods = PortTable::new();

                for method in &port.binding.methods {
                    let bound = BoundMethod {
                        service: service.name.clone(),
                        port: port.name.clone(),
                        method: Arc::new(method.clone()),
                        location: location.to_owned(),
                    };
                    proxies
                        .shortcuts
                        .entry(method.name.clone())
                        .or_insert_with(|| bound.clone());
                    methods.insert(method.name.clone(), bound);
                }

                ports.insert(port.name.clone(), methods);
            }
            proxies.services.insert(service.name.clone(), ports);
        }

        debug!(
            services = proxies.services.len(),
            shortcuts = proxies.shortcuts.len(),
            endpoint_override = endpoint.is_some(),
            "bound service proxies"
        );
        proxies
    }

    /// Flattened lookup by method name.
    pub fn method(&self, name: &str) -> Option<&BoundMethod> {
        self.shortcuts.get(name)
    }

    pub fn resolve(&self, service: &str, port: &str, method: &str) -> Option<&BoundMethod> {
        self.services.get(service)?.get(port)?.get(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Binding, Message, Port, Service};

    fn method(name: &str) -> Method {
        Method {
            name: name.to_owned(),
            input: Message::element(name, None, None),
            output: None,
            style: None,
            soap_action: None,
            input_encoding: None,
        }
    }

    fn port(name: &str, location: &str, methods: &[&str]) -> Port {
        Port {
            name: name.to_owned(),
            location: location.to_owned(),
            binding: Binding {
                name: format!("{name}Binding"),
                methods: methods.iter().copied().map(method).collect(),
            },
        }
    }

    fn definitions() -> Definitions {
        Definitions {
            target_namespace: "urn:svc".to_owned(),
            services: vec![Service {
                name: "Svc".to_owned(),
                ports: vec![
                    port("First", "http://first/", &["Ping", "Echo"]),
                    port("Second", "http://second/", &["Ping"]),
                ],
            }],
            ..Definitions::default()
        }
    }

    #[test]
    fn test_first_bound_method_owns_the_shortcut() {
        let proxies = ServiceProxies::bind(&definitions(), None);

        assert_eq!(proxies.method("Ping").unwrap().port, "First");
        assert_eq!(
            proxies.resolve("Svc", "First", "Ping").unwrap().location,
            "http://first/"
        );
        assert_eq!(
            proxies.resolve("Svc", "Second", "Ping").unwrap().location,
            "http://second/"
        );
        assert_eq!(proxies.method("Echo").unwrap().port, "First");
        assert!(proxies.resolve("Svc", "Second", "Echo").is_none());
    }

    #[test]
    fn test_endpoint_override_applies_to_every_port() {
        let proxies = ServiceProxies::bind(&definitions(), Some("http://override/"));

        for port in ["First", "Second"] {
            assert_eq!(
                proxies.resolve("Svc", port, "Ping").unwrap().location,
                "http://override/"
            );
        }
    }
}
