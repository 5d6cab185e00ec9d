use std::sync::Arc;

use crate::{
    debug::DebugTarget,
    mapper::{DefaultXmlMapper, XmlMapper},
    security::Security,
};

/// Computes the SOAP action from `(target namespace, method name)`.
pub type SoapActionResolver = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Settings a [`crate::Client`] starts with. Everything can be changed later
/// through the client's setters.
#[derive(Clone, typed_builder::TypedBuilder)]
pub struct ClientConfig {
    /// Replaces every port's declared location.
    #[builder(default, setter(strip_option, into))]
    pub endpoint: Option<String>,

    #[builder(default, setter(strip_option))]
    pub debug: Option<DebugTarget>,

    #[builder(default, setter(strip_option))]
    pub security: Option<Arc<dyn Security>>,

    #[builder(default, setter(strip_option))]
    pub soap_action: Option<SoapActionResolver>,

    #[builder(default = Arc::new(DefaultXmlMapper))]
    pub mapper: Arc<dyn XmlMapper>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("debug", &self.debug)
            .field("security", &self.security)
            .field("soap_action", &self.soap_action.as_ref().map(|_| "<resolver>"))
            .field("mapper", &self.mapper)
            .finish()
    }
}
