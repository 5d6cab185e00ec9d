use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use soapcall_async::HttpClient;
use soapcall_client_core::{HttpRequest, HttpResponse};
use tracing::{debug, info, instrument};

/// reqwest transport. Honours the `timeout_ms` and `accept_invalid_certs`
/// request options contributed by security schemes.
pub struct ReqwestHttpClient {
    client: Client,
    insecure_client: Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        info!(
            connect_timeout_secs = 30,
            timeout_secs = timeout.as_secs(),
            "initializing ReqwestHttpClient with native-tls"
        );
        Ok(Self {
            client: Self::build_client(timeout, false)?,
            insecure_client: Self::build_client(timeout, true)?,
        })
    }

    fn build_client(timeout: Duration, accept_invalid_certs: bool) -> anyhow::Result<Client> {
        reqwest::Client::builder()
            .use_native_tls()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build reqwest client")
    }
}

impl HttpClient for ReqwestHttpClient {
    #[instrument(name = "http_request", level = "debug", skip(self, request), fields(url = %request.url))]
    async fn send_request(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
        let client = if request.options.accept_invalid_certs() {
            &self.insecure_client
        } else {
            &self.client
        };

        info!(
            url = %request.url,
            headers_count = request.headers.len(),
            body_length = request.body.len(),
            "Starting HTTP request"
        );

        let mut req_builder = client.post(&request.url);
        for (name, value) in request.headers.iter() {
            req_builder = req_builder.header(name, value);
        }
        if let Some(timeout) = request.options.timeout() {
            debug!(timeout_ms = timeout.as_millis() as u64, "per-request timeout");
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder
            .body(request.body)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status_code = response.status().as_u16();
        info!(status_code, "Received HTTP response");

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        info!(body_length = body.len(), "HTTP request completed");

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}
