mod config;
mod http_client;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use soapcall_async::{InvocationError, SoapClient};
use soapcall_client_core::client::SoapHeader;
use tracing::{error, info, instrument};

use config::{Args, Target, init_logging, load_definitions};
use http_client::ReqwestHttpClient;

#[tokio::main]
#[instrument(name = "main", level = "info")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;
    info!(definition = %args.definition.display(), "starting SOAP client");

    let definitions = load_definitions(&args.definition)?;
    let http_client = ReqwestHttpClient::new(Duration::from_secs(args.timeout_secs))?;
    let client = SoapClient::new(definitions, args.client_config(), http_client);

    if args.describe {
        println!("{}", serde_json::to_string_pretty(&client.describe())?);
        return Ok(());
    }

    client
        .declare_namespaces(args.namespaces.iter().cloned())
        .context("Failed to declare envelope namespaces")?;
    client.declare_extra_headers(args.headers.iter().cloned());
    for fragment in &args.soap_headers {
        client.add_soap_header(SoapHeader::Raw(fragment.clone()))?;
    }

    let target = args.target()?;
    let method = match &target {
        Target::Flattened(name) => client.method(name)?,
        Target::Path {
            service,
            port,
            method,
        } => client.service(service.as_str()).port(port.as_str()).method(method)?,
    };
    info!(?target, "calling operation");

    match method.call(args.arguments()?)?.await {
        Ok(invocation) => {
            let result = invocation.result.unwrap_or(serde_json::Value::Null);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(InvocationError::ResponseParse(failure)) => {
            error!(status = failure.response.status_code, error = %failure, "call failed");
            eprintln!("{}", failure.body());
            Err(failure.into())
        }
        Err(err) => {
            error!(error = %err, "call failed");
            Err(err.into())
        }
    }
}
