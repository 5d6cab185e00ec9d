use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use soapcall_client_core::{
    Arguments, BasicAuthSecurity, ClientConfig, DebugTarget, Definitions, Security, WsSecurity,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry::Registry};

/// Calls one operation of a SOAP service described by a JSON definition.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Service definition (JSON)
    #[arg(long, help = "Path to the JSON service definition")]
    pub definition: PathBuf,

    #[arg(
        short,
        long,
        conflicts_with = "path",
        help = "Operation to call through its flattened name"
    )]
    pub operation: Option<String>,

    #[arg(long, help = "Operation to call as service/port/method")]
    pub path: Option<String>,

    /// Call arguments: inline JSON, `@file` holding JSON, or a literal XML body
    #[arg(short, long)]
    pub args: Option<String>,

    #[arg(long, help = "Override every port location")]
    pub endpoint: Option<String>,

    #[arg(long = "namespace", value_parser = parse_pair::<'='>, help = "Envelope namespace as prefix=uri (repeatable)")]
    pub namespaces: Vec<(String, String)>,

    #[arg(long = "header", value_parser = parse_pair::<'='>, help = "Extra HTTP header as name=value (repeatable)")]
    pub headers: Vec<(String, String)>,

    #[arg(long = "soap-header", help = "Raw SOAP header XML fragment (repeatable)")]
    pub soap_headers: Vec<String>,

    #[arg(long, value_parser = parse_pair::<':'>, conflicts_with = "ws_security", help = "HTTP basic auth as user:password")]
    pub basic_auth: Option<(String, String)>,

    #[arg(long, value_parser = parse_pair::<':'>, help = "WS-Security UsernameToken as user:password")]
    pub ws_security: Option<(String, String)>,

    #[arg(long, help = "Debug target: `console` or a file path")]
    pub debug: Option<DebugTarget>,

    #[arg(long, default_value_t = 60, help = "Request timeout in seconds")]
    pub timeout_secs: u64,

    #[arg(long, help = "Print the service description and exit")]
    pub describe: bool,

    /// Verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase logging verbosity")]
    pub verbose: u8,
}

/// Which operation to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Flattened(String),
    Path {
        service: String,
        port: String,
        method: String,
    },
}

impl Args {
    pub fn target(&self) -> anyhow::Result<Target> {
        if let Some(operation) = &self.operation {
            return Ok(Target::Flattened(operation.clone()));
        }
        let path = self
            .path
            .as_deref()
            .context("either --operation or --path is required")?;
        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(service), Some(port), Some(method), None)
                if !service.is_empty() && !port.is_empty() && !method.is_empty() =>
            {
                Ok(Target::Path {
                    service: service.to_owned(),
                    port: port.to_owned(),
                    method: method.to_owned(),
                })
            }
            _ => anyhow::bail!("invalid --path '{path}', expected service/port/method"),
        }
    }

    pub fn security(&self) -> Option<Arc<dyn Security>> {
        if let Some((user, password)) = &self.basic_auth {
            return Some(Arc::new(BasicAuthSecurity::new(user, password)));
        }
        self.ws_security
            .as_ref()
            .map(|(user, password)| Arc::new(WsSecurity::new(user, password)) as Arc<dyn Security>)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            debug: self.debug.clone(),
            security: self.security(),
            ..ClientConfig::default()
        }
    }

    pub fn arguments(&self) -> anyhow::Result<Arguments> {
        self.args.as_deref().map_or_else(|| Ok(Arguments::default()), parse_arguments)
    }
}

pub fn load_definitions(path: &std::path::Path) -> anyhow::Result<Definitions> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read definition file {}", path.display()))?;
    Definitions::from_json(&json)
        .with_context(|| format!("Invalid service definition in {}", path.display()))
}

/// Inline JSON, `@file` holding JSON, or a literal body when the text is not
/// JSON at all.
pub fn parse_arguments(raw: &str) -> anyhow::Result<Arguments> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments file {path}"))?,
        None => raw.to_owned(),
    };
    Ok(serde_json::from_str::<serde_json::Value>(&text)
        .map_or_else(|_| Arguments::Literal(text), Arguments::from))
}

fn parse_pair<const SEP: char>(raw: &str) -> Result<(String, String), String> {
    raw.split_once(SEP)
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY{SEP}VALUE, got '{raw}'"))
}

/// Initialize logging on stderr; stdout carries the call result.
pub fn init_logging(verbose_level: u8) -> anyhow::Result<()> {
    let log_level = match verbose_level {
        0 => "warn,soapcall::debug=info",
        1 => "info,reqwest=warn,hyper=warn",
        2 => "debug,reqwest=info,hyper=info",
        _ => "trace",
    };

    let env_filter = EnvFilter::new(log_level);

    let subscriber = Registry::default().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["soapcall", "--definition", "svc.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_repeatable_pairs() {
        let args = args(&[
            "--operation",
            "Ping",
            "--namespace",
            "ns0=urn:a",
            "--namespace",
            "targetNamespace=urn:svc",
            "--header",
            "X-Trace=1",
        ]);

        assert_eq!(
            args.namespaces,
            vec![
                ("ns0".to_owned(), "urn:a".to_owned()),
                ("targetNamespace".to_owned(), "urn:svc".to_owned())
            ]
        );
        assert_eq!(args.headers, vec![("X-Trace".to_owned(), "1".to_owned())]);
        assert_eq!(args.target().unwrap(), Target::Flattened("Ping".to_owned()));
    }

    #[test]
    fn test_malformed_pair_is_rejected() {
        let result = Args::try_parse_from([
            "soapcall",
            "--definition",
            "svc.json",
            "--namespace",
            "no-separator",
        ]);
        assert!(result.is_err());

        assert_eq!(
            parse_pair::<':'>("=x"),
            Err("expected KEY:VALUE, got '=x'".to_owned())
        );
        assert_eq!(
            parse_pair::<'='>("a=b=c"),
            Ok(("a".to_owned(), "b=c".to_owned()))
        );
    }

    #[test]
    fn test_path_target() {
        let args = args(&["--path", "Svc/Port/Ping"]);
        assert_eq!(
            args.target().unwrap(),
            Target::Path {
                service: "Svc".to_owned(),
                port: "Port".to_owned(),
                method: "Ping".to_owned(),
            }
        );

        assert!(self::args(&["--path", "Svc/Ping"]).target().is_err());
        assert!(self::args(&[]).target().is_err());
    }

    #[test]
    fn test_arguments() {
        assert_eq!(
            parse_arguments(r#"{"msg": "hi"}"#).unwrap(),
            Arguments::Structured(json!({"msg": "hi"}))
        );
        assert_eq!(
            parse_arguments("<Ping/>").unwrap(),
            Arguments::Literal("<Ping/>".to_owned())
        );

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"id": 7}"#).unwrap();
        let raw = format!("@{}", file.path().display());
        assert_eq!(
            parse_arguments(&raw).unwrap(),
            Arguments::Structured(json!({"id": 7}))
        );

        assert_eq!(self::args(&[]).arguments().unwrap(), Arguments::default());
    }

    #[test]
    fn test_client_config() {
        let args = args(&[
            "--operation",
            "Ping",
            "--endpoint",
            "http://localhost:8080/",
            "--debug",
            "console",
            "--basic-auth",
            "user:pa:ss",
        ]);

        let config = args.client_config();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080/"));
        assert_eq!(config.debug, Some(DebugTarget::Console));
        assert_eq!(args.basic_auth, Some(("user".to_owned(), "pa:ss".to_owned())));
        assert!(config.security.is_some());
    }
}
