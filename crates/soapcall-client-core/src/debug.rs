use std::{
    fmt::{self, Debug},
    io::Write,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use tracing::{info, warn};

/// Which side of the exchange a debug record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugLabel {
    Request,
    Response,
}

/// Receives the raw XML of every exchange when debugging is enabled.
pub trait DebugSink: Debug + Send + Sync {
    fn emit(&self, label: DebugLabel, text: &str);
}

/// Debug target identifier: `"console"` or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugTarget {
    Console,
    File(PathBuf),
}

impl DebugTarget {
    pub const CONSOLE: &'static str = "console";

    pub fn into_sink(self) -> Arc<dyn DebugSink> {
        match self {
            Self::Console => Arc::new(ConsoleSink),
            Self::File(path) => Arc::new(FileSink::new(path)),
        }
    }
}

impl FromStr for DebugTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == Self::CONSOLE {
            Self::Console
        } else {
            Self::File(PathBuf::from(s))
        })
    }
}

impl fmt::Display for DebugTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "{}", Self::CONSOLE),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Logs exchanges through `tracing` on the `soapcall::debug` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl DebugSink for ConsoleSink {
    fn emit(&self, label: DebugLabel, text: &str) {
        match label {
            DebugLabel::Request => info!(target: "soapcall::debug", xml = %text, "XML TO SERVER"),
            DebugLabel::Response => info!(target: "soapcall::debug", xml = %text, "XML RESPONSE"),
        }
    }
}

/// Appends exchanges to a file, one `REQUEST:`/`RESPONSE:` section each.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, record: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())
    }
}

impl DebugSink for FileSink {
    fn emit(&self, label: DebugLabel, text: &str) {
        let record = match label {
            DebugLabel::Request => format!("REQUEST:\n\n{text}\n"),
            DebugLabel::Response => format!("\nRESPONSE:\n\n{text}\n"),
        };
        // Debug output never fails a call.
        if let Err(error) = self.append(&record) {
            warn!(path = %self.path.display(), %error, "failed to write debug record");
        }
    }
}
