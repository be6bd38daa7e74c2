// Application state module
// Immutable per-process state derived from configuration at startup

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::logger::LogFormat;

/// Application state shared by the transport and the request handler.
///
/// Everything here is fixed at startup; request handling takes no locks.
pub struct AppState {
    pub config: Config,
    /// Canonicalized document root; startup fails if it does not exist
    pub document_root: PathBuf,
    /// Parsed access log format
    pub access_log_format: LogFormat,
}

impl AppState {
    pub fn new(config: Config) -> io::Result<Self> {
        let document_root = PathBuf::from(&config.spa.document_root)
            .canonicalize()
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "document root '{}' is not accessible: {e}",
                        config.spa.document_root
                    ),
                )
            })?;

        if !document_root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!(
                    "document root '{}' is not a directory",
                    document_root.display()
                ),
            ));
        }

        let access_log_format = LogFormat::parse(&config.logging.access_log_format);

        Ok(Self {
            config,
            document_root,
            access_log_format,
        })
    }
}
