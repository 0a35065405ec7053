//! Structured logging configuration.
//!
//! Log output goes through `tracing-subscriber`, either as JSON objects for
//! collection or as pretty text for local runs:
//!
//! ```json
//! {"timestamp":"2024-01-15T10:30:00.000Z","level":"INFO","target":"rsperms_domain::users::manager","fields":{"message":"refreshed connected users","reloaded":12,"failed":0}}
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Output layer type shared by both formats.
type FormatLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging options, built from the `logging` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// JSON lines when set, pretty text otherwise
    pub json: bool,
    /// Level used when RUST_LOG is unset
    pub level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
        }
    }
}

fn format_layer(json: bool) -> FormatLayer {
    if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    } else {
        fmt::layer().pretty().with_target(true).boxed()
    }
}

/// Installs the global subscriber.
///
/// Only the first call in a process takes effect.
pub fn init_logging(config: LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    // Already initialized elsewhere: keep that subscriber.
    let _ = tracing_subscriber::registry()
        .with(format_layer(config.json))
        .with(filter)
        .try_init();
}

/// JSON subscriber writing to `writer` at every level, for capturing output.
pub fn json_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(writer).with_target(true))
        .with(EnvFilter::new("trace"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Captures output in a shared buffer.
    #[derive(Clone)]
    struct CaptureWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CaptureWriter {
        fn new() -> Self {
            Self {
                buffer: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn output(&self) -> String {
            String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.json);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_both_formats_build_layers() {
        let json = format_layer(true);
        let text = format_layer(false);
        let subscriber = tracing_subscriber::registry().with(json);
        tracing::subscriber::with_default(subscriber, || tracing::debug!("json layer"));
        let subscriber = tracing_subscriber::registry().with(text);
        tracing::subscriber::with_default(subscriber, || tracing::debug!("text layer"));
    }

    #[test]
    fn test_structured_logs_are_json_formatted() {
        use tracing::info;

        let writer = CaptureWriter::new();
        let subscriber = json_subscriber(writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            info!(user = "alice", group = "default", "assigned default group");
        });

        let output = writer.output();
        assert!(!output.is_empty(), "Should have captured log output");

        for line in output.lines().filter(|line| !line.is_empty()) {
            let json: serde_json::Value = serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("Log line should be valid JSON: {line} ({e})"));
            assert!(json.get("level").is_some());
            assert!(json.get("target").is_some());
        }
    }
}
