//! OpenTelemetry-based tracing with file-based OTLP export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → OpenTelemetry SDK → OTLP-JSON lines
//! ```
//!
//! Spans land in `<data_dir>/quickdock-otlp.json`, one OTLP document per
//! exported batch. The file rotates at 10 MiB and keeps three backups.
//!
//! Tracing is optional: if the data directory cannot be created, or a global
//! subscriber is already installed, [`init_tracing`] does nothing.
//!
//! # Modules
//!
//! - `exporter`: span exporter and OTLP-JSON encoding
//! - `rotating`: size-rotated line writer

mod exporter;
mod rotating;

use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the trace file inside the data directory.
pub const TRACE_FILE: &str = "quickdock-otlp.json";

/// Installs the global subscriber.
///
/// The filter comes from `config.trace_level` (default `info`); a `None`
/// level still installs the subscriber at `info`.
///
/// # Example
///
/// ```rust
/// use quickdock::observability::init_tracing;
/// use quickdock::Config;
///
/// let dir = std::env::temp_dir().join("quickdock-doc-trace");
/// let config = Config {
///     data_dir: dir,
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or("info");

    if std::fs::create_dir_all(&config.data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", "quickdock"),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = exporter::file_tracer_provider(config.data_dir.join(TRACE_FILE), resource);
    let tracer = provider.tracer(exporter::SCOPE);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(OpenTelemetryLayer::new(tracer))
        .try_init();
}
