pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod normalize;
pub mod record;
pub mod report;

use tracing_subscriber::EnvFilter;

pub use clock::{FixedClock, ReportClock, SystemClock};
pub use error::{RenderError, ReportError};
pub use normalize::{classify_risk, normalize_flag, safe_string, NormalizedRecord, RiskFlag, RiskLevel};
pub use record::{FieldValue, RawRecord, RecordSet, RecordSummary};
pub use report::{render_document, render_pdf, render_preview, ReportPreview, ReportRenderer, StyleProfile};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
