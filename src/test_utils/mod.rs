//! Test utilities for docket
//!
//! In-memory stand-ins for the registry and the source host, so the domain
//! model and both pipelines can be exercised without network access. The fakes
//! count the calls made to them, which lets tests assert compute-once and
//! validate-before-network behaviour.
//!
//! # Example
//!
//! ```rust,no_run
//! use docket_cli::registry::ReleaseMetadata;
//! use docket_cli::test_utils::{FakeRegistry, FakeSource};
//!
//! let registry = FakeRegistry::new().with_release("logstash-input-beats", ReleaseMetadata::new("9.0.0"));
//! let source = FakeSource::new()
//!     .with_tag("v9.0.0")
//!     .with_file("docs/index.asciidoc", Some("9.0.0"), ":plugin: beats");
//! ```

mod fakes;

pub use fakes::{FakeRegistry, FakeSource};

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Logs only when a level is given or `RUST_LOG` is set; output goes through
/// the test writer so it is captured per test.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Midnight UTC of a `YYYY-MM-DD` date.
///
/// # Panics
///
/// Panics on a malformed date; test inputs are literals.
pub fn date(day: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date {day}: {e}"))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| panic!("bad test time for {day}"))
        .and_utc()
}
