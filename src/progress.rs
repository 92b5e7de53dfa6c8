use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted during a mirror run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Origin feed is being fetched
    FetchingFeed { url: String },

    /// Feed bytes arrived and are being parsed
    ParsingFeed { bytes: usize },

    /// Channel-level fix-ups have been applied
    ChannelPatched {
        title: String,
        item_count: usize,
        /// Fields that were missing and received a default
        inserted_defaults: Vec<&'static str>,
    },

    /// An enclosure without a usable length is being probed
    ProbingLength { url: String },

    /// The probe supplied an enclosure length
    LengthFilled { url: String, length: u64 },

    /// The probe produced nothing; the length was left as-is
    ProbeFailed { url: String },

    /// The mirrored feed has been written
    FeedWritten {
        path: PathBuf,
        bytes: u64,
        self_link: String,
    },
}

/// Trait for reporting progress events during a mirror run.
///
/// Implementations can use this to display a spinner, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
