pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod mirror;
pub mod output;
pub mod patch;
pub mod progress;

// Re-export main types for convenience
pub use config::{ChannelDefaults, DEFAULT_OUTPUT_DIR, MirrorConfig};
pub use error::{ConfigError, FeedError, MirrorError, WriteError};
pub use feed::{
    Document, Namespaces, XmlElement, XmlNode, channel_mut, fetch_feed_bytes, parse_feed,
    probe_content_length,
};
pub use http::{HeadResponse, HttpClient, ReqwestClient};
pub use mirror::{MirrorResult, mirror_feed};
pub use output::{render_feed, write_feed};
pub use patch::{ensure_default, feed_file_name, infer_mime_type, strip_style_suffix};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
