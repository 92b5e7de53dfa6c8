mod document;
mod fetch;
mod parse;

pub use document::{ATOM_NAMESPACE, Document, ITUNES_NAMESPACE, Namespaces, XmlElement, XmlNode};
pub use fetch::{fetch_feed_bytes, probe_content_length};
pub use parse::{channel_mut, ensure_rss_root, parse_feed};
