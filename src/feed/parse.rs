// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;

use super::document::{Document, XmlElement};

const RSS_ROOT: &str = "rss";
const CHANNEL: &str = "channel";

/// Parse feed bytes into a document tree, rejecting anything but `<rss>`
///
/// Atom `<feed>` and RSS 1.0 `<rdf:RDF>` documents fail with
/// [`FeedError::NotRss`]. The tree keeps every element, so unknown channel
/// and item content is written back unchanged.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Document, FeedError> {
    let document = Document::parse(xml_bytes)?;
    ensure_rss_root(document.root())?;
    Ok(document)
}

/// Check that the document's root element is `<rss>`
pub fn ensure_rss_root(root: &XmlElement) -> Result<(), FeedError> {
    if root.local_name() == RSS_ROOT {
        Ok(())
    } else {
        Err(FeedError::NotRss {
            root: root.name().to_string(),
        })
    }
}

/// The channel the fix-ups apply to
///
/// Only the first `<channel>` is used; RSS 2.0 allows exactly one.
pub fn channel_mut(document: &mut Document) -> Result<&mut XmlElement, FeedError> {
    document
        .root_mut()
        .child_mut(CHANNEL)
        .ok_or(FeedError::MissingChannel)
}
