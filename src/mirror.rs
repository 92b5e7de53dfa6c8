// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::Utc;

use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::feed::{Namespaces, XmlElement, channel_mut, fetch_feed_bytes, parse_feed};
use crate::http::HttpClient;
use crate::output::write_feed;
use crate::patch::{LengthOutcome, patch_channel, patch_item};
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Result of a mirror run
#[derive(Debug, Clone)]
pub struct MirrorResult {
    /// File the mirrored feed was written to
    pub output_path: PathBuf,
    /// Address written into the feed's self link
    pub self_link: String,
    /// Number of items in the feed
    pub items: usize,
    /// Enclosures whose length was filled in by a probe
    pub lengths_filled: usize,
    /// Enclosures whose length probe produced nothing
    pub probes_failed: usize,
    /// Enclosures whose MIME type was replaced
    pub mime_types_updated: usize,
    /// Channel fields that received a default
    pub inserted_defaults: Vec<&'static str>,
    /// Size of the written file in bytes
    pub bytes_written: u64,
}

/// Mirror the configured origin feed to the output directory
///
/// This is the main entry point for the library. It:
/// 1. Fetches the origin feed and rejects anything but RSS 2.0
/// 2. Applies the channel fix-ups (defaults, build date, images, self link)
/// 3. Applies the item fix-ups in document order, probing enclosure lengths
/// 4. Writes the result to `{output_dir}/{derived file name}`
///
/// Fetch, format and write failures abort the run before the file is
/// touched; probe failures never do.
pub async fn mirror_feed<C: HttpClient>(
    client: &C,
    config: &MirrorConfig,
    reporter: SharedProgressReporter,
) -> Result<MirrorResult, MirrorError> {
    let origin = config.origin_url.as_str();

    reporter.report(ProgressEvent::FetchingFeed {
        url: origin.to_string(),
    });
    let bytes = fetch_feed_bytes(client, origin).await?;

    reporter.report(ProgressEvent::ParsingFeed { bytes: bytes.len() });
    let mut document = parse_feed(&bytes)?;
    let namespaces = Namespaces::declare(&mut document);
    let channel = channel_mut(&mut document)?;

    let channel_patch = patch_channel(
        channel,
        &namespaces,
        &config.defaults,
        &config.public_site,
        Utc::now(),
    );

    let items = channel.children_named("item").count();
    reporter.report(ProgressEvent::ChannelPatched {
        title: channel
            .child("title")
            .and_then(XmlElement::text)
            .map(|title| title.trim().to_string())
            .unwrap_or_default(),
        item_count: items,
        inserted_defaults: channel_patch.inserted_defaults.clone(),
    });

    let channel_explicit = channel
        .child(&namespaces.itunes("explicit"))
        .and_then(XmlElement::text);

    let mut lengths_filled = 0;
    let mut probes_failed = 0;
    let mut mime_types_updated = 0;

    for item in channel.children_named_mut("item") {
        let item_patch = patch_item(
            client,
            item,
            &namespaces,
            channel_explicit.as_deref(),
            &reporter,
        )
        .await;

        if item_patch.mime_updated {
            mime_types_updated += 1;
        }
        match item_patch.length {
            LengthOutcome::Filled(_) => lengths_filled += 1,
            LengthOutcome::ProbeFailed => probes_failed += 1,
            LengthOutcome::Kept => {}
        }
    }

    let output_path = config.output_dir.join(&channel_patch.file_name);
    let bytes_written = write_feed(&document, &output_path).await?;

    reporter.report(ProgressEvent::FeedWritten {
        path: output_path.clone(),
        bytes: bytes_written,
        self_link: channel_patch.self_link.clone(),
    });

    Ok(MirrorResult {
        output_path,
        self_link: channel_patch.self_link,
        items,
        lengths_filled,
        probes_failed,
        mime_types_updated,
        inserted_defaults: channel_patch.inserted_defaults,
        bytes_written,
    })
}
