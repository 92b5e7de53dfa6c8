// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::feed::{Namespaces, XmlElement, probe_content_length};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::rules::infer_mime_type;
use super::{ensure_default, strip_href_suffix};

/// Explicit flag used when neither the item nor the channel declares one
const FALLBACK_EXPLICIT: &str = "false";

/// Episode type used when the item does not declare one
const DEFAULT_EPISODE_TYPE: &str = "full";

/// What happened to an enclosure's declared length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthOutcome {
    /// No enclosure, or it already carried a usable length
    Kept,
    /// The length was missing and the probe supplied one
    Filled(u64),
    /// The length was missing and the probe produced nothing
    ProbeFailed,
}

/// What the item-level patch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPatch {
    /// The enclosure MIME type was replaced by an inferred one
    pub mime_updated: bool,
    pub length: LengthOutcome,
}

/// Apply the per-item fix-ups in place
///
/// `channel_explicit` is the channel's `itunes:explicit` value, inherited by
/// items that lack their own. Probe failures are absorbed and reported.
pub async fn patch_item<C: HttpClient>(
    client: &C,
    item: &mut XmlElement,
    namespaces: &Namespaces,
    channel_explicit: Option<&str>,
    reporter: &SharedProgressReporter,
) -> ItemPatch {
    let (mime_updated, length) = match item.child_mut("enclosure") {
        Some(enclosure) => (
            update_mime_type(enclosure),
            backfill_length(client, enclosure, reporter).await,
        ),
        None => (false, LengthOutcome::Kept),
    };

    ensure_default(
        item,
        XmlElement::with_text(
            namespaces.itunes("explicit"),
            channel_explicit.unwrap_or(FALLBACK_EXPLICIT),
        ),
    );
    ensure_default(
        item,
        XmlElement::with_text(namespaces.itunes("episodeType"), DEFAULT_EPISODE_TYPE),
    );
    if let Some(image) = item.child_mut(&namespaces.itunes("image")) {
        strip_href_suffix(image);
    }

    ItemPatch {
        mime_updated,
        length,
    }
}

fn enclosure_url(enclosure: &XmlElement) -> String {
    enclosure.attribute("url").unwrap_or_default()
}

fn update_mime_type(enclosure: &mut XmlElement) -> bool {
    match infer_mime_type(&enclosure_url(enclosure)) {
        Some(mime) if enclosure.attribute("type").as_deref() != Some(mime) => {
            enclosure.set_attribute("type", mime);
            true
        }
        _ => false,
    }
}

/// An absent length, `""` or `"0"` carries no information
fn needs_length(enclosure: &XmlElement) -> bool {
    match enclosure.attribute("length") {
        Some(length) => matches!(length.trim(), "" | "0"),
        None => true,
    }
}

async fn backfill_length<C: HttpClient>(
    client: &C,
    enclosure: &mut XmlElement,
    reporter: &SharedProgressReporter,
) -> LengthOutcome {
    if !needs_length(enclosure) {
        return LengthOutcome::Kept;
    }

    let url = enclosure_url(enclosure);
    reporter.report(ProgressEvent::ProbingLength { url: url.clone() });

    match probe_content_length(client, &url).await {
        Some(length) => {
            enclosure.set_attribute("length", &length.to_string());
            reporter.report(ProgressEvent::LengthFilled { url, length });
            LengthOutcome::Filled(length)
        }
        None => {
            reporter.report(ProgressEvent::ProbeFailed { url });
            LengthOutcome::ProbeFailed
        }
    }
}
