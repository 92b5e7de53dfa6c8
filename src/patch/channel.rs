// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use crate::config::ChannelDefaults;
use crate::feed::{Namespaces, XmlElement};

use super::rules::{feed_file_name, self_link_href};
use super::{ensure_default, strip_href_suffix, strip_style_suffix_in_place};

/// Value written to `<generator>` on every run
pub const GENERATOR: &str = concat!("podmirror ", env!("CARGO_PKG_VERSION"));

const SELF_REL: &str = "self";
const RSS_MIME_TYPE: &str = "application/rss+xml";

/// `lastBuildDate` format (RFC 822 with a literal GMT zone)
const BUILD_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// What the channel-level patch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPatch {
    /// Names of the fields that were missing and received a default
    pub inserted_defaults: Vec<&'static str>,
    /// File name the mirrored feed should be written under
    pub file_name: String,
    /// Address written to the self link
    pub self_link: String,
}

/// Apply the channel-level fix-ups in place
///
/// Safe to run repeatedly: existing values win over defaults, so a second
/// pass only refreshes `lastBuildDate` and recomputes the self link.
/// Elements the fix-ups do not name are left exactly as parsed.
pub fn patch_channel(
    channel: &mut XmlElement,
    namespaces: &Namespaces,
    defaults: &ChannelDefaults,
    public_site: &str,
    now: DateTime<Utc>,
) -> ChannelPatch {
    set_child_text(channel, "generator", GENERATOR);

    let inserted_defaults = insert_defaults(channel, namespaces, defaults);

    set_child_text(
        channel,
        "lastBuildDate",
        &now.format(BUILD_DATE_FORMAT).to_string(),
    );

    if let Some(url_element) = channel
        .child_mut("image")
        .and_then(|image| image.child_mut("url"))
    {
        if let Some(mut url) = url_element.text() {
            if strip_style_suffix_in_place(&mut url) {
                url_element.set_text(&url);
            }
        }
    }
    if let Some(image) = channel.child_mut(&namespaces.itunes("image")) {
        strip_href_suffix(image);
    }

    let link = channel.child("link").and_then(XmlElement::text);
    let file_name = feed_file_name(link.as_deref());
    let self_link = self_link_href(public_site, &file_name);
    set_self_link(channel, namespaces, &self_link);

    ChannelPatch {
        inserted_defaults,
        file_name,
        self_link,
    }
}

/// Overwrite a child's text, creating the child when missing
fn set_child_text(parent: &mut XmlElement, name: &str, text: &str) {
    match parent.child_mut(name) {
        Some(child) => child.set_text(text),
        None => parent.push_child(XmlElement::with_text(name, text)),
    }
}

fn insert_defaults(
    channel: &mut XmlElement,
    namespaces: &Namespaces,
    defaults: &ChannelDefaults,
) -> Vec<&'static str> {
    let mut inserted = Vec::new();

    if ensure_default(channel, XmlElement::with_text("language", &defaults.language)) {
        inserted.push("language");
    }
    if ensure_default(
        channel,
        XmlElement::with_text(namespaces.itunes("explicit"), &defaults.explicit),
    ) {
        inserted.push("itunes:explicit");
    }
    if ensure_default(
        channel,
        XmlElement::with_text(namespaces.itunes("type"), &defaults.podcast_type),
    ) {
        inserted.push("itunes:type");
    }
    if ensure_default(channel, category(namespaces, defaults)) {
        inserted.push("itunes:category");
    }

    inserted
}

fn category(namespaces: &Namespaces, defaults: &ChannelDefaults) -> XmlElement {
    let mut category =
        XmlElement::new(namespaces.itunes("category")).with_attribute("text", &defaults.category);
    category.push_child(
        XmlElement::new(namespaces.itunes("category"))
            .with_attribute("text", &defaults.subcategory),
    );
    category
}

fn is_self_link(link: &XmlElement) -> bool {
    link.attribute("rel").as_deref() == Some(SELF_REL)
}

/// Point the channel's single `atom:link rel="self"` at `href`
///
/// The first existing self link is reused and any further ones are dropped.
fn set_self_link(channel: &mut XmlElement, namespaces: &Namespaces, href: &str) {
    let link_name = namespaces.atom("link");

    let mut seen_self = false;
    channel.retain_elements(|element| {
        if element.name() != link_name || !is_self_link(element) {
            return true;
        }
        let keep = !seen_self;
        seen_self = true;
        keep
    });

    if !channel.children_named(&link_name).any(is_self_link) {
        channel.push_child(XmlElement::new(link_name.as_str()).with_attribute("rel", SELF_REL));
    }

    if let Some(link) = channel
        .children_named_mut(&link_name)
        .find(|link| is_self_link(link))
    {
        link.set_attribute("href", href);
        if link.attribute("type").is_none() {
            link.set_attribute("type", RSS_MIME_TYPE);
        }
    }
}
