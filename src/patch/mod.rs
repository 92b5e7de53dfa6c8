mod channel;
mod item;
mod rules;

pub use channel::{ChannelPatch, GENERATOR, patch_channel};
pub use item::{ItemPatch, LengthOutcome, patch_item};
pub use rules::{
    DEFAULT_FEED_NAME, FEED_EXTENSION, feed_file_name, infer_mime_type, self_link_href,
    strip_style_suffix,
};

use crate::feed::XmlElement;

/// Append `default` to `parent` unless a child with the same name exists
///
/// Returns `true` when the default was written. Every "insert only if
/// absent" rule in the patch set goes through here; an existing child wins
/// even when it is empty.
pub fn ensure_default(parent: &mut XmlElement, default: XmlElement) -> bool {
    if parent.child(default.name()).is_some() {
        return false;
    }
    parent.push_child(default);
    true
}

/// Apply [`strip_style_suffix`] to an image URL in place
///
/// Returns `true` when the URL changed.
fn strip_style_suffix_in_place(url: &mut String) -> bool {
    let stripped = strip_style_suffix(url).len();
    let changed = stripped != url.len();
    url.truncate(stripped);
    changed
}

/// Strip the style suffix from an element's `href` attribute (`itunes:image`)
fn strip_href_suffix(element: &mut XmlElement) {
    if let Some(mut url) = element.attribute("href") {
        if strip_style_suffix_in_place(&mut url) {
            element.set_attribute("href", &url);
        }
    }
}
