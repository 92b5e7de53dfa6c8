use url::Url;

/// File name used when the channel link yields nothing usable
pub const DEFAULT_FEED_NAME: &str = "feed";

/// Extension appended to the derived feed file name
pub const FEED_EXTENSION: &str = "xml";

/// Audio extensions whose MIME type is known with confidence
const AUDIO_MIME_TYPES: [(&str, &str); 4] = [
    (".m4a", "audio/mp4"),
    (".mp3", "audio/mpeg"),
    (".aac", "audio/aac"),
    (".wav", "audio/wav"),
];

/// Remove a CDN style suffix (`cover.jpg@middle`) from an image URL
///
/// Everything from the first `@` on is dropped; URLs without one are returned unchanged.
pub fn strip_style_suffix(url: &str) -> &str {
    match url.split_once('@') {
        Some((canonical, _)) => canonical,
        None => url,
    }
}

/// Infer an enclosure MIME type from the URL's file extension
///
/// The whole URL is matched case-insensitively, query string and fragment
/// included, so `ep.m4a?token=abc.mp3` reads as MP3 and `ep.wav#t=10` as
/// nothing. Returns `None` for anything outside the known audio extensions.
pub fn infer_mime_type(url: &str) -> Option<&'static str> {
    let url = url.to_ascii_lowercase();

    AUDIO_MIME_TYPES
        .iter()
        .find(|(ext, _)| url.ends_with(ext))
        .map(|(_, mime)| *mime)
}

/// Derive the mirrored feed's file name from the channel link
///
/// Uses the last non-empty path segment of the link, sanitized for the
/// file system, with [`FEED_EXTENSION`] appended. Falls back to
/// [`DEFAULT_FEED_NAME`] when the link is missing, unparseable or has no path.
pub fn feed_file_name(link: Option<&str>) -> String {
    let stem = link
        .and_then(|link| Url::parse(link.trim()).ok())
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .map(sanitize_filename::sanitize)
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_FEED_NAME.to_string());

    format!("{}.{}", stem, FEED_EXTENSION)
}

/// Address the mirrored feed is published at
pub fn self_link_href(public_site: &str, file_name: &str) -> String {
    format!("{}/feeds/{}", public_site.trim_end_matches('/'), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Style suffix tests ===

    #[test]
    fn strips_style_suffix() {
        assert_eq!(
            strip_style_suffix("https://cdn.example/img/cover.jpg@middle"),
            "https://cdn.example/img/cover.jpg"
        );
    }

    #[test]
    fn strips_at_first_marker() {
        assert_eq!(
            strip_style_suffix("https://cdn.example/a.png@small@2x"),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn leaves_plain_urls_alone() {
        let url = "https://cdn.example/img/cover.jpg?w=300#top";
        assert_eq!(strip_style_suffix(url), url);
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip_style_suffix("https://cdn.example/x.jpg@large");
        assert_eq!(strip_style_suffix(once), once);
    }

    #[test]
    fn strip_handles_empty() {
        assert_eq!(strip_style_suffix(""), "");
    }

    // === MIME inference tests ===

    #[test]
    fn infers_known_audio_types() {
        assert_eq!(infer_mime_type("https://x/ep.mp3"), Some("audio/mpeg"));
        assert_eq!(infer_mime_type("https://x/ep.m4a"), Some("audio/mp4"));
        assert_eq!(infer_mime_type("https://x/ep.aac"), Some("audio/aac"));
        assert_eq!(infer_mime_type("https://x/ep.wav"), Some("audio/wav"));
    }

    #[test]
    fn infers_relative_urls() {
        assert_eq!(infer_mime_type("episode12.m4a"), Some("audio/mp4"));
    }

    #[test]
    fn inference_is_case_insensitive() {
        assert_eq!(infer_mime_type("https://x/EP.MP3"), Some("audio/mpeg"));
    }

    #[test]
    fn inference_matches_whole_url_including_query() {
        assert_eq!(
            infer_mime_type("https://x/ep.m4a?token=abc.mp3"),
            Some("audio/mpeg")
        );
        assert_eq!(infer_mime_type("https://x/ep.wav#t=10"), None);
        assert_eq!(infer_mime_type("https://x/ep.mp3?dl=1"), None);
    }

    #[test]
    fn unknown_extensions_are_not_inferred() {
        assert_eq!(infer_mime_type("https://x/ep.ogg"), None);
        assert_eq!(infer_mime_type("https://x/ep.mp3.html"), None);
        assert_eq!(infer_mime_type("https://x/episode"), None);
        assert_eq!(infer_mime_type(""), None);
    }

    // === File name tests ===

    #[test]
    fn file_name_from_last_segment() {
        assert_eq!(
            feed_file_name(Some("https://example.com/shows/roadtrip")),
            "roadtrip.xml"
        );
    }

    #[test]
    fn file_name_skips_trailing_slash() {
        assert_eq!(
            feed_file_name(Some("https://example.com/shows/roadtrip/")),
            "roadtrip.xml"
        );
    }

    #[test]
    fn file_name_ignores_query() {
        assert_eq!(
            feed_file_name(Some("https://example.com/podcast/42?from=rss")),
            "42.xml"
        );
    }

    #[test]
    fn file_name_falls_back_without_link() {
        assert_eq!(feed_file_name(None), "feed.xml");
    }

    #[test]
    fn file_name_falls_back_for_bare_host() {
        assert_eq!(feed_file_name(Some("https://example.com/")), "feed.xml");
        assert_eq!(feed_file_name(Some("https://example.com")), "feed.xml");
    }

    #[test]
    fn file_name_falls_back_for_unparseable_link() {
        assert_eq!(feed_file_name(Some("not a link")), "feed.xml");
        assert_eq!(feed_file_name(Some("")), "feed.xml");
    }

    #[test]
    fn file_name_is_sanitized() {
        let name = feed_file_name(Some("https://example.com/a/show%3Cname%3E"));
        assert!(!name.contains('/'));
        assert!(name.ends_with(".xml"));
    }

    // === Self link tests ===

    #[test]
    fn self_link_joins_site_and_name() {
        assert_eq!(
            self_link_href("https://mirror.example.org", "roadtrip.xml"),
            "https://mirror.example.org/feeds/roadtrip.xml"
        );
    }

    #[test]
    fn self_link_does_not_double_slashes() {
        assert_eq!(
            self_link_href("https://mirror.example.org/", "feed.xml"),
            "https://mirror.example.org/feeds/feed.xml"
        );
    }
}
