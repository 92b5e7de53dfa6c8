// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;

/// Directory the mirrored feed is written to when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "docs/feeds";

/// Values inserted into the channel when the origin feed omits them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDefaults {
    pub language: String,
    pub explicit: String,
    pub podcast_type: String,
    pub category: String,
    pub subcategory: String,
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            language: "zh-CN".to_string(),
            explicit: "false".to_string(),
            podcast_type: "episodic".to_string(),
            category: "Leisure".to_string(),
            subcategory: "Automotive".to_string(),
        }
    }
}

/// Validated settings for one mirror run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Feed to mirror
    pub origin_url: Url,
    /// Base address of the site the mirror is published on, without a trailing slash
    pub public_site: String,
    /// Directory receiving the mirrored feed file
    pub output_dir: PathBuf,
    /// Channel fields to backfill
    pub defaults: ChannelDefaults,
}

impl MirrorConfig {
    /// Validate raw settings into a config
    ///
    /// Both addresses must be absolute http(s) URLs. Trailing slashes are
    /// trimmed from the public site so the self link never doubles them.
    pub fn new(
        origin_url: &str,
        public_site: &str,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let origin_url = parse_http_url("origin feed", origin_url)?;
        let public_site = public_site.trim();
        parse_http_url("public site", public_site)?;

        Ok(Self {
            origin_url,
            public_site: public_site.trim_end_matches('/').to_string(),
            output_dir: output_dir.into(),
            defaults: ChannelDefaults::default(),
        })
    }

    /// Replace the backfilled channel defaults
    pub fn with_defaults(mut self, defaults: ChannelDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

fn parse_http_url(setting: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        setting,
        value: value.to_string(),
        source: e,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            setting,
            scheme: other.to_string(),
        }),
    }
}
