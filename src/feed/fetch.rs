// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;

use crate::error::FeedError;
use crate::http::HttpClient;

/// Fetch raw feed bytes from the origin
pub async fn fetch_feed_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes, FeedError> {
    let bytes = client
        .get_bytes(url)
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;
    Ok(bytes)
}

/// Ask the server for the size of a media file without downloading it
///
/// Any failure (transport error, timeout, non-2xx status, missing header)
/// yields `None`. Callers treat the length as best-effort enrichment.
pub async fn probe_content_length<C: HttpClient>(client: &C, url: &str) -> Option<u64> {
    match client.head(url).await {
        Ok(response) if response.is_success() => response.content_length,
        _ => None,
    }
}
