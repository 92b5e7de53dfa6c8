// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::WriteError;
use crate::feed::Document;

/// Serialize a feed as an indented RSS document, XML declaration included
pub fn render_feed(document: &Document) -> Result<Vec<u8>, WriteError> {
    document.to_xml()
}

/// Write the feed to `path`, creating parent directories as needed
///
/// The file is fully overwritten. Returns the number of bytes written.
pub async fn write_feed(document: &Document, path: &Path) -> Result<u64, WriteError> {
    let xml = render_feed(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| WriteError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(path, &xml)
        .await
        .map_err(|e| WriteError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(xml.len() as u64)
}
