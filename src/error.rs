use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating the mirror configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {setting} URL '{value}': {source}")]
    InvalidUrl {
        setting: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported scheme '{scheme}' for {setting} (expected http or https)")]
    UnsupportedScheme {
        setting: &'static str,
        scheme: String,
    },
}

/// Errors that can occur when fetching or parsing the origin feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Only RSS 2.0 is supported, found root element <{root}>")]
    NotRss { root: String },

    #[error("Feed document contains no root element")]
    EmptyDocument,

    #[error("Feed has no <channel> element")]
    MissingChannel,

    #[error("Feed ends inside element <{name}>")]
    UnclosedElement { name: String },

    #[error("Feed is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Failed to read feed XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Errors that can occur while writing the mirrored feed
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to serialize feed: {0}")]
    SerializeFailed(String),

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write feed file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors for a mirror run
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}
