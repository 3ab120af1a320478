//! Error types for the search command.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised while resolving options, before any query is issued.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither keywords nor a source file were given.
    #[error("You have to specify keywords to search for or a file (--file) to parse.")]
    MissingInput,

    /// A numeric option was not a positive integer.
    #[error("Invalid value for --{option}: {value} (expected a positive integer)")]
    InvalidNumber { option: &'static str, value: i64 },

    /// The dump target exists and overwriting was not forced.
    #[error("file {} already exists. Use --force-dump to allow file override.", .0.display())]
    DumpExists(PathBuf),

    /// The dump target's directory cannot be written.
    #[error("file {} cannot be written", .0.display())]
    DumpUnwritable(PathBuf),

    /// The proxy string could not be parsed.
    #[error("Invalid proxy '{proxy}': {reason}")]
    InvalidProxy { proxy: String, reason: String },
}

/// Errors that can occur while running a search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Option resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport collaborator failed (browser launch, navigation, bot block).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The `--file` source could not be read.
    #[error("Cannot read file {}: {source}", .path.display())]
    SourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dump file could not be written.
    #[error("An error happened while dumping the file {}: {reason}", .path.display())]
    DumpWrite { path: PathBuf, reason: String },

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}
