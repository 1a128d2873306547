// Error taxonomy for the whole client. Every fallible path in the crate
// funnels into one of these kinds; `main` maps each kind to its stderr
// diagnostic and the process exit status.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server could not be reached or the request was aborted
    /// (connection refused, DNS, TLS, timeout).
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not valid JSON.
    #[error("the response body is not valid JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The upload path does not reference an existing regular file.
    #[error("audio file {} not found", .0.display())]
    AudioFileNotFound(PathBuf),

    /// The file exists but its detected MIME type is not an accepted
    /// audio format.
    #[error("{} is not conforming to the audio format specifications", .0.display())]
    UnsupportedAudioFormat(PathBuf),
}
