use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("lookup timed out after {0} seconds")]
    Timeout(u64),

    #[error("lookup service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed lookup response: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
