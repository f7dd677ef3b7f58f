use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Failures that are not plain "not found".
///
/// Expected absence (unknown artist, dead song link) is an `Option::None`,
/// never one of these.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A page passed its presence check but lacks markup the adapter needs.
    #[error("could not extract {entity}: {detail}")]
    Extraction { entity: &'static str, detail: String },

    /// A page needed to continue (e.g. a separate album listing) could not be downloaded.
    #[error("could not download {0}")]
    Unavailable(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Tor control channel: {0}")]
    Control(#[from] std::io::Error),

    #[error("Tor control channel rejected {command}: {reply}")]
    ControlRejected { command: &'static str, reply: String },
}

impl FetchError {
    pub fn extraction(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::Extraction {
            entity,
            detail: detail.into(),
        }
    }
}
