use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller asked for a range key outside the lookup table
    #[error("unrecognized time range: {0:?}")]
    InvalidRange(String),

    #[error("no token address configured")]
    TokenNotConfigured,

    #[error("ledger indexer returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("ledger indexer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger indexer sent an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// True when the ledger collaborator, not the caller, is at fault.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamStatus(_) | Error::Transport(_) | Error::Decode(_)
        )
    }
}
