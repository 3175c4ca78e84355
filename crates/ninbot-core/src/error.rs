//! Crate-level error type.

use crate::client::Rank;
use crate::pages::ParseError;
use crate::transport::{BodyError, NetworkError};

/// Everything an action can fail with.
///
/// Precondition errors (`NotLoggedIn`, `NotAwake`, `NotInBattle`,
/// `NotAsleep`) and name-resolution errors are raised before any request is
/// sent.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Not awake")]
    NotAwake,

    #[error("Not in battle")]
    NotInBattle,

    #[error("Not asleep")]
    NotAsleep,

    #[error("Network failure after {attempts} attempts: {source}")]
    Network {
        attempts: u32,
        #[source]
        source: NetworkError,
    },

    #[error("Failed to read response body after {attempts} attempts: {source}")]
    BodyRead {
        attempts: u32,
        #[source]
        source: BodyError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Action does not exist: {0}")]
    UnknownAction(String),

    #[error("Opponent does not exist: {0}")]
    UnknownOpponent(String),

    #[error("Training is not supported for rank {0}")]
    UnsupportedRank(Rank),

    #[error("No \"Your action has been submitted\" after attacking")]
    ActionNotSubmitted,

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(&'static str),
}

impl Error {
    /// Whether the transport gave up on a condition that may clear by itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::BodyRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
