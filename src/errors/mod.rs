use std::path::PathBuf;

use thiserror::Error;

use crate::database::PlayerId;

/// Rejected user input. Nothing has been written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("tournament name must not be empty")]
    EmptyTournamentName,
    #[error("a player cannot play against themselves")]
    SamePlayer,
    #[error("winner {winner_id} did not play in this match")]
    WinnerNotParticipant { winner_id: PlayerId },
    #[error("player {0} does not exist")]
    UnknownPlayer(PlayerId),
    #[error("a tournament needs at least one placement")]
    NoPlacements,
    #[error("placement must be 1 or greater, got {0}")]
    InvalidPlacement(i64),
    #[error("player {0} is placed more than once")]
    DuplicatePlacementPlayer(PlayerId),
    #[error("position {0} is assigned more than once")]
    DuplicatePosition(u32),
    #[error("unknown feed filter '{0}'")]
    UnknownFilter(String),
}

/// Image upload failures abort the submission that carried the image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image is not a base64 data URL")]
    InvalidDataUrl,
    #[error("image payload is not valid base64")]
    Decode(#[from] base64::DecodeError),
    #[error("image payload is empty")]
    Empty,
    #[error("failed to write image to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read image from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// True when the error chain carries a [`ValidationError`].
pub fn is_validation(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ValidationError>().is_some()
}

/// True when the error chain carries an [`UploadError`].
pub fn is_upload(error: &anyhow::Error) -> bool {
    error.downcast_ref::<UploadError>().is_some()
}
