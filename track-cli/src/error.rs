use std::io;

use thiserror::Error;

use track_error::TrackError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Couldn't retrieve home directory!")]
    HomeDirNotFound,

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    TrackError(#[from] TrackError),
}
