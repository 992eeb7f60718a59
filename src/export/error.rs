use std::io;

use thiserror::Error;

use super::csv_sink::SinkError;
use crate::api::{ApiError, SecretError};

/// Fatal pipeline errors. Each one ends the run with a non-zero exit status.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot determine the local OS user (USER/USERNAME are unset)")]
    Identity,

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("Account query failed: {0}")]
    Account(ApiError),

    #[error("Invalid free quantity '{value}' for {asset}: {reason}")]
    InvalidQuantity {
        asset: String,
        value: String,
        reason: String,
    },

    #[error("Failed to list trades for {symbol}: {error}")]
    Trades { symbol: String, error: ApiError },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Console output failed: {0}")]
    Console(#[from] io::Error),
}
