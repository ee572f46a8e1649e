// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::fmt::{Debug, Display};

use tokio::time::error::Elapsed;

use crate::apdu::command::ApduError;
use crate::apdu::felt::FeltError;
use crate::apdu::path::PathError;
use crate::apdu::status::StatusWord;

/// Starknet Ledger API error type, generic over the transport error.
///
/// Input validation failures ([Error::Path], [Error::Felt]) are raised
/// before any exchange is issued; a non-success status aborts the
/// in-progress operation carrying that step's mapped word. Nothing here is
/// retried: a partially-completed signing operation has already consumed
/// on-device state and must be restarted from the first step.
#[derive(Debug, thiserror::Error)]
pub enum Error<E: Display + Debug> {
    /// Transport failure (disconnect, framing fault)
    #[error("transport error: {0}")]
    Transport(E),

    /// Timeout waiting for the device response
    #[error("timeout waiting for device response")]
    RequestTimeout,

    /// Device returned a non-success status word
    #[error("device signalled {0}: {}", .0.description())]
    Status(StatusWord),

    /// Device returned a status word outside the known table
    #[error("unrecognised status word {0:#06x}")]
    UnknownStatus(u16),

    /// Envelope construction or response decoding failed
    #[error(transparent)]
    Apdu(#[from] ApduError),

    /// Malformed derivation path
    #[error(transparent)]
    Path(#[from] PathError),

    /// Numeric input rejected during canonicalization
    #[error(transparent)]
    Felt(#[from] FeltError),

    /// Typed-data hasher collaborator failed
    #[error("typed data hashing failed: {0}")]
    Hasher(String),
}

impl<E: Display + Debug> From<Elapsed> for Error<E> {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}
