// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Status words returned in the 2-byte trailer of every response

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Status words known to the Starknet app, current and legacy revisions.
///
/// Every response ends with one of these (big-endian u16). Codes outside
/// this table surface to callers as the raw u16 rather than being folded
/// into a catch-all variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, strum::Display)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    Ok = 0x9000,

    /// Device is busy
    Busy = 0x9001,

    /// Command execution failed
    ExecutionError = 0x6400,

    /// Wrong request length
    WrongLength = 0x6700,

    /// Key derivation failed
    KeyDerivationError = 0x6802,

    /// Empty request buffer
    EmptyBuffer = 0x6982,

    /// Output buffer too small
    OutputBufferTooSmall = 0x6983,

    /// Request data invalid
    DataInvalid = 0x6984,

    /// Rejected by user
    UserRejected = 0x6985,

    /// Transaction rejected
    TransactionRejected = 0x6986,

    /// Bad key handle
    BadKeyHandle = 0x6a80,

    /// Invalid P1 or P2 parameter
    InvalidP1P2 = 0x6b00,

    /// Instruction not supported
    BadIns = 0x6d00,

    /// Class not supported (app not open)
    BadCla = 0x6e00,

    /// Unknown error
    Unknown = 0x6f00,

    /// Signature verification failed
    SignVerifyError = 0x6f01,
}

impl StatusWord {
    /// Whether the word signals success
    pub fn is_ok(&self) -> bool {
        *self == StatusWord::Ok
    }

    /// Human-readable description of the status
    pub fn description(&self) -> &'static str {
        use StatusWord::*;

        match self {
            Ok => "no error",
            Busy => "device is busy",
            ExecutionError => "execution error",
            WrongLength => "wrong length",
            KeyDerivationError => "error deriving keys",
            EmptyBuffer => "empty buffer",
            OutputBufferTooSmall => "output buffer too small",
            DataInvalid => "data is invalid",
            UserRejected => "rejected by user",
            TransactionRejected => "transaction rejected",
            BadKeyHandle => "bad key handle",
            InvalidP1P2 => "invalid P1/P2",
            BadIns => "instruction not supported",
            BadCla => "app does not seem to be open",
            Unknown => "unknown error",
            SignVerifyError => "sign/verify error",
        }
    }
}
