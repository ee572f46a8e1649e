// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command envelope and response frame codecs
//!
//! One [ApduCommand] is one request/response exchange: a 4-byte header
//! (class, instruction, p1, p2) plus a length-prefixed payload of at most
//! [APDU_MAX_PAYLOAD][crate::APDU_MAX_PAYLOAD] bytes. Responses carry an
//! arbitrary payload followed by a 2-byte big-endian status trailer.

use byteorder::{BigEndian, ByteOrder};

use crate::status::StatusWord;
use crate::{APDU_MAX_PAYLOAD, STARK_APDU_CLA};

/// Envelope / frame codec errors
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApduError {
    /// Payload exceeds the single-exchange chunk limit
    #[error("payload length {0} exceeds the 250-byte chunk limit")]
    PayloadTooLong(usize),

    /// Response shorter than the mandatory status trailer
    #[error("response shorter than the 2-byte status trailer")]
    ResponseTooShort,

    /// Response payload shorter than the operation requires
    #[error("response payload truncated (expected at least {expected} bytes, got {actual})")]
    PayloadTruncated {
        /// Minimum length required by the operation
        expected: usize,
        /// Length actually received
        actual: usize,
    },

    /// Response payload carries non-ASCII text
    #[error("response text is not valid ascii")]
    InvalidText,
}

/// A single command envelope.
///
/// Immutable once constructed; the orchestrator signals chunk position and
/// operation step purely through `p1`/`p2`, never by mutating an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduCommand {
    /// Class byte, fixed per application
    pub cla: u8,
    /// Instruction code
    pub ins: u8,
    /// First parameter (step index or chunk tag)
    pub p1: u8,
    /// Second parameter (chunk tag or flags)
    pub p2: u8,
    /// Payload, at most [APDU_MAX_PAYLOAD] bytes
    pub data: Vec<u8>,
}

impl ApduCommand {
    /// Build an envelope for the Starknet app class, enforcing the
    /// single-exchange payload limit.
    pub fn new(ins: impl Into<u8>, p1: u8, p2: u8, data: Vec<u8>) -> Result<Self, ApduError> {
        if data.len() > APDU_MAX_PAYLOAD {
            return Err(ApduError::PayloadTooLong(data.len()));
        }

        Ok(Self {
            cla: STARK_APDU_CLA,
            ins: ins.into(),
            p1,
            p2,
            data,
        })
    }

    /// Serialize to wire form: `[cla][ins][p1][p2][len][payload]`
    pub fn serialize(&self) -> Vec<u8> {
        let mut buff = Vec::with_capacity(5 + self.data.len());

        buff.push(self.cla);
        buff.push(self.ins);
        buff.push(self.p1);
        buff.push(self.p2);
        buff.push(self.data.len() as u8);
        buff.extend_from_slice(&self.data);

        buff
    }
}

/// A decoded response frame: payload plus status trailer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduAnswer {
    /// Response payload (everything before the trailer)
    pub data: Vec<u8>,
    /// Raw status word from the trailer
    pub retcode: u16,
}

impl ApduAnswer {
    /// Split a raw response into payload and status trailer.
    ///
    /// Every well-formed response is at least 2 bytes; anything shorter is
    /// a transport-level framing fault.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ApduError> {
        if raw.len() < 2 {
            return Err(ApduError::ResponseTooShort);
        }

        let (data, trailer) = raw.split_at(raw.len() - 2);

        Ok(Self {
            data: data.to_vec(),
            retcode: BigEndian::read_u16(trailer),
        })
    }

    /// Decode the status trailer, returning the raw code for words outside
    /// the known table.
    pub fn status(&self) -> Result<StatusWord, u16> {
        StatusWord::try_from(self.retcode).map_err(|_| self.retcode)
    }
}
