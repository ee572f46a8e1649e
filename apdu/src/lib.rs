// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for the Starknet Ledger app
//!
//! This crate specifies the host side of the Starknet app command set:
//! instruction codes and status words, the command envelope and response
//! frame codecs, EIP-2645 derivation path serialization, field element
//! canonicalization, payload chunking, and the per-operation APDU sequence
//! builders used by the client orchestrator.
//!
//! Everything here is pure encoding/decoding with no transport coupling,
//! so the whole protocol surface can be tested against recorded wire bytes.
//! All multi-byte fields are big-endian; field elements are 32-byte values.

use num_enum::IntoPrimitive;

pub mod chunk;
pub mod command;
pub mod felt;
pub mod path;
pub mod response;
pub mod status;
pub mod tx;

/// Starknet app APDU class
pub const STARK_APDU_CLA: u8 = 0x5a;

/// Maximum payload carried by a single APDU exchange
pub const APDU_MAX_PAYLOAD: usize = 250;

/// Field element width in bytes
pub const FELT_LEN: usize = 32;

/// Field elements carried per chunked data exchange
pub const FELTS_PER_CHUNK: usize = 7;

/// Starknet app instruction codes (current protocol)
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch app version
    GetVersion = 0x00,

    /// Fetch public key for a derivation path
    GetPubKey = 0x01,

    /// Sign a pre-computed hash
    SignHash = 0x02,

    /// Sign a v3 invoke transaction
    SignTx = 0x03,

    /// Sign a v1 invoke transaction
    SignTxV1 = 0x04,

    /// Sign a v3 deploy-account transaction
    DeployAccount = 0x05,

    /// Sign a v1 deploy-account transaction
    DeployAccountV1 = 0x06,
}

/// Instruction codes used by legacy app revisions.
///
/// The legacy app multiplexed hash signing through `Sign` with
/// payload-type chunk tags (see [chunk::PayloadType]) rather than per-step
/// parameter indices, and exposed the app name as its own instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum LegacyInstruction {
    /// Fetch app version
    GetVersion = 0x00,

    /// Fetch app name
    GetAppName = 0x01,

    /// Fetch public key for a derivation path
    GetPubKey = 0x02,

    /// Sign a pre-computed hash
    Sign = 0x03,

    /// Sign an invoke transaction
    SignTx = 0x04,
}

/// App protocol revision, selecting the instruction set, chunk tagging and
/// hash padding convention.
///
/// The wire layouts genuinely differ between revisions; callers targeting
/// an old firmware select [Protocol::Legacy] rather than the client
/// guessing from responses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Single-call signing app revisions
    Legacy,
    /// Current app protocol
    #[default]
    Current,
}

impl Protocol {
    /// Hash padding convention used by this revision
    pub fn hash_padding(&self) -> felt::HashPadding {
        match self {
            Protocol::Legacy => felt::HashPadding::Trailing,
            Protocol::Current => felt::HashPadding::Leading,
        }
    }
}
