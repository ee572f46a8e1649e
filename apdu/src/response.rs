// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Typed response payload decoders
//!
//! Each operation's final exchange carries one of these layouts (after the
//! status trailer has been split off by
//! [ApduAnswer][crate::command::ApduAnswer]).

use crate::command::ApduError;
use crate::FELT_LEN;

/// Uncompressed EC point length
pub const PUBLIC_KEY_LEN: usize = 64;

/// Stark key length (x coordinate of the point)
pub const STARK_KEY_LEN: usize = 32;

fn check_len(data: &[u8], expected: usize) -> Result<(), ApduError> {
    if data.len() < expected {
        return Err(ApduError::PayloadTruncated {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// App version triple: `[major][minor][patch]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl AppVersion {
    /// Decode from a response payload
    pub fn parse(data: &[u8]) -> Result<Self, ApduError> {
        check_len(data, 3)?;

        Ok(Self {
            major: data[0],
            minor: data[1],
            patch: data[2],
        })
    }
}

impl core::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// App name (legacy revisions): `[len][ascii name]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppName(pub String);

impl AppName {
    /// Decode from a response payload
    pub fn parse(data: &[u8]) -> Result<Self, ApduError> {
        check_len(data, 1)?;

        let len = data[0] as usize;
        check_len(data, 1 + len)?;

        let name = &data[1..][..len];
        if !name.is_ascii() {
            return Err(ApduError::InvalidText);
        }

        Ok(Self(String::from_utf8_lossy(name).into_owned()))
    }
}

/// Public key payload: one format marker byte, then the 64-byte point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Decode from a response payload
    pub fn parse(data: &[u8]) -> Result<Self, ApduError> {
        check_len(data, 1 + PUBLIC_KEY_LEN)?;

        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(&data[1..][..PUBLIC_KEY_LEN]);
        Ok(Self(key))
    }

    /// Stark key: the first 32 bytes of the point
    pub fn stark_key(&self) -> [u8; STARK_KEY_LEN] {
        let mut key = [0u8; STARK_KEY_LEN];
        key.copy_from_slice(&self.0[..STARK_KEY_LEN]);
        key
    }
}

/// Signature payload: `[reserved][r 32][s 32][v]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component, big-endian
    pub r: [u8; 32],
    /// s component, big-endian
    pub s: [u8; 32],
    /// Recovery identifier
    pub v: u8,
}

impl Signature {
    /// Decode from a response payload
    pub fn parse(data: &[u8]) -> Result<Self, ApduError> {
        check_len(data, 66)?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&data[1..33]);
        s.copy_from_slice(&data[33..65]);

        Ok(Self { r, s, v: data[65] })
    }
}

/// Transaction signature payload: `[hash 32][reserved][r 32][s 32][v]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TxSignature {
    /// Transaction hash computed by the device
    pub hash: [u8; FELT_LEN],
    /// Signature over the hash
    pub signature: Signature,
}

impl TxSignature {
    /// Decode from a response payload
    pub fn parse(data: &[u8]) -> Result<Self, ApduError> {
        check_len(data, 98)?;

        let mut hash = [0u8; FELT_LEN];
        hash.copy_from_slice(&data[..FELT_LEN]);

        Ok(Self {
            hash,
            signature: Signature::parse(&data[FELT_LEN..])?,
        })
    }
}
