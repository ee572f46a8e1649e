// Copyright (c) 2022-2023 The MobileCoin Foundation

//! EIP-2645 derivation path parsing and serialization

use core::fmt;
use core::str::FromStr;

use byteorder::{BigEndian, ByteOrder};

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Fixed purpose segment for EIP-2645 paths
pub const EIP2645_PURPOSE: u32 = 2645;

/// Derivation path errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path does not carry the EIP-2645 prefix
    #[error("derivation path must start with 'm/2645' (e.g. \"m/2645'/1195502025'/1148870696'/0'/0'/0\")")]
    InvalidPrefix,

    /// Segment is not a decimal number
    #[error("path segment '{0}' is not a number")]
    InvalidSegment(String),

    /// Segment collides with the hardening bit
    #[error("path segment {0} exceeds the hardened boundary (2^31)")]
    SegmentOutOfRange(u32),
}

/// An EIP-2645 derivation path.
///
/// Parsed from the textual `m/2645'/…` form; segments are stored with the
/// hardened flag already applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationPath(Vec<u32>);

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("m/2645") {
            return Err(PathError::InvalidPrefix);
        }

        let mut segments = Vec::new();

        for child in s.split('/').skip(1) {
            let (raw, hardened) = match child.strip_suffix('\'') {
                Some(v) => (v, true),
                None => (child, false),
            };

            let value: u32 = raw
                .parse()
                .map_err(|_| PathError::InvalidSegment(child.to_string()))?;

            if value >= HARDENED {
                return Err(PathError::SegmentOutOfRange(value));
            }

            segments.push(if hardened { value + HARDENED } else { value });
        }

        Ok(Self(segments))
    }
}

impl DerivationPath {
    /// Path segments with the hardened flag applied
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Serialize to wire form: 4 bytes per segment, big-endian
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buff = vec![0u8; self.0.len() * 4];

        for (i, segment) in self.0.iter().enumerate() {
            BigEndian::write_u32(&mut buff[i * 4..][..4], *segment);
        }

        buff
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.0 {
            match segment & HARDENED {
                0 => write!(f, "/{segment}")?,
                _ => write!(f, "/{}'", segment & !HARDENED)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PATH: &str = "m/2645'/1195502025'/1148870696'/0'/0'/0";

    #[test]
    fn serialize_known_path() {
        let p: DerivationPath = PATH.parse().unwrap();

        let encoded = p.to_bytes();
        assert_eq!(
            encoded,
            hex::decode("80000a55c741e9c9c47a6028800000008000000000000000").unwrap(),
        );
        assert_eq!(&encoded[..4], &[0x80, 0x00, 0x0a, 0x55]);
    }

    #[test]
    fn segments_round_trip() {
        let p: DerivationPath = PATH.parse().unwrap();
        let encoded = p.to_bytes();
        assert_eq!(encoded.len(), 4 * p.segments().len());

        // Re-derive raw segment values by masking the hardened bit
        let raw: Vec<u32> = encoded
            .chunks(4)
            .map(|c| BigEndian::read_u32(c) & !HARDENED)
            .collect();
        assert_eq!(raw, vec![2645, 1195502025, 1148870696, 0, 0, 0]);

        assert_eq!(p.to_string(), PATH);
    }

    #[test]
    fn reject_bad_prefix() {
        assert_eq!(
            "m/44'/60'/0'/0/0".parse::<DerivationPath>(),
            Err(PathError::InvalidPrefix)
        );
        assert_eq!("2645'/0'".parse::<DerivationPath>(), Err(PathError::InvalidPrefix));
    }

    #[test]
    fn reject_bad_segments() {
        assert_eq!(
            "m/2645'/abc'/0'".parse::<DerivationPath>(),
            Err(PathError::InvalidSegment("abc'".to_string()))
        );

        // 2^31 collides with the hardening bit, plain or hardened
        assert_eq!(
            "m/2645'/2147483648/0".parse::<DerivationPath>(),
            Err(PathError::SegmentOutOfRange(2147483648))
        );
        assert_eq!(
            "m/2645'/2147483648'/0".parse::<DerivationPath>(),
            Err(PathError::SegmentOutOfRange(2147483648))
        );
    }
}
