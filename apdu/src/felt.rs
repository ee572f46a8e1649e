// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Field element canonicalization
//!
//! Heterogeneous numeric inputs (decimal strings, `0x` hex strings, native
//! integers) are canonicalized to 32-byte big-endian words before hitting
//! the wire. Hashes get an additional padding step: the device consumes
//! 252-bit values as 64 hex digits with one reserved zero nibble, and the
//! position of that nibble changed between app revisions (see
//! [HashPadding]).

use core::fmt;

use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

use crate::FELT_LEN;

/// Maximum significant hex digits in a hash (252-bit field capacity)
pub const HASH_MAX_DIGITS: usize = 63;

/// Numeric canonicalization errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FeltError {
    /// Value does not fit the requested width
    #[error("value does not fit in {width} bytes")]
    ValueOutOfRange {
        /// Requested width in bytes
        width: usize,
    },

    /// String is neither a decimal nor a `0x` hex number
    #[error("invalid numeric string '{0}'")]
    InvalidNumber(String),

    /// Hash exceeds the field element capacity
    #[error("hash exceeds 63 significant hex digits")]
    HashTooLong,

    /// Short string too long or not ASCII
    #[error("short string '{0}' must be at most 31 ASCII characters")]
    InvalidShortString(String),
}

/// Recognise the `0x`-prefixed hex form, case-insensitive.
pub fn is_hex(s: &str) -> bool {
    match s.get(..2) {
        Some("0x") | Some("0X") => s[2..].bytes().all(|b| b.is_ascii_hexdigit()),
        _ => false,
    }
}

/// Canonicalize a value to exactly `width` big-endian bytes,
/// left-zero-padded.
pub fn to_fixed_bytes(value: &BigUint, width: usize) -> Result<Vec<u8>, FeltError> {
    let raw = value.to_bytes_be();
    if raw.len() > width {
        return Err(FeltError::ValueOutOfRange { width });
    }

    let mut out = vec![0u8; width];
    out[width - raw.len()..].copy_from_slice(&raw);
    Ok(out)
}

/// A Starknet field element in canonical 32-byte big-endian form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Felt([u8; FELT_LEN]);

impl Felt {
    /// The zero element
    pub const ZERO: Felt = Felt([0u8; FELT_LEN]);

    /// Wrap canonical big-endian bytes
    pub fn from_be_bytes(bytes: [u8; FELT_LEN]) -> Self {
        Self(bytes)
    }

    /// Canonical big-endian bytes
    pub fn to_be_bytes(&self) -> [u8; FELT_LEN] {
        self.0
    }

    /// Parse a decimal string
    pub fn from_dec_str(s: &str) -> Result<Self, FeltError> {
        let v = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| FeltError::InvalidNumber(s.to_string()))?;
        Self::from_biguint(&v)
    }

    /// Parse a hex string, with or without the `0x` prefix
    pub fn from_hex_str(s: &str) -> Result<Self, FeltError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        // An empty digit string ("0x") reads as zero, as the source forms do
        if digits.is_empty() {
            return Ok(Self::ZERO);
        }

        let v = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| FeltError::InvalidNumber(s.to_string()))?;
        Self::from_biguint(&v)
    }

    /// Parse either form: `0x…` is read base-16, anything else base-10.
    pub fn parse(s: &str) -> Result<Self, FeltError> {
        match is_hex(s) {
            true => Self::from_hex_str(s),
            false => Self::from_dec_str(s),
        }
    }

    fn from_biguint(v: &BigUint) -> Result<Self, FeltError> {
        let bytes = to_fixed_bytes(v, FELT_LEN)?;
        let mut out = [0u8; FELT_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl From<u64> for Felt {
    fn from(v: u64) -> Self {
        let mut out = [0u8; FELT_LEN];
        out[FELT_LEN - 8..].copy_from_slice(&v.to_be_bytes());
        Self(out)
    }
}

impl From<u128> for Felt {
    fn from(v: u128) -> Self {
        let mut out = [0u8; FELT_LEN];
        out[FELT_LEN - 16..].copy_from_slice(&v.to_be_bytes());
        Self(out)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = hex::encode(self.0);
        write!(f, "0x{}", digits.trim_start_matches('0'))?;
        if self.0 == [0u8; FELT_LEN] {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({self})")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Felt {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Felt {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Felt::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Reserved-nibble position for hash padding.
///
/// Current firmware reads 64-digit hashes with a leading zero nibble;
/// legacy revisions shifted the value up instead, reserving a trailing
/// zero nibble. A compatibility flag, selected by protocol revision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HashPadding {
    /// Reserved nibble leads: left-pad to 64 digits
    Leading,
    /// Reserved nibble trails: left-pad to 63 digits, append one zero
    Trailing,
}

/// Canonicalize a hex hash string to the 32-byte form the device consumes.
///
/// Strips the `0x` prefix and leading zero digits, rejects more than 63
/// significant digits, then places the reserved zero nibble per the
/// selected convention.
pub fn pad_hash(hash: &str, padding: HashPadding) -> Result<[u8; FELT_LEN], FeltError> {
    let digits = hash
        .strip_prefix("0x")
        .or_else(|| hash.strip_prefix("0X"))
        .unwrap_or(hash);
    let digits = digits.trim_start_matches('0');

    if digits.len() > HASH_MAX_DIGITS {
        return Err(FeltError::HashTooLong);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FeltError::InvalidNumber(hash.to_string()));
    }

    let padded = match padding {
        HashPadding::Leading => format!("{digits:0>64}"),
        HashPadding::Trailing => format!("{digits:0>63}0"),
    };

    let mut out = [0u8; FELT_LEN];
    hex::decode_to_slice(&padded, &mut out).map_err(|_| FeltError::InvalidNumber(hash.to_string()))?;
    Ok(out)
}

/// Encode a short ASCII string (at most 31 characters) as a field element.
///
/// Used for chain identifiers (`SN_MAIN`, `SN_SEPOLIA`).
pub fn short_string_to_felt(s: &str) -> Result<Felt, FeltError> {
    if s.len() > FELT_LEN - 1 || !s.is_ascii() {
        return Err(FeltError::InvalidShortString(s.to_string()));
    }

    let mut out = [0u8; FELT_LEN];
    out[FELT_LEN - s.len()..].copy_from_slice(s.as_bytes());
    Ok(Felt::from_be_bytes(out))
}

/// Derive an entrypoint selector from its human-readable name
/// (Keccak-256 masked to 250 bits).
pub fn selector_from_name(name: &str) -> Felt {
    let mut hash: [u8; 32] = Keccak256::digest(name.as_bytes()).into();
    hash[0] &= 0x03;
    Felt::from_be_bytes(hash)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_predicate() {
        assert!(is_hex("0x"));
        assert!(is_hex("0x1f2B"));
        assert!(is_hex("0X1F"));
        assert!(!is_hex("1f2b"));
        assert!(!is_hex("0xzz"));
        assert!(!is_hex("12345"));
    }

    #[test]
    fn fixed_width_round_trip() {
        let v = BigUint::parse_bytes(b"171699675780", 10).unwrap();

        let bytes = to_fixed_bytes(&v, 32).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(BigUint::from_bytes_be(&bytes), v);

        let bytes = to_fixed_bytes(&v, 8).unwrap();
        assert_eq!(hex::encode(bytes), "00000027fa192284");

        // 171699675780 needs 5 bytes
        assert_eq!(
            to_fixed_bytes(&v, 4),
            Err(FeltError::ValueOutOfRange { width: 4 })
        );
    }

    #[test]
    fn felt_parse_forms() {
        let hex_form = Felt::parse("0x27fa192284").unwrap();
        let dec_form = Felt::parse("171699675780").unwrap();
        assert_eq!(hex_form, dec_form);
        assert_eq!(
            hex::encode(hex_form.to_be_bytes()),
            "00000000000000000000000000000000000000000000000000000027fa192284"
        );

        assert_eq!(Felt::parse("0x").unwrap(), Felt::ZERO);
        assert_eq!(Felt::from(0x3adu64).to_string(), "0x3ad");
        assert_eq!(Felt::ZERO.to_string(), "0x0");

        assert!(matches!(
            Felt::parse("not-a-number"),
            Err(FeltError::InvalidNumber(_))
        ));
        // 33 bytes of ff
        let wide = format!("0x{}", "ff".repeat(33));
        assert!(matches!(
            Felt::parse(&wide),
            Err(FeltError::ValueOutOfRange { width: 32 })
        ));
    }

    #[test]
    fn pad_hash_leading() {
        // 63, 62 and 61 significant digits
        let h63 = pad_hash(
            "0x02bd1d3f8f45a011cbd0674ded291d58985761bbcbc04f4d01c8285d1b35c411",
            HashPadding::Leading,
        )
        .unwrap();
        assert_eq!(
            hex::encode(h63),
            "02bd1d3f8f45a011cbd0674ded291d58985761bbcbc04f4d01c8285d1b35c411"
        );

        let h62 = pad_hash(
            "0x002e672d748fbe3b6e833b61ea8b6e688850247022f06406a1eb83e345ffb417",
            HashPadding::Leading,
        )
        .unwrap();
        assert_eq!(
            hex::encode(h62),
            "002e672d748fbe3b6e833b61ea8b6e688850247022f06406a1eb83e345ffb417"
        );

        let h61 = pad_hash(
            "0x000936e8798681b391af0c57fe0bf5703b9631bea18b4bc84b3940ebab234744",
            HashPadding::Leading,
        )
        .unwrap();
        assert_eq!(
            hex::encode(h61),
            "000936e8798681b391af0c57fe0bf5703b9631bea18b4bc84b3940ebab234744"
        );
    }

    #[test]
    fn pad_hash_trailing() {
        let h = pad_hash(
            "0x2bd1d3f8f45a011cbd0674ded291d58985761bbcbc04f4d01c8285d1b35c411",
            HashPadding::Trailing,
        )
        .unwrap();
        assert_eq!(
            hex::encode(h),
            "2bd1d3f8f45a011cbd0674ded291d58985761bbcbc04f4d01c8285d1b35c4110"
        );
    }

    #[test]
    fn pad_hash_rejects_wide_values() {
        // 64 significant digits
        let wide = format!("0x1{}", "0".repeat(63));
        assert_eq!(pad_hash(&wide, HashPadding::Leading), Err(FeltError::HashTooLong));
        assert_eq!(pad_hash(&wide, HashPadding::Trailing), Err(FeltError::HashTooLong));

        // Leading zeros are not significant
        let narrow = format!("0x0{}", "1".repeat(63));
        assert!(pad_hash(&narrow, HashPadding::Leading).is_ok());
    }

    #[test]
    fn short_strings() {
        assert_eq!(
            short_string_to_felt("SN_MAIN").unwrap(),
            Felt::parse("0x534e5f4d41494e").unwrap()
        );
        assert!(short_string_to_felt(&"a".repeat(32)).is_err());
    }

    #[test]
    fn transfer_selector() {
        assert_eq!(
            selector_from_name("transfer").to_string(),
            "0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e"
        );
    }
}
