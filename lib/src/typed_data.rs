// Copyright (c) 2022-2023 The MobileCoin Foundation

//! SNIP-12 typed data model and the off-device hashing seam
//!
//! Typed-message signing hashes the structured message off-device, then
//! runs the standard hash-signing flow with the digest. The hash itself is
//! domain-separated Pedersen/Poseidon work this client does not implement:
//! it is delegated to a [TypedDataHasher] collaborator and treated as an
//! opaque field element.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::apdu::felt::Felt;

/// One field of a typed-data struct definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    /// Field name
    pub name: String,
    /// Field type (`felt`, `felt*`, `string`, `selector`, `merkletree`, …)
    #[serde(rename = "type")]
    pub ty: String,
    /// Element type for `merkletree` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

/// A SNIP-12 typed message: struct definitions, the primary type, and the
/// domain separator plus message values as free-form JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
    /// Struct definitions by type name
    pub types: BTreeMap<String, Vec<TypeField>>,
    /// Name of the message's own type
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    /// Domain separator values
    pub domain: serde_json::Value,
    /// Message values
    pub message: serde_json::Value,
}

/// Off-device typed-data hashing collaborator.
///
/// Pure computation, no device interaction; the resulting digest feeds the
/// hash-signing flow unchanged.
pub trait TypedDataHasher {
    /// Hashing failure type
    type Error: core::fmt::Display;

    /// Compute the domain-separated message hash for `account`.
    fn message_hash(&self, message: &TypedData, account: &Felt) -> Result<[u8; 32], Self::Error>;
}
