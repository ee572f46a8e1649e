// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction field blocks and per-operation APDU sequences
//!
//! Signing a transaction is a strict linear sequence of envelope
//! exchanges. The builders here produce the complete ordered sequence for
//! an operation up front (derivation path, fixed field blocks, then
//! chunked variable-length data with first/continuation/end tags), so the
//! whole wire interaction can be asserted against recorded exchanges
//! without a transport in the loop.

use crate::chunk::chunks;
use crate::command::{ApduCommand, ApduError};
use crate::felt::{selector_from_name, Felt};
use crate::{Instruction, FELTS_PER_CHUNK, FELT_LEN};

mod deploy;
mod invoke;

pub use deploy::{deploy_account_apdus, DeployAccountFields, DeployAccountV1Fields, DeployFields};
pub use invoke::{invoke_apdus, InvokeFields, TxFields, TxV1Fields};

/// First chunk of a call's data
pub const P2_CALL_FIRST: u8 = 0x00;
/// Continuation chunk of a call's data
pub const P2_CALL_CONTINUE: u8 = 0x01;
/// Empty end-of-call marker
pub const P2_CALL_END: u8 = 0x02;

/// A single contract call within an invoke transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Call {
    /// Target contract address
    pub to: Felt,
    /// Entrypoint selector
    pub selector: Felt,
    /// Call arguments
    #[cfg_attr(feature = "serde", serde(default))]
    pub calldata: Vec<Felt>,
}

impl Call {
    /// Build a call to a named entrypoint, deriving the selector from the
    /// entrypoint name.
    pub fn new(to: Felt, entrypoint: &str) -> Self {
        Self {
            to,
            selector: selector_from_name(entrypoint),
            calldata: Vec::new(),
        }
    }

    /// Attach call arguments
    pub fn with_calldata(mut self, calldata: Vec<Felt>) -> Self {
        self.calldata = calldata;
        self
    }

    /// Wire form: target, selector, then arguments, 32 bytes each
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((2 + self.calldata.len()) * FELT_LEN);
        out.extend_from_slice(&self.to.to_be_bytes());
        out.extend_from_slice(&self.selector.to_be_bytes());
        put_felts(&mut out, &self.calldata);
        out
    }
}

/// Data availability mode for v3 fee market fields
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataAvailabilityMode {
    /// Layer 1 data availability
    #[default]
    L1 = 0,
    /// Layer 2 data availability
    L2 = 1,
}

/// Pack the nonce and fee DA modes into one field element:
/// `nonce_mode << 32 | fee_mode`.
pub fn encode_da_modes(nonce_mode: DataAvailabilityMode, fee_mode: DataAvailabilityMode) -> Felt {
    Felt::from(((nonce_mode as u64) << 32) | fee_mode as u64)
}

/// Fee bound for a single resource
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceBound {
    /// Maximum resource amount
    pub max_amount: u64,
    /// Maximum price per resource unit
    pub max_price_per_unit: u128,
}

/// v3 fee market bounds per resource type
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceBounds {
    /// L1 gas bound
    pub l1_gas: ResourceBound,
    /// L2 gas bound
    pub l2_gas: ResourceBound,
}

impl ResourceBounds {
    /// Pack both bounds, one field element per resource:
    /// `name << 192 | max_amount << 128 | max_price_per_unit`.
    pub fn encode(&self) -> (Felt, Felt) {
        (
            encode_resource_bound(b"L1_GAS", &self.l1_gas),
            encode_resource_bound(b"L2_GAS", &self.l2_gas),
        )
    }
}

fn encode_resource_bound(tag: &[u8], bound: &ResourceBound) -> Felt {
    let mut out = [0u8; FELT_LEN];

    out[8 - tag.len()..8].copy_from_slice(tag);
    out[8..16].copy_from_slice(&bound.max_amount.to_be_bytes());
    out[16..32].copy_from_slice(&bound.max_price_per_unit.to_be_bytes());

    Felt::from_be_bytes(out)
}

/// Display labels for a call's arguments.
///
/// ABI-driven annotation is not implemented by the app; an annotator may
/// override individual labels for host-side display, and the default is
/// the positional form the device itself shows. Labels never reach the
/// wire in the current protocol.
pub fn calldata_labels(
    call: &Call,
    annotator: Option<&dyn Fn(usize, &Felt) -> Option<String>>,
) -> Vec<String> {
    call.calldata
        .iter()
        .enumerate()
        .map(|(i, felt)| {
            annotator
                .and_then(|a| a(i, felt))
                .unwrap_or_else(|| format!("Calldata #{i}:"))
        })
        .collect()
}

/// Append felts to a byte block, 32 bytes each
pub(crate) fn put_felts(out: &mut Vec<u8>, felts: &[Felt]) {
    for felt in felts {
        out.extend_from_slice(&felt.to_be_bytes());
    }
}

/// Append a felt list as chunked exchanges under one step index.
///
/// An empty list still produces one (empty) exchange, so the device always
/// sees the step.
pub(crate) fn push_felt_list(
    apdus: &mut Vec<ApduCommand>,
    ins: Instruction,
    p1: u8,
    felts: &[Felt],
) -> Result<(), ApduError> {
    let mut data = Vec::with_capacity(felts.len() * FELT_LEN);
    put_felts(&mut data, felts);

    for chunk in chunks(&data, FELTS_PER_CHUNK * FELT_LEN) {
        apdus.push(ApduCommand::new(ins, p1, 0, chunk.to_vec())?);
    }

    Ok(())
}

/// Append one call as chunked exchanges plus the end-of-call marker.
pub(crate) fn push_call(
    apdus: &mut Vec<ApduCommand>,
    ins: Instruction,
    p1: u8,
    call: &Call,
) -> Result<(), ApduError> {
    let data = call.encode();

    for (i, chunk) in chunks(&data, FELTS_PER_CHUNK * FELT_LEN).iter().enumerate() {
        let p2 = match i {
            0 => P2_CALL_FIRST,
            _ => P2_CALL_CONTINUE,
        };
        apdus.push(ApduCommand::new(ins, p1, p2, chunk.to_vec())?);
    }

    apdus.push(ApduCommand::new(ins, p1, P2_CALL_END, vec![])?);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resource_bound_packing() {
        let bounds = ResourceBounds {
            l1_gas: ResourceBound {
                max_amount: 0x3ad,
                max_price_per_unit: 0x5cff80d86108b,
            },
            l2_gas: ResourceBound::default(),
        };

        let (l1, l2) = bounds.encode();
        assert_eq!(
            hex::encode(l1.to_be_bytes()),
            "00004c315f47415300000000000003ad00000000000000000005cff80d86108b"
        );
        assert_eq!(
            hex::encode(l2.to_be_bytes()),
            "00004c325f474153000000000000000000000000000000000000000000000000"
        );

        // Tag occupies the top 8 bytes, shifted to bit 192
        assert_eq!(&l1.to_be_bytes()[..8], b"\x00\x00L1_GAS");
    }

    #[test]
    fn da_mode_packing() {
        use DataAvailabilityMode::*;

        assert_eq!(encode_da_modes(L1, L1), Felt::ZERO);
        assert_eq!(encode_da_modes(L1, L2), Felt::from(1u64));
        assert_eq!(encode_da_modes(L2, L1), Felt::from(1u64 << 32));
    }

    #[test]
    fn call_encoding() {
        let call = Call::new(
            Felt::parse("0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7")
                .unwrap(),
            "transfer",
        )
        .with_calldata(vec![
            Felt::parse("0x07e00d496e324876bbc8531f2d9a82bf154d1a04a50218ee74cdd372f75a551a")
                .unwrap(),
            Felt::from(1000u64),
        ]);

        let encoded = call.encode();
        assert_eq!(encoded.len(), 4 * FELT_LEN);
        assert_eq!(
            hex::encode(&encoded),
            "049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc70083afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e07e00d496e324876bbc8531f2d9a82bf154d1a04a50218ee74cdd372f75a551a00000000000000000000000000000000000000000000000000000000000003e8"
        );
    }

    #[test]
    fn default_calldata_labels() {
        let call = Call::new(Felt::from(1u64), "transfer")
            .with_calldata(vec![Felt::from(2u64), Felt::from(3u64)]);

        assert_eq!(
            calldata_labels(&call, None),
            vec!["Calldata #0:", "Calldata #1:"]
        );

        let annotate = |i: usize, _: &Felt| match i {
            0 => Some("recipient".to_string()),
            _ => None,
        };
        assert_eq!(
            calldata_labels(&call, Some(&annotate)),
            vec!["recipient", "Calldata #1:"]
        );
    }
}
