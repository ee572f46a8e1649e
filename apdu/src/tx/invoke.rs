// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Invoke transaction signing sequences (v1 and v3)

use crate::command::{ApduCommand, ApduError};
use crate::felt::Felt;
use crate::path::DerivationPath;
use crate::tx::{
    encode_da_modes, push_call, push_felt_list, put_felts, Call, DataAvailabilityMode,
    ResourceBounds,
};
use crate::{Instruction, FELT_LEN};

/// v3 invoke transaction fields
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxFields {
    /// Sender account address
    pub account_address: Felt,
    /// Priority fee
    pub tip: Felt,
    /// Fee market bounds
    pub resource_bounds: ResourceBounds,
    /// Paymaster data (may be empty)
    #[cfg_attr(feature = "serde", serde(default))]
    pub paymaster_data: Vec<Felt>,
    /// Chain identifier (short string encoded)
    pub chain_id: Felt,
    /// Account nonce
    pub nonce: Felt,
    /// Nonce data availability mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub nonce_data_availability_mode: DataAvailabilityMode,
    /// Fee data availability mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub fee_data_availability_mode: DataAvailabilityMode,
    /// Account deployment data (may be empty)
    #[cfg_attr(feature = "serde", serde(default))]
    pub account_deployment_data: Vec<Felt>,
}

impl TxFields {
    /// Fixed field block, seven field elements: account address, tip,
    /// L1 gas bound, L2 gas bound, chain id, nonce, DA modes.
    pub fn encode(&self) -> Vec<u8> {
        let (l1_gas, l2_gas) = self.resource_bounds.encode();
        let da = encode_da_modes(
            self.nonce_data_availability_mode,
            self.fee_data_availability_mode,
        );

        let mut out = Vec::with_capacity(7 * FELT_LEN);
        put_felts(
            &mut out,
            &[
                self.account_address,
                self.tip,
                l1_gas,
                l2_gas,
                self.chain_id,
                self.nonce,
                da,
            ],
        );
        out
    }
}

/// v1 invoke transaction fields
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxV1Fields {
    /// Sender account address
    pub account_address: Felt,
    /// Maximum fee
    pub max_fee: Felt,
    /// Chain identifier (short string encoded)
    pub chain_id: Felt,
    /// Account nonce
    pub nonce: Felt,
}

impl TxV1Fields {
    /// Fixed field block: account address, max fee, chain id, nonce.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 * FELT_LEN);
        put_felts(
            &mut out,
            &[self.account_address, self.max_fee, self.chain_id, self.nonce],
        );
        out
    }
}

/// Version-tagged invoke fields; the v1 and v3 wire layouts are genuinely
/// different and each selects its own instruction and step sequence.
#[derive(Copy, Clone, Debug)]
pub enum InvokeFields<'a> {
    /// v1 transaction (max-fee fee model)
    V1(&'a TxV1Fields),
    /// v3 transaction (fee market model)
    V3(&'a TxFields),
}

/// Build the complete envelope sequence for an invoke signing operation.
///
/// The response to the final envelope carries the transaction hash and
/// signature.
pub fn invoke_apdus(
    path: &DerivationPath,
    calls: &[Call],
    fields: InvokeFields<'_>,
) -> Result<Vec<ApduCommand>, ApduError> {
    match fields {
        InvokeFields::V3(f) => invoke_v3_apdus(path, calls, f),
        InvokeFields::V1(f) => invoke_v1_apdus(path, calls, f),
    }
}

fn invoke_v3_apdus(
    path: &DerivationPath,
    calls: &[Call],
    fields: &TxFields,
) -> Result<Vec<ApduCommand>, ApduError> {
    let ins = Instruction::SignTx;

    let mut apdus = vec![
        ApduCommand::new(ins, 0, 0, path.to_bytes())?,
        ApduCommand::new(ins, 1, 0, fields.encode())?,
    ];

    push_felt_list(&mut apdus, ins, 2, &fields.paymaster_data)?;
    push_felt_list(&mut apdus, ins, 3, &fields.account_deployment_data)?;

    apdus.push(ApduCommand::new(
        ins,
        4,
        0,
        Felt::from(calls.len() as u64).to_be_bytes().to_vec(),
    )?);

    for call in calls {
        push_call(&mut apdus, ins, 5, call)?;
    }

    Ok(apdus)
}

fn invoke_v1_apdus(
    path: &DerivationPath,
    calls: &[Call],
    fields: &TxV1Fields,
) -> Result<Vec<ApduCommand>, ApduError> {
    let ins = Instruction::SignTxV1;

    let mut apdus = vec![
        ApduCommand::new(ins, 0, 0, path.to_bytes())?,
        ApduCommand::new(ins, 1, 0, fields.encode())?,
        ApduCommand::new(
            ins,
            2,
            0,
            Felt::from(calls.len() as u64).to_be_bytes().to_vec(),
        )?,
    ];

    for call in calls {
        push_call(&mut apdus, ins, 3, call)?;
    }

    Ok(apdus)
}
