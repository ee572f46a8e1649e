// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Deploy-account transaction signing sequences (v1 and v3)

use crate::command::{ApduCommand, ApduError};
use crate::felt::Felt;
use crate::path::DerivationPath;
use crate::tx::{encode_da_modes, push_felt_list, put_felts, DataAvailabilityMode, ResourceBounds};
use crate::{Instruction, FELT_LEN};

/// v3 deploy-account transaction fields
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeployAccountFields {
    /// Address the account will deploy to
    pub contract_address: Felt,
    /// Declared account class
    pub class_hash: Felt,
    /// Deployment salt
    pub contract_address_salt: Felt,
    /// Constructor arguments (may be empty)
    #[cfg_attr(feature = "serde", serde(default))]
    pub constructor_calldata: Vec<Felt>,
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
}

impl DeployAccountFields {
    /// Deployment context block, six field elements: contract address,
    /// chain id, nonce, DA modes, class hash, salt.
    pub fn context_block(&self) -> Vec<u8> {
        let da = encode_da_modes(
            self.nonce_data_availability_mode,
            self.fee_data_availability_mode,
        );

        let mut out = Vec::with_capacity(6 * FELT_LEN);
        put_felts(
            &mut out,
            &[
                self.contract_address,
                self.chain_id,
                self.nonce,
                da,
                self.class_hash,
                self.contract_address_salt,
            ],
        );
        out
    }

    /// Fee block: tip, L1 gas bound, L2 gas bound.
    pub fn fee_block(&self) -> Vec<u8> {
        let (l1_gas, l2_gas) = self.resource_bounds.encode();

        let mut out = Vec::with_capacity(3 * FELT_LEN);
        put_felts(&mut out, &[self.tip, l1_gas, l2_gas]);
        out
    }
}

/// v1 deploy-account transaction fields
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeployAccountV1Fields {
    /// Address the account will deploy to
    pub contract_address: Felt,
    /// Declared account class
    pub class_hash: Felt,
    /// Deployment salt
    pub contract_address_salt: Felt,
    /// Constructor arguments (may be empty)
    #[cfg_attr(feature = "serde", serde(default))]
    pub constructor_calldata: Vec<Felt>,
    /// Maximum fee
    pub max_fee: Felt,
    /// Chain identifier (short string encoded)
    pub chain_id: Felt,
    /// Account nonce
    pub nonce: Felt,
}

impl DeployAccountV1Fields {
    /// Deployment context block, five field elements: contract address,
    /// class hash, salt, chain id, nonce.
    pub fn context_block(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 * FELT_LEN);
        put_felts(
            &mut out,
            &[
                self.contract_address,
                self.class_hash,
                self.contract_address_salt,
                self.chain_id,
                self.nonce,
            ],
        );
        out
    }
}

/// Version-tagged deploy-account fields
#[derive(Copy, Clone, Debug)]
pub enum DeployFields<'a> {
    /// v1 transaction (max-fee fee model)
    V1(&'a DeployAccountV1Fields),
    /// v3 transaction (fee market model)
    V3(&'a DeployAccountFields),
}

/// Build the complete envelope sequence for a deploy-account signing
/// operation.
///
/// The response to the final envelope carries the transaction hash and
/// signature.
pub fn deploy_account_apdus(
    path: &DerivationPath,
    fields: DeployFields<'_>,
) -> Result<Vec<ApduCommand>, ApduError> {
    match fields {
        DeployFields::V3(f) => deploy_v3_apdus(path, f),
        DeployFields::V1(f) => deploy_v1_apdus(path, f),
    }
}

fn deploy_v3_apdus(
    path: &DerivationPath,
    fields: &DeployAccountFields,
) -> Result<Vec<ApduCommand>, ApduError> {
    let ins = Instruction::DeployAccount;

    let mut apdus = vec![
        ApduCommand::new(ins, 0, 0, path.to_bytes())?,
        ApduCommand::new(ins, 1, 0, fields.context_block())?,
        ApduCommand::new(ins, 2, 0, fields.fee_block())?,
    ];

    push_felt_list(&mut apdus, ins, 3, &fields.paymaster_data)?;

    apdus.push(ApduCommand::new(
        ins,
        4,
        0,
        Felt::from(fields.constructor_calldata.len() as u64)
            .to_be_bytes()
            .to_vec(),
    )?);

    push_felt_list(&mut apdus, ins, 5, &fields.constructor_calldata)?;

    Ok(apdus)
}

fn deploy_v1_apdus(
    path: &DerivationPath,
    fields: &DeployAccountV1Fields,
) -> Result<Vec<ApduCommand>, ApduError> {
    let ins = Instruction::DeployAccountV1;

    let mut apdus = vec![
        ApduCommand::new(ins, 0, 0, path.to_bytes())?,
        ApduCommand::new(ins, 1, 0, fields.context_block())?,
        ApduCommand::new(ins, 2, 0, fields.max_fee.to_be_bytes().to_vec())?,
        ApduCommand::new(
            ins,
            3,
            0,
            Felt::from(fields.constructor_calldata.len() as u64)
                .to_be_bytes()
                .to_vec(),
        )?,
    ];

    push_felt_list(&mut apdus, ins, 4, &fields.constructor_calldata)?;

    Ok(apdus)
}
