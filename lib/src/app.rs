// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Client handle for the Starknet app on a connected device
//!
//! [StarknetApp] drives each high-level operation as a strict linear
//! sequence of envelope exchanges over a generic [Exchange] transport:
//! advance only on a success status, abort on the first failure carrying
//! that step's mapped status, parse the final response payload. Earlier
//! steps mutate on-device signing state and cannot be rolled back, so
//! nothing is retried here; callers restart a failed operation from the
//! first step.

use std::time::Duration;

use log::debug;
use tokio::time::timeout;

use crate::apdu::chunk::PayloadType;
use crate::apdu::command::ApduCommand;
use crate::apdu::felt::{pad_hash, Felt};
use crate::apdu::path::DerivationPath;
use crate::apdu::response::{AppName, AppVersion, PublicKey, Signature, TxSignature};
use crate::apdu::status::StatusWord;
use crate::apdu::tx::{
    deploy_account_apdus, invoke_apdus, Call, DeployAccountFields, DeployAccountV1Fields,
    DeployFields, InvokeFields, TxFields, TxV1Fields,
};
use crate::apdu::{Instruction, LegacyInstruction, Protocol, FELT_LEN};
use crate::transport::Exchange;
use crate::typed_data::{TypedData, TypedDataHasher};
use crate::Error;

/// Handle for the Starknet app on a connected device.
///
/// Generic over [Exchange] to support different underlying transports. A
/// handle owns its transport for the duration of an operation: the device
/// is a single-threaded state machine, and interleaving operations from
/// multiple handles against one device is unsafe.
pub struct StarknetApp<T: Exchange> {
    /// Transport for envelope exchange
    transport: T,
    /// App protocol revision
    protocol: Protocol,
    /// Timeout for non-interactive exchanges
    request_timeout: Duration,
    /// Timeout for exchanges awaiting user interaction
    user_timeout: Duration,
}

impl<T: Exchange + Send + Sync> StarknetApp<T> {
    /// Create a handle over a transport, talking the current protocol
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            protocol: Protocol::Current,
            request_timeout: Duration::from_secs(2),
            user_timeout: Duration::from_secs(10),
        }
    }

    /// Select the app protocol revision
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the timeout for non-interactive exchanges
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the timeout for exchanges awaiting on-device user approval
    pub fn with_user_timeout(mut self, timeout: Duration) -> Self {
        self.user_timeout = timeout;
        self
    }

    /// Fetch the app version
    pub async fn app_version(&self) -> Result<AppVersion, Error<T::Error>> {
        debug!("requesting app version");

        let cmd = ApduCommand::new(Instruction::GetVersion, 0, 0, vec![])?;
        let data = self.request_ok(&cmd, self.request_timeout).await?;

        Ok(AppVersion::parse(&data)?)
    }

    /// Fetch the app name (legacy app revisions only; the current
    /// protocol reuses this instruction code for key requests)
    pub async fn app_name(&self) -> Result<AppName, Error<T::Error>> {
        debug!("requesting app name");

        let cmd = ApduCommand::new(LegacyInstruction::GetAppName, 0, 0, vec![])?;
        let data = self.request_ok(&cmd, self.request_timeout).await?;

        Ok(AppName::parse(&data)?)
    }

    /// Fetch the public key for a derivation path, optionally confirming
    /// it on the device screen first
    pub async fn public_key(
        &self,
        path: &DerivationPath,
        show: bool,
    ) -> Result<PublicKey, Error<T::Error>> {
        debug!("requesting public key for {path}");

        let ins: u8 = match self.protocol {
            Protocol::Current => Instruction::GetPubKey.into(),
            Protocol::Legacy => LegacyInstruction::GetPubKey.into(),
        };

        let cmd = ApduCommand::new(ins, show as u8, 0, path.to_bytes())?;
        let data = self.request_ok(&cmd, self.op_timeout(show)).await?;

        Ok(PublicKey::parse(&data)?)
    }

    /// Fetch the Stark key (x coordinate of the public key) for a
    /// derivation path
    pub async fn stark_key(
        &self,
        path: &DerivationPath,
        show: bool,
    ) -> Result<[u8; FELT_LEN], Error<T::Error>> {
        Ok(self.public_key(path, show).await?.stark_key())
    }

    /// Sign a pre-computed hash, supplied as a hex string.
    ///
    /// The hash is canonicalized per the selected protocol revision's
    /// padding convention before any exchange is issued.
    pub async fn sign_hash(
        &self,
        path: &DerivationPath,
        hash: &str,
        show: bool,
    ) -> Result<Signature, Error<T::Error>> {
        let felt = pad_hash(hash, self.protocol.hash_padding())?;

        debug!("signing hash {hash} with {path}");

        self.sign_felt(path, felt, show).await
    }

    /// Sign a SNIP-12 typed message: the hasher collaborator computes the
    /// domain-separated digest off-device, which then rides the standard
    /// hash-signing flow.
    pub async fn sign_message<H: TypedDataHasher>(
        &self,
        path: &DerivationPath,
        hasher: &H,
        message: &TypedData,
        account: &Felt,
    ) -> Result<Signature, Error<T::Error>> {
        let digest = hasher
            .message_hash(message, account)
            .map_err(|e| Error::Hasher(e.to_string()))?;

        debug!("signing message digest {} with {path}", hex::encode(digest));

        self.sign_felt(path, digest, false).await
    }

    /// Sign a v3 invoke transaction
    pub async fn sign_tx(
        &self,
        path: &DerivationPath,
        calls: &[Call],
        fields: &TxFields,
    ) -> Result<TxSignature, Error<T::Error>> {
        debug!("signing v3 invoke ({} calls) with {path}", calls.len());

        let apdus = invoke_apdus(path, calls, InvokeFields::V3(fields))?;
        let data = self.run_sequence(&apdus).await?;

        Ok(TxSignature::parse(&data)?)
    }

    /// Sign a v1 invoke transaction
    pub async fn sign_tx_v1(
        &self,
        path: &DerivationPath,
        calls: &[Call],
        fields: &TxV1Fields,
    ) -> Result<TxSignature, Error<T::Error>> {
        debug!("signing v1 invoke ({} calls) with {path}", calls.len());

        let apdus = invoke_apdus(path, calls, InvokeFields::V1(fields))?;
        let data = self.run_sequence(&apdus).await?;

        Ok(TxSignature::parse(&data)?)
    }

    /// Sign a v3 deploy-account transaction
    pub async fn sign_deploy_account(
        &self,
        path: &DerivationPath,
        fields: &DeployAccountFields,
    ) -> Result<TxSignature, Error<T::Error>> {
        debug!("signing v3 deploy-account with {path}");

        let apdus = deploy_account_apdus(path, DeployFields::V3(fields))?;
        let data = self.run_sequence(&apdus).await?;

        Ok(TxSignature::parse(&data)?)
    }

    /// Sign a v1 deploy-account transaction
    pub async fn sign_deploy_account_v1(
        &self,
        path: &DerivationPath,
        fields: &DeployAccountV1Fields,
    ) -> Result<TxSignature, Error<T::Error>> {
        debug!("signing v1 deploy-account with {path}");

        let apdus = deploy_account_apdus(path, DeployFields::V1(fields))?;
        let data = self.run_sequence(&apdus).await?;

        Ok(TxSignature::parse(&data)?)
    }

    /// Two-exchange hash signing: path, then the canonicalized hash.
    ///
    /// The current protocol indexes the steps through p1 with the show
    /// flag in p2; the legacy protocol tags chunk positions in p1 with
    /// the show flag in p2.
    async fn sign_felt(
        &self,
        path: &DerivationPath,
        felt: [u8; FELT_LEN],
        show: bool,
    ) -> Result<Signature, Error<T::Error>> {
        let steps: [(u8, u8); 2] = match self.protocol {
            Protocol::Current => [
                (Instruction::SignHash.into(), 0),
                (Instruction::SignHash.into(), 1),
            ],
            Protocol::Legacy => [
                (LegacyInstruction::Sign.into(), PayloadType::Init.into()),
                (LegacyInstruction::Sign.into(), PayloadType::Last.into()),
            ],
        };

        let init = ApduCommand::new(steps[0].0, steps[0].1, show as u8, path.to_bytes())?;
        self.request_ok(&init, self.request_timeout).await?;

        let last = ApduCommand::new(steps[1].0, steps[1].1, show as u8, felt.to_vec())?;
        let data = self.request_ok(&last, self.user_timeout).await?;

        Ok(Signature::parse(&data)?)
    }

    /// Drive a precomputed envelope sequence, fail-fast, returning the
    /// final response payload.
    ///
    /// Only the last exchange may block on user approval; everything
    /// before it runs under the request timeout.
    async fn run_sequence(&self, apdus: &[ApduCommand]) -> Result<Vec<u8>, Error<T::Error>> {
        let mut data = Vec::new();

        for (i, cmd) in apdus.iter().enumerate() {
            let t = match i + 1 == apdus.len() {
                true => self.user_timeout,
                false => self.request_timeout,
            };

            data = self.request_ok(cmd, t).await?;
        }

        Ok(data)
    }

    /// One exchange, mapping timeouts, transport failures and non-success
    /// status words into [Error].
    async fn request_ok(
        &self,
        command: &ApduCommand,
        t: Duration,
    ) -> Result<Vec<u8>, Error<T::Error>> {
        let answer = timeout(t, self.transport.exchange(command))
            .await?
            .map_err(Error::Transport)?;

        match answer.status() {
            Ok(StatusWord::Ok) => Ok(answer.data),
            Ok(status) => Err(Error::Status(status)),
            Err(code) => Err(Error::UnknownStatus(code)),
        }
    }

    fn op_timeout(&self, interactive: bool) -> Duration {
        match interactive {
            true => self.user_timeout,
            false => self.request_timeout,
        }
    }
}
