// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Starknet Ledger app
//! (or the Speculos emulator) over TCP

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, LevelFilter};

use ledger_starknet::apdu::tx::{calldata_labels, Call, TxFields, TxV1Fields};
use ledger_starknet::{transport::TcpTransport, Protocol, StarknetApp};

/// Starknet Ledger command line utility
#[derive(Clone, Debug, Parser)]
struct Options {
    /// Emulator APDU socket address
    #[clap(long, default_value = "127.0.0.1:9999")]
    addr: SocketAddr,

    /// Talk the legacy app protocol
    #[clap(long)]
    legacy: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, Debug, Parser)]
enum Actions {
    /// Fetch app version
    AppVersion,

    /// Fetch the public key for a derivation path
    PubKey {
        /// Derivation path in EIP-2645 form
        #[clap(long)]
        path: String,

        /// Confirm the key on the device screen
        #[clap(long)]
        show: bool,
    },

    /// Fetch the Stark key for a derivation path
    StarkKey {
        /// Derivation path in EIP-2645 form
        #[clap(long)]
        path: String,

        /// Confirm the key on the device screen
        #[clap(long)]
        show: bool,
    },

    /// Sign a pre-computed hash
    SignHash {
        /// Derivation path in EIP-2645 form
        #[clap(long)]
        path: String,

        /// Hash to sign, hex encoded
        #[clap(long)]
        hash: String,

        /// Display the hash on the device before signing
        #[clap(long)]
        show: bool,
    },

    /// Sign a v3 invoke transaction
    SignTx {
        /// Derivation path in EIP-2645 form
        #[clap(long)]
        path: String,

        /// JSON file holding the call list
        #[clap(long)]
        calls: PathBuf,

        /// JSON file holding the transaction fields
        #[clap(long)]
        fields: PathBuf,
    },

    /// Sign a v1 invoke transaction
    SignTxV1 {
        /// Derivation path in EIP-2645 form
        #[clap(long)]
        path: String,

        /// JSON file holding the call list
        #[clap(long)]
        calls: PathBuf,

        /// JSON file holding the transaction fields
        #[clap(long)]
        fields: PathBuf,
    },
}

fn load_calls(file: &PathBuf) -> anyhow::Result<Vec<Call>> {
    let calls: Vec<Call> = serde_json::from_str(&fs::read_to_string(file)?)?;

    for call in &calls {
        debug!(
            "call to {} ({} args): {:?}",
            call.to,
            call.calldata.len(),
            calldata_labels(call, None)
        );
    }

    Ok(calls)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default()).unwrap();

    // Connect to the device / emulator
    debug!("connecting to {}", args.addr);
    let transport = TcpTransport::connect(args.addr).await?;

    let mut app = StarknetApp::new(transport);
    if args.legacy {
        app = app.with_protocol(Protocol::Legacy);
    }

    match args.cmd {
        Actions::AppVersion => {
            let version = app.app_version().await?;
            println!("app version: {version}");
        }
        Actions::PubKey { path, show } => {
            let key = app.public_key(&path.parse()?, show).await?;
            println!("public key: {}", hex::encode(key.0));
        }
        Actions::StarkKey { path, show } => {
            let key = app.stark_key(&path.parse()?, show).await?;
            println!("stark key: {}", hex::encode(key));
        }
        Actions::SignHash { path, hash, show } => {
            let sig = app.sign_hash(&path.parse()?, &hash, show).await?;
            println!("r: {}", hex::encode(sig.r));
            println!("s: {}", hex::encode(sig.s));
            println!("v: {}", sig.v);
        }
        Actions::SignTx { path, calls, fields } => {
            let calls = load_calls(&calls)?;
            let fields: TxFields = serde_json::from_str(&fs::read_to_string(fields)?)?;

            let tx = app.sign_tx(&path.parse()?, &calls, &fields).await?;
            println!("hash: {}", hex::encode(tx.hash));
            println!("r: {}", hex::encode(tx.signature.r));
            println!("s: {}", hex::encode(tx.signature.s));
            println!("v: {}", tx.signature.v);
        }
        Actions::SignTxV1 { path, calls, fields } => {
            let calls = load_calls(&calls)?;
            let fields: TxV1Fields = serde_json::from_str(&fs::read_to_string(fields)?)?;

            let tx = app.sign_tx_v1(&path.parse()?, &calls, &fields).await?;
            println!("hash: {}", hex::encode(tx.hash));
            println!("r: {}", hex::encode(tx.signature.r));
            println!("s: {}", hex::encode(tx.signature.s));
            println!("v: {}", tx.signature.v);
        }
    }

    Ok(())
}
