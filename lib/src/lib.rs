// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Starknet Ledger API library (and CLI)
//!
//! High-level client for the Starknet app on Ledger devices: public key
//! derivation, hash signing, invoke and deploy-account transaction signing
//! (v1 and v3) and typed-message signing, driven as ordered APDU exchanges
//! over a pluggable [Exchange] transport.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use ledger_starknet::{transport::TcpTransport, StarknetApp};
//!
//! let transport = TcpTransport::connect(([127, 0, 0, 1], 9999).into()).await?;
//! let app = StarknetApp::new(transport);
//!
//! let key = app.public_key(&"m/2645'/1195502025'/1148870696'/0'/0'/0".parse()?, false).await?;
//! println!("public key: {}", hex::encode(key.0));
//! # Ok(())
//! # }
//! ```

/// Re-export `ledger-starknet-apdu` for consumers
pub use ledger_starknet_apdu::{self as apdu};

pub use apdu::felt::Felt;
pub use apdu::path::DerivationPath;
pub use apdu::Protocol;

pub mod transport;
pub use transport::Exchange;

mod error;
pub use error::Error;

mod app;
pub use app::StarknetApp;

pub mod typed_data;
pub use typed_data::{TypedData, TypedDataHasher};
