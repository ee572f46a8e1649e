// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transport abstraction and concrete transports
//!
//! The client needs exactly one capability from a transport: send a
//! command envelope, synchronously receive the raw response, fail on
//! timeout or disconnect. Anything implementing [Exchange] plugs in:
//! the Speculos TCP transport here, or the [replay] transport used by the
//! test suites.

use core::fmt::{Debug, Display};

use async_trait::async_trait;

use crate::apdu::command::{ApduAnswer, ApduCommand};

pub use replay::{RecordStore, ReplayError, ReplayTransport};

/// One request/response round trip with the device.
#[async_trait]
pub trait Exchange {
    /// Transport failure type (disconnect, timeout, framing fault)
    type Error: Display + Debug + Send;

    /// Send a command envelope and return the decoded response frame.
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, Self::Error>;
}

/// Transports exchange through shared references too, letting a caller
/// retain its handle (connection reuse, replay inspection in tests).
#[async_trait]
impl<T: Exchange + Sync> Exchange for &T {
    type Error = T::Error;

    async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, Self::Error> {
        (**self).exchange(command).await
    }
}

/// TCP transport for the Speculos emulator.
///
/// Framing: 4-byte big-endian length then the serialized APDU out; 4-byte
/// big-endian payload length, payload, and the 2-byte status word back.
#[cfg(feature = "transport_tcp")]
pub use tcp::TcpTransport;

#[cfg(feature = "transport_tcp")]
mod tcp {
    use std::io;
    use std::net::SocketAddr;

    use async_trait::async_trait;
    use log::trace;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Mutex;

    use crate::apdu::command::{ApduAnswer, ApduCommand};

    use super::Exchange;

    /// TCP (Speculos) transport
    pub struct TcpTransport {
        stream: Mutex<TcpStream>,
    }

    impl TcpTransport {
        /// Connect to an emulator APDU socket
        pub async fn connect(addr: SocketAddr) -> io::Result<Self> {
            let stream = TcpStream::connect(addr).await?;

            Ok(Self {
                stream: Mutex::new(stream),
            })
        }
    }

    #[async_trait]
    impl Exchange for TcpTransport {
        type Error = io::Error;

        async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, io::Error> {
            let mut stream = self.stream.lock().await;

            let req = command.serialize();
            trace!("> {}", hex::encode(&req));

            stream.write_all(&(req.len() as u32).to_be_bytes()).await?;
            stream.write_all(&req).await?;

            let mut len = [0u8; 4];
            stream.read_exact(&mut len).await?;

            // Length field covers the payload; the status word follows it
            let mut resp = vec![0u8; u32::from_be_bytes(len) as usize + 2];
            stream.read_exact(&mut resp).await?;

            trace!("< {}", hex::encode(&resp));

            ApduAnswer::from_bytes(&resp)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }
    }
}

/// Record/replay transport for tests.
///
/// A [RecordStore] holds an exchange log in the `"=> hex"` / `"<= hex"`
/// form; the [ReplayTransport] verifies each outgoing envelope against the
/// recording byte-for-byte and returns the recorded response.
pub mod replay {
    use std::collections::VecDeque;
    use std::str::FromStr;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::apdu::command::{ApduAnswer, ApduCommand};

    use super::Exchange;

    /// Replay transport failures
    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    pub enum ReplayError {
        /// Outgoing command differs from the recording
        #[error("unexpected command {actual} (recorded: {expected})")]
        Mismatch {
            /// Recorded request, hex
            expected: String,
            /// Actual request, hex
            actual: String,
        },

        /// Recording exhausted
        #[error("no recorded exchange remaining")]
        Exhausted,

        /// Record line does not parse
        #[error("malformed record line '{0}'")]
        Malformed(String),
    }

    /// A recorded exchange log
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct RecordStore {
        /// (request, response) pairs in exchange order
        pub exchanges: Vec<(Vec<u8>, Vec<u8>)>,
    }

    impl FromStr for RecordStore {
        type Err = ReplayError;

        /// Parse an exchange log: `=> <request hex>` lines each followed
        /// by a `<= <response hex>` line.
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let mut exchanges = Vec::new();
            let mut pending: Option<Vec<u8>> = None;

            for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let malformed = || ReplayError::Malformed(line.to_string());

                if let Some(h) = line.strip_prefix("=> ") {
                    if pending.is_some() {
                        return Err(malformed());
                    }
                    pending = Some(hex::decode(h).map_err(|_| malformed())?);
                } else if let Some(h) = line.strip_prefix("<= ") {
                    let req = pending.take().ok_or_else(malformed)?;
                    exchanges.push((req, hex::decode(h).map_err(|_| malformed())?));
                } else {
                    return Err(malformed());
                }
            }

            match pending {
                Some(_) => Err(ReplayError::Malformed("missing response".to_string())),
                None => Ok(Self { exchanges }),
            }
        }
    }

    /// Transport replaying a [RecordStore]
    pub struct ReplayTransport {
        queue: Mutex<VecDeque<(Vec<u8>, Vec<u8>)>>,
    }

    impl ReplayTransport {
        /// Create a replay transport over a recording
        pub fn new(store: RecordStore) -> Self {
            Self {
                queue: Mutex::new(store.exchanges.into()),
            }
        }

        /// Recorded exchanges not yet consumed
        pub fn remaining(&self) -> usize {
            self.queue.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Exchange for ReplayTransport {
        type Error = ReplayError;

        async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, ReplayError> {
            let (req, resp) = self
                .queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ReplayError::Exhausted)?;

            let actual = command.serialize();
            if actual != req {
                return Err(ReplayError::Mismatch {
                    expected: hex::encode(req),
                    actual: hex::encode(actual),
                });
            }

            ApduAnswer::from_bytes(&resp)
                .map_err(|_| ReplayError::Malformed(hex::encode(resp)))
        }
    }

}
