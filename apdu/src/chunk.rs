// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Payload chunking for multi-exchange transfers

/// Legacy chunk position tags, carried in `p1`.
///
/// Current app revisions use per-step parameter indices instead; these tags
/// survive for the legacy single-instruction signing flow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadType {
    /// First chunk of an operation
    Init = 0x00,
    /// Intermediate chunk
    Add = 0x01,
    /// Final chunk
    Last = 0x02,
}

impl From<PayloadType> for u8 {
    fn from(p: PayloadType) -> u8 {
        p as u8
    }
}

/// Split `data` into transport-sized chunks.
///
/// Always yields at least one chunk, so an empty payload still produces an
/// exchange and every multi-step flow ends on a response-bearing exchange
/// even when its trailing list is empty.
pub fn chunks(data: &[u8], max_len: usize) -> Vec<&[u8]> {
    if data.is_empty() {
        return vec![data];
    }

    data.chunks(max_len).collect()
}
