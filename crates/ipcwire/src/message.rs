// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message framing: fixed header and diagnostic trailer.
//!
//! ```text
//! offset  0: flags           u8
//! offset  2: message_id      u16
//! offset  8: destination_id  u64
//! offset 16: arguments ...   (aligned relative to offset 0)
//!            trailer ...
//! ```

use crate::codec::error::ParserError;
use crate::codec::node::{ParsedNode, Scalar};
use crate::codec::wire::{WireReader, WireWriter};
use serde_json::Value;

/// Size of the encoded header; arguments start here.
pub const HEADER_SIZE: usize = 16;

/// Header flag set on reply messages.
pub const REPLY_FLAG: u8 = 0x01;

/// Fixed fields appended after the arguments of every encoded message.
pub const TRAILER: [Scalar; 10] = [
    Scalar::U8(0xF0),
    Scalar::U16(0xF00D),
    Scalar::U32(0xFEED_FACE),
    Scalar::U64(0x0BAD_C0DE_DEAD_BEEF),
    Scalar::I8(-1),
    Scalar::I16(-2),
    Scalar::I32(-3),
    Scalar::I64(-4),
    Scalar::F32(1.5),
    Scalar::F64(-2.25),
];

/// Message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub flags: u8,
    pub message_id: u16,
    pub destination_id: u64,
}

impl MessageHeader {
    pub fn new(message_id: u16, destination_id: u64) -> Self {
        Self {
            flags: 0,
            message_id,
            destination_id,
        }
    }

    pub fn reply(message_id: u16, destination_id: u64) -> Self {
        Self {
            flags: REPLY_FLAG,
            message_id,
            destination_id,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.flags & REPLY_FLAG != 0
    }

    /// Write the header into an empty writer.
    pub fn write(&self, writer: &mut WireWriter) {
        debug_assert!(writer.is_empty(), "header must start the buffer");
        writer.write_u8(self.flags);
        writer.write_u16(self.message_id);
        writer.write_u64(self.destination_id);
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.flags;
        bytes[2..4].copy_from_slice(&self.message_id.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.destination_id.to_le_bytes());
        bytes
    }

    /// Read the header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ParserError> {
        let mut reader = WireReader::new(bytes);
        let flags = reader.read_u8()?;
        let message_id = reader.read_u16()?;
        let destination_id = reader.read_u64()?;
        Ok(Self {
            flags,
            message_id,
            destination_id,
        })
    }
}

/// Append the diagnostic trailer.
pub fn write_trailer(writer: &mut WireWriter) {
    for field in &TRAILER {
        writer.write_scalar(field);
    }
}

/// End offset of a trailer that starts at `offset`, if one does.
pub fn trailer_end(bytes: &[u8], offset: usize) -> Option<usize> {
    let mut reader = WireReader::at(bytes, offset);
    for field in &TRAILER {
        let matches = match field {
            Scalar::U8(v) => reader.read_u8().ok()? == *v,
            Scalar::I8(v) => reader.read_u8().ok()? == *v as u8,
            Scalar::U16(v) => reader.read_u16().ok()? == *v,
            Scalar::I16(v) => reader.read_u16().ok()? == *v as u16,
            Scalar::U32(v) => reader.read_u32().ok()? == *v,
            Scalar::I32(v) => reader.read_u32().ok()? == *v as u32,
            Scalar::U64(v) => reader.read_u64().ok()? == *v,
            Scalar::I64(v) => reader.read_u64().ok()? == *v as u64,
            Scalar::F32(v) => reader.read_u32().ok()? == v.to_bits(),
            Scalar::F64(v) => reader.read_u64().ok()? == v.to_bits(),
            _ => false,
        };
        if !matches {
            return None;
        }
    }
    Some(reader.offset())
}

/// Whether the diagnostic trailer sits at `offset`.
pub fn has_trailer(bytes: &[u8], offset: usize) -> bool {
    trailer_end(bytes, offset).is_some()
}

/// Result of decoding a framed message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub header: MessageHeader,
    /// Typed argument record.
    pub arguments: ParsedNode,
    /// `arguments` with type tags stripped.
    pub plain: Value,
    /// Offset just past the last argument.
    pub consumed: usize,
    /// Whether the diagnostic trailer followed the arguments.
    pub trailer: bool,
}
