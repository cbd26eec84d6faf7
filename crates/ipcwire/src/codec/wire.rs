// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level writer and reader.
//!
//! Multi-byte primitives are aligned to their own width relative to the
//! start of the buffer; single bytes are never padded. All values are
//! little-endian.

use crate::codec::error::ParserError;
use crate::codec::node::{NodeValue, Scalar, SerializedNode};

/// Length sentinel of a null string.
pub const NULL_STRING_LENGTH: u32 = u32::MAX;

/// Append-only encoder for serialized nodes.
#[derive(Debug, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Pad with zeros up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.buffer.len() % alignment)) % alignment;
        self.buffer.resize(self.buffer.len() + padding, 0);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buffer.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.align(2);
        self.buffer.extend(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.align(4);
        self.buffer.extend(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.align(8);
        self.buffer.extend(&v.to_le_bytes());
    }

    /// Write one scalar with its alignment.
    pub fn write_scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::Bool(v) => self.write_u8(u8::from(*v)),
            Scalar::I8(v) => self.write_u8(*v as u8),
            Scalar::U8(v) => self.write_u8(*v),
            Scalar::I16(v) => self.write_u16(*v as u16),
            Scalar::U16(v) => self.write_u16(*v),
            Scalar::I32(v) => self.write_u32(*v as u32),
            Scalar::U32(v) | Scalar::Handle(v) => self.write_u32(*v),
            Scalar::I64(v) => self.write_u64(*v as u64),
            Scalar::U64(v) => self.write_u64(*v),
            Scalar::F32(v) => self.write_u32(v.to_bits()),
            Scalar::F64(v) => self.write_u64(v.to_bits()),
            Scalar::String(s) => self.write_string(s.as_deref()),
        }
    }

    /// Length, 8-bit flag, then Latin-1 bytes or UTF-16 code units.
    ///
    /// Strings whose characters all fit in one byte use the 8-bit form.
    /// The serializer has already checked that the length fits in `u32`.
    fn write_string(&mut self, s: Option<&str>) {
        let Some(s) = s else {
            self.write_u32(NULL_STRING_LENGTH);
            return;
        };

        if s.chars().all(|c| u32::from(c) <= 0xFF) {
            self.write_u32(s.chars().count() as u32);
            self.write_u8(1);
            self.buffer.extend(s.chars().map(|c| u32::from(c) as u8));
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            self.write_u32(units.len() as u32);
            self.write_u8(0);
            self.align(2);
            for unit in units {
                self.buffer.extend(&unit.to_le_bytes());
            }
        }
    }

    /// Write a node tree.
    pub fn write_node(&mut self, node: &SerializedNode) {
        match &node.value {
            NodeValue::Leaf(scalar) => self.write_scalar(scalar),
            NodeValue::Vector(elements) => {
                self.write_u64(elements.len() as u64);
                for element in elements {
                    self.write_node(element);
                }
            }
            NodeValue::Composite(children) => {
                for child in children {
                    self.write_node(child);
                }
            }
            NodeValue::Empty => {}
        }
    }
}

/// Encode a list of nodes into a fresh buffer.
pub fn emit(nodes: &[SerializedNode]) -> Vec<u8> {
    let mut writer = WireWriter::new();
    for node in nodes {
        writer.write_node(node);
    }
    writer.into_bytes()
}

/// Bounds-checked cursor over a received buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Start reading at `offset` (e.g. past a message header).
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Advance to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) -> Result<(), ParserError> {
        let aligned = self
            .offset
            .checked_next_multiple_of(alignment)
            .ok_or(ParserError::OutOfBounds {
                offset: self.offset,
                need: alignment,
                len: self.buffer.len(),
            })?;
        self.offset = aligned;
        Ok(())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ParserError> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(ParserError::OutOfBounds {
                offset: self.offset,
                need: count,
                len: self.buffer.len(),
            })?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParserError> {
        self.align(N)?;
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParserError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.read_array::<8>().map(u64::from_le_bytes)
    }

    /// Read a string; `None` for the null string.
    pub fn read_string(&mut self) -> Result<Option<String>, ParserError> {
        let length = self.read_u32()?;
        if length == NULL_STRING_LENGTH {
            return Ok(None);
        }
        let length = length as usize;

        match self.read_u8()? {
            1 => {
                let bytes = self.read_bytes(length)?;
                Ok(Some(bytes.iter().map(|b| char::from(*b)).collect()))
            }
            0 => {
                self.align(2)?;
                let byte_len = length.checked_mul(2).ok_or(ParserError::OutOfBounds {
                    offset: self.offset,
                    need: usize::MAX,
                    len: self.buffer.len(),
                })?;
                let bytes = self.read_bytes(byte_len)?;
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units)
                    .map(Some)
                    .map_err(|_| ParserError::InvalidUtf16)
            }
            other => Err(ParserError::InvalidFlag {
                what: "string encoding",
                value: other,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_padding() {
        let mut writer = WireWriter::new();
        writer.write_u8(0xAA);
        writer.write_u16(0x0102);
        writer.write_u8(0xBB);
        writer.write_u32(0x03040506);
        writer.write_u64(7);
        assert_eq!(
            writer.as_bytes(),
            &[
                0xAA, 0x00, 0x02, 0x01, // u8, pad, u16
                0xBB, 0x00, 0x00, 0x00, // u8, pad to 4
                0x06, 0x05, 0x04, 0x03, // u32
                0x00, 0x00, 0x00, 0x00, // pad to 16
                0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]
        );

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_u8().unwrap(), 0xAA);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.offset() % 2, 0);
        assert_eq!(reader.read_u8().unwrap(), 0xBB);
        assert_eq!(reader.read_u32().unwrap(), 0x03040506);
        assert_eq!(reader.read_u64().unwrap(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_narrow_string_layout() {
        let mut writer = WireWriter::new();
        writer.write_scalar(&Scalar::String(Some("hé".into())));
        assert_eq!(writer.as_bytes(), &[2, 0, 0, 0, 1, b'h', 0xE9]);

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap().as_deref(), Some("hé"));
    }

    #[test]
    fn test_wide_string_layout() {
        let mut writer = WireWriter::new();
        writer.write_scalar(&Scalar::String(Some("a€".into())));
        assert_eq!(
            writer.as_bytes(),
            &[2, 0, 0, 0, 0, 0, b'a', 0, 0xAC, 0x20]
        );

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap().as_deref(), Some("a€"));
    }

    #[test]
    fn test_null_string() {
        let mut writer = WireWriter::new();
        writer.write_scalar(&Scalar::String(None));
        assert_eq!(writer.as_bytes(), &[0xFF; 4]);

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), None);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let bytes = [1u8, 2, 3];
        let mut reader = WireReader::new(&bytes);
        assert!(matches!(
            reader.read_u32(),
            Err(ParserError::OutOfBounds {
                offset: 0,
                need: 4,
                len: 3
            })
        ));
    }

    #[test]
    fn test_huge_string_length_is_bounded() {
        let bytes = [0xFE, 0xFF, 0xFF, 0xFF, 0];
        let mut reader = WireReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(ParserError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_vector_node_count_prefix() {
        let node = SerializedNode::vector(
            "Vector<uint8_t>",
            vec![
                SerializedNode::leaf(Scalar::U8(1)),
                SerializedNode::leaf(Scalar::U8(2)),
            ],
        );
        assert_eq!(emit(&[node]), vec![2, 0, 0, 0, 0, 0, 0, 0, 1, 2]);
    }
}
