// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-directed encoder and decoder.
//!
//! A [`Codec`] borrows a [`Catalog`] and carries a [`CodecConfig`]. It owns
//! no buffers between calls, so one codec can serve any number of threads.
//!
//! # Example
//!
//! ```
//! use ipcwire::{ArgumentDescriptor, Catalog, Codec};
//! use serde_json::json;
//!
//! let catalog = Catalog::builder()
//!     .message(
//!         "WebPage_SetZoom",
//!         7,
//!         vec![ArgumentDescriptor::new("factor", "double")],
//!     )
//!     .build()
//!     .unwrap();
//! let codec = Codec::new(&catalog);
//!
//! let bytes = codec
//!     .encode_message("WebPage_SetZoom", 1, &json!({ "factor": 1.25 }))
//!     .unwrap();
//! let decoded = codec.decode_message("WebPage_SetZoom", &bytes).unwrap();
//! assert_eq!(decoded.plain, json!({ "factor": 1.25 }));
//! assert!(decoded.trailer);
//! ```

pub mod error;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod untype;
pub mod wire;

pub use error::{ParserError, SerializationError};
pub use node::{NodeValue, ParsedNode, ParsedValue, Scalar, SerializedNode, TypeCategory};
pub use parser::Parser;
pub use serializer::Serializer;
pub use untype::untype;
pub use wire::{emit, WireReader, WireWriter};

use crate::catalog::{ArgumentDescriptor, Catalog, MessageSchema};
use crate::config::CodecConfig;
use crate::message::{trailer_end, write_trailer, DecodedMessage, MessageHeader, HEADER_SIZE};
use serde_json::Value;

/// Encoder/decoder bound to one catalog.
#[derive(Debug, Clone)]
pub struct Codec<'c> {
    catalog: &'c Catalog,
    config: CodecConfig,
}

impl<'c> Codec<'c> {
    /// Create a codec with the default configuration.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_config(catalog, CodecConfig::default())
    }

    pub fn with_config(catalog: &'c Catalog, config: CodecConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn serializer(&self) -> Serializer<'c> {
        Serializer::new(self.catalog, self.config.max_depth)
    }

    fn parser(&self) -> Parser<'c> {
        Parser::new(self.catalog, self.config.max_depth)
            .with_max_elements(self.config.max_elements)
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    /// Serialize a record of argument values into wire nodes.
    pub fn serialize_arguments(
        &self,
        descriptors: &[ArgumentDescriptor],
        values: &Value,
    ) -> Result<Vec<SerializedNode>, SerializationError> {
        let record = values
            .as_object()
            .ok_or_else(|| SerializationError::TypeMismatch {
                expected: "record",
                found: values.to_string(),
            })?;
        self.serializer().serialize_arguments(descriptors, record)
    }

    /// Serialize and emit an argument list on its own.
    ///
    /// The result is laid out as if it started at an 8-aligned offset,
    /// which is where arguments sit in a framed message.
    pub fn encode_arguments(
        &self,
        descriptors: &[ArgumentDescriptor],
        values: &Value,
    ) -> Result<Vec<u8>, SerializationError> {
        let nodes = self.serialize_arguments(descriptors, values)?;
        Ok(emit(&nodes))
    }

    /// Parse an argument list starting at `offset`.
    ///
    /// Returns the typed record and the offset just past the last argument.
    pub fn parse_arguments(
        &self,
        bytes: &[u8],
        offset: usize,
        descriptors: &[ArgumentDescriptor],
    ) -> Result<(ParsedNode, usize), ParserError> {
        let mut reader = WireReader::at(bytes, offset);
        let record = self.parser().parse_arguments(&mut reader, descriptors)?;
        Ok((record, reader.offset()))
    }

    /// Parse an argument list and strip type tags.
    pub fn decode_arguments(
        &self,
        bytes: &[u8],
        offset: usize,
        descriptors: &[ArgumentDescriptor],
    ) -> Result<(Value, usize), ParserError> {
        let (record, end) = self.parse_arguments(bytes, offset, descriptors)?;
        Ok((untype(&record), end))
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Encode a message: header, arguments, then the trailer if configured.
    pub fn encode_message(
        &self,
        name: &str,
        destination_id: u64,
        values: &Value,
    ) -> Result<Vec<u8>, SerializationError> {
        let schema = self
            .catalog
            .message(name)
            .ok_or_else(|| SerializationError::UnknownMessage(name.to_string()))?;
        let header = MessageHeader::new(schema.id, destination_id);
        self.encode_framed(name, header, &schema.arguments, values)
    }

    /// Encode the reply of a message.
    pub fn encode_reply(
        &self,
        name: &str,
        destination_id: u64,
        values: &Value,
    ) -> Result<Vec<u8>, SerializationError> {
        let schema = self
            .catalog
            .message(name)
            .ok_or_else(|| SerializationError::UnknownMessage(name.to_string()))?;
        let arguments = schema
            .reply_arguments
            .as_deref()
            .ok_or_else(|| SerializationError::NoReply(name.to_string()))?;
        let header = MessageHeader::reply(schema.id, destination_id);
        self.encode_framed(name, header, arguments, values)
    }

    fn encode_framed(
        &self,
        name: &str,
        header: MessageHeader,
        descriptors: &[ArgumentDescriptor],
        values: &Value,
    ) -> Result<Vec<u8>, SerializationError> {
        let nodes = self.serialize_arguments(descriptors, values)?;

        let mut writer = WireWriter::with_capacity(HEADER_SIZE + 64);
        header.write(&mut writer);
        for node in &nodes {
            writer.write_node(node);
        }
        if self.config.append_trailer {
            write_trailer(&mut writer);
        }

        log::debug!(
            "[codec] encoded '{}' (id={}, reply={}): {} bytes",
            name,
            header.message_id,
            header.is_reply(),
            writer.len()
        );
        Ok(writer.into_bytes())
    }

    /// Decode a message, checking that its header names `name`.
    pub fn decode_message(&self, name: &str, bytes: &[u8]) -> Result<DecodedMessage, ParserError> {
        let schema = self.schema(name)?;
        self.decode_framed(name, schema, &schema.arguments, bytes)
    }

    /// Decode the reply of a message.
    pub fn decode_reply(&self, name: &str, bytes: &[u8]) -> Result<DecodedMessage, ParserError> {
        let schema = self.schema(name)?;
        let arguments = schema
            .reply_arguments
            .as_deref()
            .ok_or_else(|| ParserError::NoReply(name.to_string()))?;
        self.decode_framed(name, schema, arguments, bytes)
    }

    fn schema(&self, name: &str) -> Result<&'c MessageSchema, ParserError> {
        self.catalog
            .message(name)
            .ok_or_else(|| ParserError::UnknownMessage(name.to_string()))
    }

    fn decode_framed(
        &self,
        name: &str,
        schema: &MessageSchema,
        descriptors: &[ArgumentDescriptor],
        bytes: &[u8],
    ) -> Result<DecodedMessage, ParserError> {
        let header = MessageHeader::decode(bytes)?;
        if header.message_id != schema.id {
            return Err(ParserError::MessageMismatch {
                name: name.to_string(),
                expected: schema.id,
                found: header.message_id,
            });
        }

        let (arguments, consumed) = self.parse_arguments(bytes, HEADER_SIZE, descriptors)?;

        let trailer = trailer_end(bytes, consumed) == Some(bytes.len());
        let leftover = bytes.len() - consumed;
        if leftover > 0 && !trailer {
            if self.config.reject_trailing_bytes {
                return Err(ParserError::TrailingBytes(leftover));
            }
            log::warn!(
                "[codec] '{}': {} unexpected byte(s) after arguments",
                name,
                leftover
            );
        }

        log::debug!(
            "[codec] decoded '{}' (id={}): {} of {} bytes, trailer={}",
            name,
            header.message_id,
            consumed,
            bytes.len(),
            trailer
        );

        Ok(DecodedMessage {
            header,
            plain: untype(&arguments),
            arguments,
            consumed,
            trailer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::builder()
            .message_with_reply(
                "WebPage_Ping",
                3,
                vec![ArgumentDescriptor::new("sequence", "uint32_t")],
                vec![ArgumentDescriptor::new("ok", "bool")],
            )
            .message("WebPage_Close", 4, vec![])
            .build()
            .unwrap()
    }

    #[test]
    fn test_message_layout() {
        let catalog = catalog();
        let codec = Codec::with_config(&catalog, CodecConfig::default().with_trailer(false));
        let bytes = codec
            .encode_message("WebPage_Ping", 9, &json!({ "sequence": 5 }))
            .unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 4);
        assert_eq!(&bytes[2..4], &3u16.to_le_bytes());
        assert_eq!(&bytes[8..16], &9u64.to_le_bytes());
        assert_eq!(&bytes[16..], &5u32.to_le_bytes());
    }

    #[test]
    fn test_message_round_trip_with_trailer() {
        let catalog = catalog();
        let codec = Codec::new(&catalog);
        let bytes = codec
            .encode_message("WebPage_Ping", 9, &json!({ "sequence": 5 }))
            .unwrap();
        let decoded = codec.decode_message("WebPage_Ping", &bytes).unwrap();
        assert_eq!(decoded.plain, json!({ "sequence": 5 }));
        assert_eq!(decoded.header.destination_id, 9);
        assert_eq!(decoded.consumed, HEADER_SIZE + 4);
        assert!(decoded.trailer);
    }

    #[test]
    fn test_reply_round_trip() {
        let catalog = catalog();
        let codec = Codec::new(&catalog);
        let bytes = codec
            .encode_reply("WebPage_Ping", 1, &json!({ "ok": true }))
            .unwrap();
        let decoded = codec.decode_reply("WebPage_Ping", &bytes).unwrap();
        assert!(decoded.header.is_reply());
        assert_eq!(decoded.plain, json!({ "ok": true }));

        assert!(matches!(
            codec.encode_reply("WebPage_Close", 1, &json!({})),
            Err(SerializationError::NoReply(_))
        ));
    }

    #[test]
    fn test_message_id_mismatch() {
        let catalog = catalog();
        let codec = Codec::new(&catalog);
        let bytes = codec.encode_message("WebPage_Close", 0, &json!({})).unwrap();
        assert!(matches!(
            codec.decode_message("WebPage_Ping", &bytes),
            Err(ParserError::MessageMismatch {
                expected: 3,
                found: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_trailing_bytes_policy() {
        let catalog = catalog();
        let lenient = Codec::with_config(&catalog, CodecConfig::default().with_trailer(false));
        let mut bytes = lenient.encode_message("WebPage_Close", 0, &json!({})).unwrap();
        bytes.push(0xAB);

        let decoded = lenient.decode_message("WebPage_Close", &bytes).unwrap();
        assert!(!decoded.trailer);

        let strict = Codec::with_config(
            &catalog,
            CodecConfig::default().with_reject_trailing_bytes(true),
        );
        assert!(matches!(
            strict.decode_message("WebPage_Close", &bytes),
            Err(ParserError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_unknown_message() {
        let catalog = catalog();
        let codec = Codec::new(&catalog);
        assert!(matches!(
            codec.encode_message("Nope", 0, &json!({})),
            Err(SerializationError::UnknownMessage(_))
        ));
        assert!(matches!(
            codec.decode_message("Nope", &[0; 16]),
            Err(ParserError::UnknownMessage(_))
        ));
    }

    #[test]
    fn test_values_must_be_record() {
        let catalog = catalog();
        let codec = Codec::new(&catalog);
        assert!(matches!(
            codec.encode_message("WebPage_Ping", 0, &json!([5])),
            Err(SerializationError::TypeMismatch { expected: "record", .. })
        ));
    }
}
