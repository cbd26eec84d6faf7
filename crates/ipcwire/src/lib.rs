// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # ipcwire - type-directed IPC message codec
//!
//! Encodes loosely typed argument values into the aligned little-endian wire
//! format of an IPC message, and decodes such messages back, driven entirely
//! by a runtime [`Catalog`] of message, struct, enum, alias and identifier
//! definitions. Type names are C++-style expressions (`Vector<String>`,
//! `std::optional<WebCore::IntPoint>`, `HashMap<String, uint64_t>`) parsed on
//! demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use ipcwire::{ArgumentDescriptor, Catalog, Codec};
//! use serde_json::json;
//!
//! let catalog = Catalog::builder()
//!     .structure(
//!         "WebCore::IntPoint",
//!         vec![
//!             ArgumentDescriptor::new("x", "int"),
//!             ArgumentDescriptor::new("y", "int"),
//!         ],
//!     )
//!     .build()
//!     .unwrap();
//! let codec = Codec::new(&catalog);
//!
//! let arguments = vec![
//!     ArgumentDescriptor::new("points", "Vector<WebCore::IntPoint>"),
//!     ArgumentDescriptor::new("label", "String").optional(),
//! ];
//! let values = json!({ "points": [{ "x": 1, "y": -2 }] });
//!
//! let bytes = codec.encode_arguments(&arguments, &values).unwrap();
//! let (plain, end) = codec.decode_arguments(&bytes, 0, &arguments).unwrap();
//! assert_eq!(plain, json!({ "points": [{ "x": 1, "y": -2 }], "label": {} }));
//! assert_eq!(end, bytes.len());
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! values --Serializer--> SerializedNode tree --emit--> bytes
//! bytes  --Parser------> ParsedNode tree     --untype--> values
//! ```
//!
//! ## Modules Overview
//!
//! - [`catalog`] - schema tables and file loading
//! - [`grammar`] - template expression parsing
//! - [`alias`] - type name canonicalization
//! - [`types`] - classification of type names into wire shapes
//! - [`codec`] - serializer, parser, byte layer, untyping
//! - [`message`] - header and diagnostic trailer framing
//! - [`config`] - codec settings

pub mod alias;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod grammar;
pub mod message;
pub mod types;

pub use catalog::{
    ArgumentDescriptor, Catalog, CatalogBuilder, CatalogError, EnumDescriptor, MessageSchema,
};
pub use codec::{
    untype, Codec, ParsedNode, ParsedValue, ParserError, Scalar, SerializationError,
    SerializedNode, TypeCategory,
};
pub use config::{CodecConfig, ConfigError, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS};
pub use grammar::{parse_template_head, split_template_arguments, GrammarError};
pub use message::{has_trailer, DecodedMessage, MessageHeader, HEADER_SIZE};
pub use types::{classify, Primitive, TypeShape};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
