// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type catalog: the immutable schema the codec queries by type name.
//!
//! A catalog is built once (from a file or programmatically) and then
//! shared by reference with every encode/decode call.
//!
//! # File format
//!
//! ```json
//! {
//!   "messages": {
//!     "WebPage_LoadURL": {
//!       "id": 12,
//!       "arguments": [{ "name": "url", "type": "String" }],
//!       "replyArguments": [{ "name": "ok", "type": "bool" }]
//!     }
//!   },
//!   "structs": { "WebCore::IntPoint": [{ "name": "x", "type": "int" }] },
//!   "enums": { "WebCore::Mode": { "size": 1, "validValues": [0, 1] } },
//!   "aliases": { "WebCore::LayoutUnit": "int" },
//!   "identifiers": ["WebCore::FrameIdentifier"]
//! }
//! ```

use crate::alias::AliasTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported catalog file extension: {0}")]
    UnsupportedFormat(String),

    #[error("alias '{0}' resolves to itself")]
    AliasCycle(String),

    #[error("enum '{name}' has invalid size {size} (expected 1, 2, 4 or 8)")]
    InvalidEnumSize { name: String, size: u8 },

    #[error("message id {id} is used by both '{first}' and '{second}'")]
    DuplicateMessageId {
        id: u16,
        first: String,
        second: String,
    },
}

/// One field of a struct or one argument of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    /// Encoded as `Optional<type>`; a missing value means absent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    /// Enum to encode the value as instead of `type_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_override: Option<String>,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
            enum_override: None,
        }
    }

    /// Mark as optional with an absent default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_enum_override(mut self, enum_name: impl Into<String>) -> Self {
        self.enum_override = Some(enum_name.into());
        self
    }

    /// The type the codec actually dispatches on for this descriptor.
    pub fn effective_type(&self) -> String {
        let base = self.enum_override.as_deref().unwrap_or(&self.type_name);
        if self.optional {
            format!("Optional<{}>", base)
        } else {
            base.to_string()
        }
    }
}

/// Wire description of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptor {
    /// Width in bytes of the unsigned wire representation.
    pub size: u8,

    /// Bitmask semantics: any combination of bits is legal.
    #[serde(default)]
    pub is_option_set: bool,

    #[serde(default)]
    pub valid_values: BTreeSet<u64>,
}

impl EnumDescriptor {
    pub fn new(size: u8, valid_values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            size,
            is_option_set: false,
            valid_values: valid_values.into_iter().collect(),
        }
    }

    pub fn option_set(size: u8) -> Self {
        Self {
            size,
            is_option_set: true,
            valid_values: BTreeSet::new(),
        }
    }

    pub fn accepts(&self, value: u64) -> bool {
        self.is_option_set || self.valid_values.contains(&value)
    }
}

/// A message and its argument lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSchema {
    /// Numeric message name carried in the header.
    pub id: u16,

    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,

    /// Present only for messages that expect a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_arguments: Option<Vec<ArgumentDescriptor>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    messages: IndexMap<String, MessageSchema>,
    structs: HashMap<String, Vec<ArgumentDescriptor>>,
    enums: HashMap<String, EnumDescriptor>,
    aliases: HashMap<String, String>,
    identifiers: Vec<String>,
}

/// Immutable schema lookup table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: IndexMap<String, MessageSchema>,
    message_ids: HashMap<u16, String>,
    structs: HashMap<String, Vec<ArgumentDescriptor>>,
    enums: HashMap<String, EnumDescriptor>,
    aliases: AliasTable,
    identifiers: HashSet<String>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Load a catalog from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::from_parts(file)
    }

    /// Load a catalog from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Self::from_parts(file)
    }

    /// Load a catalog file, picking the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            other => Err(CatalogError::UnsupportedFormat(other.to_string())),
        }
    }

    fn from_parts(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::new();
        for (name, message) in file.messages {
            builder = builder.message_schema(name, message);
        }
        for (name, fields) in file.structs {
            builder = builder.structure(name, fields);
        }
        for (name, descriptor) in file.enums {
            builder = builder.enumeration(name, descriptor);
        }
        for (alias, target) in file.aliases {
            builder = builder.alias(alias, target);
        }
        for name in file.identifiers {
            builder = builder.identifier(name);
        }
        builder.build()
    }

    pub fn message(&self, name: &str) -> Option<&MessageSchema> {
        self.messages.get(name)
    }

    /// Message name and schema for a header message id.
    pub fn message_by_id(&self, id: u16) -> Option<(&str, &MessageSchema)> {
        let name = self.message_ids.get(&id)?;
        self.messages.get(name).map(|m| (name.as_str(), m))
    }

    pub fn messages(&self) -> impl Iterator<Item = (&str, &MessageSchema)> {
        self.messages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn struct_fields(&self, name: &str) -> Option<&[ArgumentDescriptor]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn enum_descriptor(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.identifiers.contains(name)
    }

    /// Canonical name of `name` after alias resolution.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.resolve(name)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    pub fn identifier_count(&self) -> usize {
        self.identifiers.len()
    }
}

/// Programmatic catalog construction.
#[derive(Debug)]
pub struct CatalogBuilder {
    messages: IndexMap<String, MessageSchema>,
    structs: HashMap<String, Vec<ArgumentDescriptor>>,
    enums: HashMap<String, EnumDescriptor>,
    aliases: AliasTable,
    identifiers: HashSet<String>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    /// Start from the built-in alias table and nothing else.
    pub fn new() -> Self {
        Self {
            messages: IndexMap::new(),
            structs: HashMap::new(),
            enums: HashMap::new(),
            aliases: AliasTable::builtin(),
            identifiers: HashSet::new(),
        }
    }

    /// Add a message with its argument list.
    pub fn message(
        self,
        name: impl Into<String>,
        id: u16,
        arguments: Vec<ArgumentDescriptor>,
    ) -> Self {
        self.message_schema(
            name,
            MessageSchema {
                id,
                arguments,
                reply_arguments: None,
            },
        )
    }

    /// Add a message that expects a reply.
    pub fn message_with_reply(
        self,
        name: impl Into<String>,
        id: u16,
        arguments: Vec<ArgumentDescriptor>,
        reply_arguments: Vec<ArgumentDescriptor>,
    ) -> Self {
        self.message_schema(
            name,
            MessageSchema {
                id,
                arguments,
                reply_arguments: Some(reply_arguments),
            },
        )
    }

    pub fn message_schema(mut self, name: impl Into<String>, schema: MessageSchema) -> Self {
        self.messages.insert(name.into(), schema);
        self
    }

    pub fn structure(mut self, name: impl Into<String>, fields: Vec<ArgumentDescriptor>) -> Self {
        self.structs.insert(name.into(), fields);
        self
    }

    pub fn enumeration(mut self, name: impl Into<String>, descriptor: EnumDescriptor) -> Self {
        self.enums.insert(name.into(), descriptor);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias, target);
        self
    }

    pub fn identifier(mut self, name: impl Into<String>) -> Self {
        self.identifiers.insert(name.into());
        self
    }

    /// Validate and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if let Some(alias) = self.aliases.find_cycle() {
            return Err(CatalogError::AliasCycle(alias.to_string()));
        }

        for (name, descriptor) in &self.enums {
            if !matches!(descriptor.size, 1 | 2 | 4 | 8) {
                return Err(CatalogError::InvalidEnumSize {
                    name: name.clone(),
                    size: descriptor.size,
                });
            }
        }

        let mut message_ids: HashMap<u16, String> = HashMap::new();
        for (name, schema) in &self.messages {
            if let Some(first) = message_ids.insert(schema.id, name.clone()) {
                return Err(CatalogError::DuplicateMessageId {
                    id: schema.id,
                    first,
                    second: name.clone(),
                });
            }
        }

        log::debug!(
            "[catalog] built: {} messages, {} structs, {} enums, {} identifiers",
            self.messages.len(),
            self.structs.len(),
            self.enums.len(),
            self.identifiers.len()
        );

        Ok(Catalog {
            messages: self.messages,
            message_ids,
            structs: self.structs,
            enums: self.enums,
            aliases: self.aliases,
            identifiers: self.identifiers,
        })
    }
}
