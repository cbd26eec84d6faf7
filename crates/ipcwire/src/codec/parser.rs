// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire bytes to typed trees.
//!
//! The parser walks the same type shapes as the serializer over a
//! [`WireReader`]. Every read is bounds checked, so a hostile or truncated
//! buffer yields a [`ParserError`] and never a panic.

use crate::catalog::{ArgumentDescriptor, Catalog};
use crate::codec::error::ParserError;
use crate::codec::node::{ParsedNode, Scalar, TypeCategory};
use crate::codec::serializer::{OPTIONAL_VALUE_KEY, VARIANT_TYPE_KEY, VARIANT_VALUE_KEY};
use crate::codec::wire::WireReader;
use crate::config::DEFAULT_MAX_ELEMENTS;
use crate::types::{classify, Primitive, TypeShape};
use indexmap::IndexMap;
use serde_json::Value;
use std::cell::Cell;

type Result<T> = std::result::Result<T, ParserError>;

/// Type name of the record returned for a top-level argument list.
pub const ARGUMENTS_TYPE: &str = "Arguments";

/// Upper bound on the elements reserved up front for one container.
const MAX_PREALLOC: usize = 1024;

/// Schema-directed parser over a borrowed catalog.
///
/// Every container element parsed draws from a shared element budget, so
/// nested counts over zero-sized elements cannot expand without bound.
#[derive(Debug, Clone)]
pub struct Parser<'c> {
    catalog: &'c Catalog,
    max_depth: usize,
    max_elements: usize,
    budget: Cell<usize>,
}

impl<'c> Parser<'c> {
    pub fn new(catalog: &'c Catalog, max_depth: usize) -> Self {
        Self {
            catalog,
            max_depth,
            max_elements: DEFAULT_MAX_ELEMENTS,
            budget: Cell::new(DEFAULT_MAX_ELEMENTS),
        }
    }

    /// Limit the total number of container elements parsed by this parser.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self.budget = Cell::new(max_elements);
        self
    }

    /// Container elements still available before parsing fails.
    pub fn remaining_elements(&self) -> usize {
        self.budget.get()
    }

    fn take_element(&self) -> Result<()> {
        let left = self.budget.get();
        if left == 0 {
            return Err(ParserError::ElementLimit(self.max_elements));
        }
        self.budget.set(left - 1);
        Ok(())
    }

    /// Parse an ordered argument list into a record keyed by argument name.
    ///
    /// The reader is left positioned after the last argument.
    pub fn parse_arguments(
        &self,
        reader: &mut WireReader<'_>,
        descriptors: &[ArgumentDescriptor],
    ) -> Result<ParsedNode> {
        let fields = self.parse_fields(reader, descriptors, 0)?;
        Ok(ParsedNode::record(ARGUMENTS_TYPE, fields))
    }

    fn parse_fields(
        &self,
        reader: &mut WireReader<'_>,
        descriptors: &[ArgumentDescriptor],
        depth: usize,
    ) -> Result<IndexMap<String, ParsedNode>> {
        let mut fields = IndexMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let type_name = descriptor.effective_type();
            let node = self
                .parse_value(reader, &type_name, depth + 1)
                .map_err(|e| e.in_field(&descriptor.name, &type_name))?;
            fields.insert(descriptor.name.clone(), node);
        }
        Ok(fields)
    }

    /// Parse one value of `type_name` at the reader's position.
    pub fn parse_value(
        &self,
        reader: &mut WireReader<'_>,
        type_name: &str,
        depth: usize,
    ) -> Result<ParsedNode> {
        if depth > self.max_depth {
            return Err(ParserError::DepthExceeded(self.max_depth));
        }

        let shape = classify(self.catalog, type_name)?;
        log::trace!(
            "[codec::parse] {} at offset {} -> {:?}",
            type_name,
            reader.offset(),
            shape
        );

        match shape {
            TypeShape::Primitive(primitive) => {
                let value = read_primitive(reader, primitive)?;
                Ok(ParsedNode::scalar(primitive.name(), TypeCategory::Primitive, value))
            }
            TypeShape::Optional(inner) => {
                let present = match reader.read_u8()? {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(ParserError::InvalidFlag {
                            what: "optional",
                            value: other,
                        })
                    }
                };
                self.parse_optional(reader, type_name, &inner, present, depth)
            }
            TypeShape::Markable(inner) => {
                // Inverted flag: 0 marks a present value.
                let present = reader.read_u8()? == 0;
                self.parse_optional(reader, type_name, &inner, present, depth)
            }
            TypeShape::Vector(inner) => {
                let count = reader.read_u64()?;
                let elements = self.parse_elements(reader, &inner, count, depth)?;
                Ok(ParsedNode::list(type_name, elements))
            }
            TypeShape::HashSet(inner) => {
                let count = u64::from(reader.read_u32()?);
                let elements = self.parse_elements(reader, &inner, count, depth)?;
                Ok(ParsedNode::list(type_name, elements))
            }
            TypeShape::HashMap { key, value } => {
                let count = reader.read_u32()?;
                let pair_type = format!("KeyValuePair<{}, {}>", key, value);
                let mut entries = Vec::with_capacity(self.capacity_hint(u64::from(count), reader));
                for index in 0..count as usize {
                    self.take_element().map_err(|e| e.in_element(index))?;
                    let entry = self
                        .parse_key_value(reader, &pair_type, &key, &value, depth)
                        .map_err(|e| e.in_element(index))?;
                    entries.push(entry);
                }
                Ok(ParsedNode::list(type_name, entries))
            }
            TypeShape::FixedArray { element, len } => {
                let elements = self.parse_elements(reader, &element, len as u64, depth)?;
                Ok(ParsedNode::list(type_name, elements))
            }
            TypeShape::Pair(first, second) => {
                let first = self
                    .parse_value(reader, &first, depth + 1)
                    .map_err(|e| e.in_element(0))?;
                let second = self
                    .parse_value(reader, &second, depth + 1)
                    .map_err(|e| e.in_element(1))?;
                Ok(ParsedNode::list(type_name, vec![first, second]))
            }
            TypeShape::Variant(alternatives) => {
                let index = reader.read_u8()?;
                let chosen = alternatives.get(usize::from(index)).ok_or(
                    ParserError::InvalidVariantIndex {
                        index,
                        count: alternatives.len(),
                    },
                )?;
                let payload = self
                    .parse_value(reader, chosen, depth + 1)
                    .map_err(|e| e.in_field(VARIANT_VALUE_KEY, chosen))?;

                let mut fields = IndexMap::with_capacity(2);
                fields.insert(
                    VARIANT_TYPE_KEY.to_string(),
                    ParsedNode::scalar(
                        Primitive::String.name(),
                        TypeCategory::Primitive,
                        Value::String(chosen.clone()),
                    ),
                );
                fields.insert(VARIANT_VALUE_KEY.to_string(), payload);
                Ok(ParsedNode::record(type_name, fields))
            }
            TypeShape::OptionSet(enum_name) => self.parse_enum(reader, &enum_name, true),
            TypeShape::Identifier(name) => {
                let id = reader.read_u64()?;
                Ok(ParsedNode::scalar(name, TypeCategory::Identifier, Value::from(id)))
            }
            TypeShape::Enum(enum_name) => self.parse_enum(reader, &enum_name, false),
            TypeShape::Struct(name) => {
                let descriptors = self.catalog.struct_fields(&name).unwrap_or_default();
                let fields = self.parse_fields(reader, descriptors, depth)?;
                Ok(ParsedNode::record(name, fields))
            }
        }
    }

    fn parse_optional(
        &self,
        reader: &mut WireReader<'_>,
        type_name: &str,
        inner: &str,
        present: bool,
        depth: usize,
    ) -> Result<ParsedNode> {
        let mut fields = IndexMap::new();
        if present {
            let value = self.parse_value(reader, inner, depth + 1)?;
            fields.insert(OPTIONAL_VALUE_KEY.to_string(), value);
        }
        Ok(ParsedNode::record(type_name, fields))
    }

    fn parse_elements(
        &self,
        reader: &mut WireReader<'_>,
        element_type: &str,
        count: u64,
        depth: usize,
    ) -> Result<Vec<ParsedNode>> {
        let mut elements = Vec::with_capacity(self.capacity_hint(count, reader));
        let mut index = 0usize;
        while (index as u64) < count {
            self.take_element().map_err(|e| e.in_element(index))?;
            let element = self
                .parse_value(reader, element_type, depth + 1)
                .map_err(|e| e.in_element(index))?;
            elements.push(element);
            index += 1;
        }
        Ok(elements)
    }

    /// Counts come off the wire, so only a bounded prefix is reserved.
    fn capacity_hint(&self, count: u64, reader: &WireReader<'_>) -> usize {
        usize::try_from(count)
            .unwrap_or(usize::MAX)
            .min(reader.remaining())
            .min(self.budget.get())
            .min(MAX_PREALLOC)
    }

    fn parse_key_value(
        &self,
        reader: &mut WireReader<'_>,
        pair_type: &str,
        key_type: &str,
        value_type: &str,
        depth: usize,
    ) -> Result<ParsedNode> {
        let key = self
            .parse_value(reader, key_type, depth + 1)
            .map_err(|e| e.in_field("key", key_type))?;
        let value = self
            .parse_value(reader, value_type, depth + 1)
            .map_err(|e| e.in_field("value", value_type))?;

        let mut fields = IndexMap::with_capacity(2);
        fields.insert("key".to_string(), key);
        fields.insert("value".to_string(), value);
        Ok(ParsedNode::record(pair_type, fields))
    }

    fn parse_enum(
        &self,
        reader: &mut WireReader<'_>,
        enum_name: &str,
        as_option_set: bool,
    ) -> Result<ParsedNode> {
        let enum_name = self.catalog.resolve_alias(enum_name);
        let descriptor = self
            .catalog
            .enum_descriptor(enum_name)
            .ok_or_else(|| ParserError::UnknownType(enum_name.to_string()))?;

        let bits = match descriptor.size {
            1 => u64::from(reader.read_u8()?),
            2 => u64::from(reader.read_u16()?),
            4 => u64::from(reader.read_u32()?),
            8 => reader.read_u64()?,
            _ => return Err(ParserError::UnknownType(enum_name.to_string())),
        };

        if !as_option_set && !descriptor.accepts(bits) {
            return Err(ParserError::InvalidEnumValue {
                value: bits,
                enum_name: enum_name.to_string(),
            });
        }
        Ok(ParsedNode::scalar(enum_name, TypeCategory::Enum, Value::from(bits)))
    }
}

fn read_primitive(reader: &mut WireReader<'_>, primitive: Primitive) -> Result<Value> {
    let scalar = match primitive {
        Primitive::Bool => match reader.read_u8()? {
            0 => Scalar::Bool(false),
            1 => Scalar::Bool(true),
            other => {
                return Err(ParserError::InvalidFlag {
                    what: "bool",
                    value: other,
                })
            }
        },
        Primitive::I8 => Scalar::I8(reader.read_u8()? as i8),
        Primitive::U8 => Scalar::U8(reader.read_u8()?),
        Primitive::I16 => Scalar::I16(reader.read_u16()? as i16),
        Primitive::U16 => Scalar::U16(reader.read_u16()?),
        Primitive::I32 => Scalar::I32(reader.read_u32()? as i32),
        Primitive::U32 => Scalar::U32(reader.read_u32()?),
        Primitive::I64 => Scalar::I64(reader.read_u64()? as i64),
        Primitive::U64 => Scalar::U64(reader.read_u64()?),
        Primitive::F32 => Scalar::F32(f32::from_bits(reader.read_u32()?)),
        Primitive::F64 => Scalar::F64(f64::from_bits(reader.read_u64()?)),
        Primitive::String => Scalar::String(reader.read_string()?),
        Primitive::ConnectionHandle | Primitive::StreamConnectionHandle => {
            Scalar::Handle(reader.read_u32()?)
        }
        Primitive::Null => return Ok(Value::Null),
    };
    Ok(scalar.to_value())
}
