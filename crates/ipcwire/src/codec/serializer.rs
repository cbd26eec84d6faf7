// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Values to wire nodes.
//!
//! Input values are loosely typed JSON. Every value is checked against the
//! domain of its schema type before it becomes a [`SerializedNode`], so the
//! byte emitter never has to fail.

use crate::catalog::{ArgumentDescriptor, Catalog};
use crate::codec::error::SerializationError;
use crate::codec::node::{Scalar, SerializedNode};
use crate::types::{classify, Primitive, TypeShape};
use serde_json::{Map, Value};

/// Record key holding the payload of a present optional.
pub const OPTIONAL_VALUE_KEY: &str = "optionalValue";
/// Record key naming the chosen variant alternative.
pub const VARIANT_TYPE_KEY: &str = "variantType";
/// Record key holding the variant payload.
pub const VARIANT_VALUE_KEY: &str = "variant";

type Result<T> = std::result::Result<T, SerializationError>;

/// Schema-directed serializer over a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'c> {
    catalog: &'c Catalog,
    max_depth: usize,
}

impl<'c> Serializer<'c> {
    pub fn new(catalog: &'c Catalog, max_depth: usize) -> Self {
        Self { catalog, max_depth }
    }

    /// Serialize `values` against an ordered argument list.
    pub fn serialize_arguments(
        &self,
        descriptors: &[ArgumentDescriptor],
        values: &Map<String, Value>,
    ) -> Result<Vec<SerializedNode>> {
        descriptors
            .iter()
            .map(|descriptor| self.serialize_argument(descriptor, values, 0))
            .collect()
    }

    fn serialize_argument(
        &self,
        descriptor: &ArgumentDescriptor,
        record: &Map<String, Value>,
        depth: usize,
    ) -> Result<SerializedNode> {
        let type_name = descriptor.effective_type();
        let absent = Value::Object(Map::new());

        let value = match record.get(&descriptor.name) {
            Some(value) => value,
            None if descriptor.optional => &absent,
            None => {
                return Err(SerializationError::MissingField.in_field(&descriptor.name, &type_name))
            }
        };

        self.serialize_value(&type_name, value, depth + 1)
            .map_err(|e| e.in_field(&descriptor.name, &type_name))
    }

    /// Serialize a single value of `type_name`.
    pub fn serialize_value(
        &self,
        type_name: &str,
        value: &Value,
        depth: usize,
    ) -> Result<SerializedNode> {
        if depth > self.max_depth {
            return Err(SerializationError::DepthExceeded(self.max_depth));
        }

        let shape = classify(self.catalog, type_name)?;
        log::trace!("[codec::serialize] {} -> {:?}", type_name, shape);

        match shape {
            TypeShape::Primitive(primitive) => serialize_primitive(primitive, value),
            TypeShape::Optional(inner) => {
                let record = expect_record(value)?;
                match record.get(OPTIONAL_VALUE_KEY) {
                    Some(inner_value) => {
                        let payload = self.serialize_value(&inner, inner_value, depth + 1)?;
                        Ok(SerializedNode::composite(
                            type_name,
                            vec![SerializedNode::leaf(Scalar::Bool(true)), payload],
                        ))
                    }
                    None => Ok(SerializedNode::leaf(Scalar::Bool(false))),
                }
            }
            TypeShape::Markable(inner) => {
                // Inverted flag: 0 marks a present value.
                let record = expect_record(value)?;
                match record.get(OPTIONAL_VALUE_KEY) {
                    Some(inner_value) => {
                        let payload = self.serialize_value(&inner, inner_value, depth + 1)?;
                        Ok(SerializedNode::composite(
                            type_name,
                            vec![SerializedNode::leaf(Scalar::Bool(false)), payload],
                        ))
                    }
                    None => Ok(SerializedNode::leaf(Scalar::Bool(true))),
                }
            }
            TypeShape::Vector(inner) => {
                let elements = self.serialize_elements(&inner, expect_array(value)?, depth)?;
                Ok(SerializedNode::vector(type_name, elements))
            }
            TypeShape::HashSet(inner) => {
                let items = expect_array(value)?;
                let count = wire_count("hash set", items.len())?;
                let elements = self.serialize_elements(&inner, items, depth)?;
                Ok(SerializedNode::composite(
                    type_name,
                    vec![
                        SerializedNode::leaf(Scalar::U32(count)),
                        SerializedNode::composite(inner, elements),
                    ],
                ))
            }
            TypeShape::HashMap { key, value: mapped } => {
                let entries = expect_array(value)?;
                let count = wire_count("hash map", entries.len())?;
                let pair_type = format!("KeyValuePair<{}, {}>", key, mapped);
                let mut pairs = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    let pair = self
                        .serialize_key_value(&key, &mapped, entry, depth)
                        .map_err(|e| e.in_element(index))?;
                    pairs.push(SerializedNode::composite(pair_type.clone(), pair));
                }
                Ok(SerializedNode::composite(
                    type_name,
                    vec![
                        SerializedNode::leaf(Scalar::U32(count)),
                        SerializedNode::composite(pair_type, pairs),
                    ],
                ))
            }
            TypeShape::FixedArray { element, len } => {
                let items = expect_array(value)?;
                if items.len() != len {
                    return Err(SerializationError::LengthMismatch {
                        expected: len,
                        found: items.len(),
                    });
                }
                let elements = self.serialize_elements(&element, items, depth)?;
                Ok(SerializedNode::composite(type_name, elements))
            }
            TypeShape::Pair(first, second) => {
                let items = expect_array(value)?;
                if items.len() != 2 {
                    return Err(SerializationError::LengthMismatch {
                        expected: 2,
                        found: items.len(),
                    });
                }
                let first = self
                    .serialize_value(&first, &items[0], depth + 1)
                    .map_err(|e| e.in_element(0))?;
                let second = self
                    .serialize_value(&second, &items[1], depth + 1)
                    .map_err(|e| e.in_element(1))?;
                Ok(SerializedNode::composite(type_name, vec![first, second]))
            }
            TypeShape::Variant(alternatives) => {
                self.serialize_variant(type_name, &alternatives, value, depth)
            }
            TypeShape::OptionSet(enum_name) => self.serialize_enum(&enum_name, value, true),
            TypeShape::Identifier(name) => {
                let raw = expect_integer(value)?;
                let id = u64::try_from(raw)
                    .ok()
                    .filter(|id| i64::try_from(*id).is_ok())
                    .ok_or_else(|| out_of_bounds(raw, &name))?;
                Ok(SerializedNode::leaf_as(name, Scalar::U64(id)))
            }
            TypeShape::Enum(enum_name) => self.serialize_enum(&enum_name, value, false),
            TypeShape::Struct(name) => {
                let record = expect_record(value)?;
                let fields = self.catalog.struct_fields(&name).unwrap_or_default();
                let children = fields
                    .iter()
                    .map(|field| self.serialize_argument(field, record, depth))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SerializedNode::composite(name, children))
            }
        }
    }

    fn serialize_elements(
        &self,
        element_type: &str,
        items: &[Value],
        depth: usize,
    ) -> Result<Vec<SerializedNode>> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.serialize_value(element_type, item, depth + 1)
                    .map_err(|e| e.in_element(index))
            })
            .collect()
    }

    fn serialize_key_value(
        &self,
        key_type: &str,
        value_type: &str,
        entry: &Value,
        depth: usize,
    ) -> Result<Vec<SerializedNode>> {
        let record = expect_record(entry)?;
        let key = record
            .get("key")
            .ok_or(SerializationError::MissingField)
            .and_then(|k| self.serialize_value(key_type, k, depth + 1))
            .map_err(|e| e.in_field("key", key_type))?;
        let value = record
            .get("value")
            .ok_or(SerializationError::MissingField)
            .and_then(|v| self.serialize_value(value_type, v, depth + 1))
            .map_err(|e| e.in_field("value", value_type))?;
        Ok(vec![key, value])
    }

    fn serialize_variant(
        &self,
        type_name: &str,
        alternatives: &[String],
        value: &Value,
        depth: usize,
    ) -> Result<SerializedNode> {
        let record = expect_record(value)?;

        let chosen = match record.get(VARIANT_TYPE_KEY) {
            Some(Value::String(s)) => s.trim(),
            Some(other) => {
                return Err(SerializationError::TypeMismatch {
                    expected: "string",
                    found: describe(other),
                }
                .in_field(VARIANT_TYPE_KEY, "String"))
            }
            None => {
                return Err(SerializationError::MissingField.in_field(VARIANT_TYPE_KEY, "String"))
            }
        };

        let index = alternatives
            .iter()
            .position(|alternative| alternative == chosen)
            .ok_or_else(|| SerializationError::UnknownVariantType {
                found: chosen.to_string(),
                alternatives: alternatives.join(", "),
            })?;
        let tag = u8::try_from(index).map_err(|_| SerializationError::TooLong {
            what: "variant alternative list",
            len: alternatives.len(),
        })?;

        // A payload-free alternative (std::nullptr_t) may omit the payload key.
        let payload = match record.get(VARIANT_VALUE_KEY) {
            Some(payload) => self.serialize_value(chosen, payload, depth + 1),
            None => match classify(self.catalog, chosen) {
                Ok(TypeShape::Primitive(Primitive::Null)) => {
                    Ok(SerializedNode::empty(Primitive::Null.name()))
                }
                _ => Err(SerializationError::MissingField),
            },
        }
        .map_err(|e| e.in_field(VARIANT_VALUE_KEY, chosen))?;

        Ok(SerializedNode::composite(
            type_name,
            vec![SerializedNode::leaf(Scalar::U8(tag)), payload],
        ))
    }

    fn serialize_enum(
        &self,
        enum_name: &str,
        value: &Value,
        as_option_set: bool,
    ) -> Result<SerializedNode> {
        let enum_name = self.catalog.resolve_alias(enum_name);
        let descriptor = self
            .catalog
            .enum_descriptor(enum_name)
            .ok_or_else(|| SerializationError::UnknownType(enum_name.to_string()))?;
        let primitive = Primitive::unsigned_of_size(descriptor.size)
            .ok_or_else(|| SerializationError::UnknownType(enum_name.to_string()))?;

        let raw = expect_integer(value)?;
        let scalar = integer_scalar(primitive, raw, enum_name)?;
        let bits = u64::try_from(raw).map_err(|_| out_of_bounds(raw, enum_name))?;

        if !as_option_set && !descriptor.accepts(bits) {
            return Err(SerializationError::InvalidEnumValue {
                value: bits,
                enum_name: enum_name.to_string(),
            });
        }
        Ok(SerializedNode::leaf_as(enum_name, scalar))
    }
}

fn serialize_primitive(primitive: Primitive, value: &Value) -> Result<SerializedNode> {
    let type_name = primitive.name();
    let scalar = match primitive {
        Primitive::Bool => match value {
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(_) => match expect_integer(value)? {
                0 => Scalar::Bool(false),
                1 => Scalar::Bool(true),
                other => return Err(out_of_bounds(other, type_name)),
            },
            other => {
                return Err(SerializationError::TypeMismatch {
                    expected: "boolean",
                    found: describe(other),
                })
            }
        },
        Primitive::I8
        | Primitive::U8
        | Primitive::I16
        | Primitive::U16
        | Primitive::I32
        | Primitive::U32
        | Primitive::I64
        | Primitive::U64 => integer_scalar(primitive, expect_integer(value)?, type_name)?,
        Primitive::F32 => {
            let v = expect_float(value)?;
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(SerializationError::OutOfBounds {
                    value: v.to_string(),
                    type_name: type_name.to_string(),
                });
            }
            Scalar::F32(v as f32)
        }
        Primitive::F64 => Scalar::F64(expect_float(value)?),
        Primitive::String => match value {
            Value::String(s) => {
                let len = s.encode_utf16().count();
                if len >= crate::codec::wire::NULL_STRING_LENGTH as usize {
                    return Err(SerializationError::TooLong { what: "string", len });
                }
                Scalar::String(Some(s.clone()))
            }
            Value::Null => Scalar::String(None),
            other => {
                return Err(SerializationError::TypeMismatch {
                    expected: "string",
                    found: describe(other),
                })
            }
        },
        Primitive::ConnectionHandle | Primitive::StreamConnectionHandle => {
            let raw = expect_integer(value)?;
            let slot = u32::try_from(raw).map_err(|_| out_of_bounds(raw, type_name))?;
            Scalar::Handle(slot)
        }
        // No wire footprint; whatever value was supplied is ignored.
        Primitive::Null => return Ok(SerializedNode::empty(type_name)),
    };
    Ok(SerializedNode::leaf_as(type_name, scalar))
}

/// Range-check `raw` for an integer primitive.
fn integer_scalar(primitive: Primitive, raw: i128, type_name: &str) -> Result<Scalar> {
    let oob = || out_of_bounds(raw, type_name);
    let scalar = match primitive {
        Primitive::I8 => Scalar::I8(i8::try_from(raw).map_err(|_| oob())?),
        Primitive::U8 => Scalar::U8(u8::try_from(raw).map_err(|_| oob())?),
        Primitive::I16 => Scalar::I16(i16::try_from(raw).map_err(|_| oob())?),
        Primitive::U16 => Scalar::U16(u16::try_from(raw).map_err(|_| oob())?),
        Primitive::I32 => Scalar::I32(i32::try_from(raw).map_err(|_| oob())?),
        Primitive::U32 => Scalar::U32(u32::try_from(raw).map_err(|_| oob())?),
        Primitive::I64 => Scalar::I64(i64::try_from(raw).map_err(|_| oob())?),
        Primitive::U64 => Scalar::U64(u64::try_from(raw).map_err(|_| oob())?),
        _ => return Err(SerializationError::UnknownType(type_name.to_string())),
    };
    Ok(scalar)
}

fn out_of_bounds(raw: i128, type_name: &str) -> SerializationError {
    SerializationError::OutOfBounds {
        value: raw.to_string(),
        type_name: type_name.to_string(),
    }
}

/// Integral value of a JSON number or decimal string.
///
/// Floating numbers are accepted when they carry no fractional part.
fn expect_integer(value: &Value) -> Result<i128> {
    let not_integer = || SerializationError::TypeMismatch {
        expected: "integer",
        found: describe(value),
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(i128::from(u))
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i128),
                    _ => Err(not_integer()),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i128>().map_err(|_| not_integer()),
        _ => Err(not_integer()),
    }
}

fn expect_float(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| SerializationError::TypeMismatch {
            expected: "number",
            found: describe(value),
        })
}

fn expect_record(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SerializationError::TypeMismatch {
            expected: "record",
            found: describe(value),
        })
}

fn expect_array(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SerializationError::TypeMismatch {
            expected: "array",
            found: describe(value),
        })
}

fn wire_count(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SerializationError::TooLong { what, len })
}

/// Short description of a value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) if s.chars().count() > 32 => {
            let head: String = s.chars().take(32).collect();
            format!("string \"{}...\"", head)
        }
        Value::String(s) => format!("string \"{}\"", s),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "record".to_string(),
    }
}
