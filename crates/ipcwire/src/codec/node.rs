// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged intermediate trees produced by the serializer and the parser.

use crate::types::Primitive;
use indexmap::IndexMap;
use serde_json::Value;

/// A primitive value with its exact wire width.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// `None` is the null string.
    String(Option<String>),
    /// Attachment slot of a connection handle.
    Handle(u32),
}

impl Scalar {
    /// Wire primitive this scalar is written as.
    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Bool(_) => Primitive::Bool,
            Self::I8(_) => Primitive::I8,
            Self::U8(_) => Primitive::U8,
            Self::I16(_) => Primitive::I16,
            Self::U16(_) => Primitive::U16,
            Self::I32(_) => Primitive::I32,
            Self::U32(_) => Primitive::U32,
            Self::I64(_) => Primitive::I64,
            Self::U64(_) => Primitive::U64,
            Self::F32(_) => Primitive::F32,
            Self::F64(_) => Primitive::F64,
            Self::String(_) => Primitive::String,
            Self::Handle(_) => Primitive::ConnectionHandle,
        }
    }

    /// Plain JSON rendering of the scalar.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(*v),
            Self::I8(v) => Value::from(*v),
            Self::U8(v) => Value::from(*v),
            Self::I16(v) => Value::from(*v),
            Self::U16(v) => Value::from(*v),
            Self::I32(v) => Value::from(*v),
            Self::U32(v) => Value::from(*v),
            Self::I64(v) => Value::from(*v),
            Self::U64(v) => Value::from(*v),
            Self::F32(v) => float_value(f64::from(*v)),
            Self::F64(v) => float_value(*v),
            Self::String(Some(s)) => Value::String(s.clone()),
            Self::String(None) => Value::Null,
            Self::Handle(v) => Value::from(*v),
        }
    }
}

/// Non-finite floats have no JSON number form and render as `null`.
fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Payload of a [`SerializedNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A primitive leaf.
    Leaf(Scalar),
    /// Elements preceded on the wire by a `uint64` count.
    Vector(Vec<SerializedNode>),
    /// Children written back to back with no framing of their own.
    Composite(Vec<SerializedNode>),
    /// No wire footprint.
    Empty,
}

/// Schema-shaped output of the serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedNode {
    pub type_name: String,
    pub value: NodeValue,
}

impl SerializedNode {
    pub fn leaf(scalar: Scalar) -> Self {
        Self {
            type_name: scalar.primitive().name().to_string(),
            value: NodeValue::Leaf(scalar),
        }
    }

    pub fn leaf_as(type_name: impl Into<String>, scalar: Scalar) -> Self {
        Self {
            type_name: type_name.into(),
            value: NodeValue::Leaf(scalar),
        }
    }

    pub fn vector(type_name: impl Into<String>, elements: Vec<SerializedNode>) -> Self {
        Self {
            type_name: type_name.into(),
            value: NodeValue::Vector(elements),
        }
    }

    pub fn composite(type_name: impl Into<String>, children: Vec<SerializedNode>) -> Self {
        Self {
            type_name: type_name.into(),
            value: NodeValue::Composite(children),
        }
    }

    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: NodeValue::Empty,
        }
    }

    /// The scalar of a leaf node.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Leaf(s) => Some(s),
            _ => None,
        }
    }

    /// Children of a vector or composite node.
    pub fn children(&self) -> &[SerializedNode] {
        match &self.value {
            NodeValue::Vector(c) | NodeValue::Composite(c) => c,
            NodeValue::Leaf(_) | NodeValue::Empty => &[],
        }
    }
}

/// Coarse category used by the untyping projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Primitive,
    Enum,
    Identifier,
    Composite,
}

impl TypeCategory {
    /// Scalar categories carry a plain value already.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::Composite)
    }
}

/// Payload of a [`ParsedNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Scalar(Value),
    Record(IndexMap<String, ParsedNode>),
    List(Vec<ParsedNode>),
}

/// Typed output of the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    pub parsed_type: String,
    pub category: TypeCategory,
    pub parsed_value: ParsedValue,
}

impl ParsedNode {
    pub fn scalar(parsed_type: impl Into<String>, category: TypeCategory, value: Value) -> Self {
        Self {
            parsed_type: parsed_type.into(),
            category,
            parsed_value: ParsedValue::Scalar(value),
        }
    }

    pub fn record(parsed_type: impl Into<String>, fields: IndexMap<String, ParsedNode>) -> Self {
        Self {
            parsed_type: parsed_type.into(),
            category: TypeCategory::Composite,
            parsed_value: ParsedValue::Record(fields),
        }
    }

    pub fn list(parsed_type: impl Into<String>, elements: Vec<ParsedNode>) -> Self {
        Self {
            parsed_type: parsed_type.into(),
            category: TypeCategory::Composite,
            parsed_value: ParsedValue::List(elements),
        }
    }

    /// Field of a record node.
    pub fn field(&self, name: &str) -> Option<&ParsedNode> {
        match &self.parsed_value {
            ParsedValue::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Elements of a list node.
    pub fn elements(&self) -> Option<&[ParsedNode]> {
        match &self.parsed_value {
            ParsedValue::List(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match &self.parsed_value {
            ParsedValue::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_values() {
        assert_eq!(Scalar::Bool(true).to_value(), Value::Bool(true));
        assert_eq!(Scalar::I16(-3).to_value(), Value::from(-3));
        assert_eq!(Scalar::U64(u64::MAX).to_value(), Value::from(u64::MAX));
        assert_eq!(Scalar::F32(1.5).to_value(), Value::from(1.5));
        assert_eq!(Scalar::F64(f64::NAN).to_value(), Value::Null);
        assert_eq!(Scalar::String(None).to_value(), Value::Null);
    }

    #[test]
    fn test_leaf_type_name() {
        let node = SerializedNode::leaf(Scalar::U32(5));
        assert_eq!(node.type_name, "uint32_t");
        assert_eq!(node.as_scalar(), Some(&Scalar::U32(5)));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_parsed_accessors() {
        let mut fields = IndexMap::new();
        fields.insert(
            "x".to_string(),
            ParsedNode::scalar("int32_t", TypeCategory::Primitive, Value::from(4)),
        );
        let node = ParsedNode::record("Point", fields);
        assert_eq!(
            node.field("x").and_then(ParsedNode::as_value),
            Some(&Value::from(4))
        );
        assert!(node.elements().is_none());
        assert!(!node.category.is_scalar());
    }
}
