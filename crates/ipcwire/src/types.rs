// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Closed classification of type names.
//!
//! Every type name the codec sees is turned into a [`TypeShape`] once per
//! dispatch; serializer and parser then match on it exhaustively.

use crate::catalog::Catalog;
use crate::grammar::{is_template, GrammarError, TemplateExpression};

/// Primitive wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    ConnectionHandle,
    StreamConnectionHandle,
    /// Zero-sized sentinel (`std::nullptr_t`).
    Null,
}

impl Primitive {
    /// Look up a canonical primitive spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "int8_t" => Self::I8,
            "uint8_t" => Self::U8,
            "int16_t" => Self::I16,
            "uint16_t" => Self::U16,
            "int32_t" => Self::I32,
            "uint32_t" => Self::U32,
            "int64_t" => Self::I64,
            "uint64_t" => Self::U64,
            "float" => Self::F32,
            "double" => Self::F64,
            "String" => Self::String,
            "IPC::ConnectionHandle" => Self::ConnectionHandle,
            "IPC::StreamServerConnectionHandle" => Self::StreamConnectionHandle,
            "std::nullptr_t" => Self::Null,
            _ => return None,
        };
        Some(primitive)
    }

    /// Canonical spelling, used as the node type tag.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8_t",
            Self::U8 => "uint8_t",
            Self::I16 => "int16_t",
            Self::U16 => "uint16_t",
            Self::I32 => "int32_t",
            Self::U32 => "uint32_t",
            Self::I64 => "int64_t",
            Self::U64 => "uint64_t",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::String => "String",
            Self::ConnectionHandle => "IPC::ConnectionHandle",
            Self::StreamConnectionHandle => "IPC::StreamServerConnectionHandle",
            Self::Null => "std::nullptr_t",
        }
    }

    /// Fixed wire size in bytes (None for strings).
    pub fn size(self) -> Option<usize> {
        match self {
            Self::Null => Some(0),
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::ConnectionHandle | Self::StreamConnectionHandle => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::String => None,
        }
    }

    /// Unsigned integer primitive of `size` bytes.
    pub fn unsigned_of_size(size: u8) -> Option<Self> {
        match size {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            8 => Some(Self::U64),
            _ => None,
        }
    }
}

/// Nullable wrappers: 1-byte flag, `1` = present.
const OPTIONAL_HEADS: &[&str] = &[
    "Optional",
    "std::optional",
    "RefPtr",
    "std::unique_ptr",
    "RetainPtr",
];
const VECTOR_HEADS: &[&str] = &["Vector", "std::vector", "std::span", "Span"];
const HASH_SET_HEADS: &[&str] = &["HashSet", "ListHashSet"];
const HASH_MAP_HEADS: &[&str] = &["HashMap", "std::map", "std::unordered_map"];
const ARRAY_HEADS: &[&str] = &["std::array", "Array"];
const PAIR_HEADS: &[&str] = &["std::pair", "Pair", "KeyValuePair"];
const VARIANT_HEADS: &[&str] = &["std::variant", "Variant"];
/// Wrappers with no wire footprint of their own.
const TRANSPARENT_HEADS: &[&str] = &[
    "Ref",
    "UniqueRef",
    "std::shared_ptr",
    "std::reference_wrapper",
];

/// How a resolved type name is laid out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(Primitive),
    Optional(String),
    Markable(String),
    Vector(String),
    HashSet(String),
    HashMap { key: String, value: String },
    FixedArray { element: String, len: usize },
    Pair(String, String),
    Variant(Vec<String>),
    /// Enum encoded with bitmask semantics regardless of its descriptor.
    OptionSet(String),
    /// Opaque handle. Values are confined to `0..=i64::MAX` on input and
    /// travel as `u64`, so every accepted value parses back unchanged.
    Identifier(String),
    Enum(String),
    Struct(String),
}

/// Why a type name could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    Grammar(GrammarError),
    Unknown(String),
}

impl From<GrammarError> for ClassifyError {
    fn from(e: GrammarError) -> Self {
        Self::Grammar(e)
    }
}

/// Classify `name` against `catalog`.
///
/// Aliases are resolved first and transparent wrappers are peeled off, so
/// the returned shape always carries wire meaning.
pub fn classify(catalog: &Catalog, name: &str) -> Result<TypeShape, ClassifyError> {
    let mut current = catalog.resolve_alias(name).to_string();

    loop {
        if !is_template(&current) {
            return classify_named(catalog, &current);
        }
        // Catalog entries may themselves be spelled with template brackets.
        if let Some(shape) = catalog_entry(catalog, &current) {
            return Ok(shape);
        }

        let expr = TemplateExpression::parse(&current)?;
        let head = expr.head.as_str();

        if TRANSPARENT_HEADS.contains(&head) {
            expr.expect_arity(1)?;
            current = catalog.resolve_alias(&expr.args[0]).to_string();
            continue;
        }

        log::trace!("[types] template '{}' -> head '{}'", current, head);
        return classify_template(expr);
    }
}

fn classify_template(mut expr: TemplateExpression) -> Result<TypeShape, ClassifyError> {
    let head = expr.head.as_str();

    if ARRAY_HEADS.contains(&head) {
        expr.expect_arity(2)?;
        let len = parse_cardinality(&expr.args[1])?;
        let element = expr.args.swap_remove(0);
        return Ok(TypeShape::FixedArray { element, len });
    }

    if HASH_MAP_HEADS.contains(&head) {
        expr.expect_arity(2)?;
        let value = expr.args.pop().unwrap_or_default();
        let key = expr.args.pop().unwrap_or_default();
        return Ok(TypeShape::HashMap { key, value });
    }

    if PAIR_HEADS.contains(&head) {
        expr.expect_arity(2)?;
        let second = expr.args.pop().unwrap_or_default();
        let first = expr.args.pop().unwrap_or_default();
        return Ok(TypeShape::Pair(first, second));
    }

    if VARIANT_HEADS.contains(&head) {
        return Ok(TypeShape::Variant(expr.args));
    }

    // Everything else takes a single argument.
    let wrap: fn(String) -> TypeShape = if OPTIONAL_HEADS.contains(&head) {
        TypeShape::Optional
    } else if head == "Markable" {
        TypeShape::Markable
    } else if VECTOR_HEADS.contains(&head) {
        TypeShape::Vector
    } else if HASH_SET_HEADS.contains(&head) {
        TypeShape::HashSet
    } else if head == "OptionSet" {
        TypeShape::OptionSet
    } else {
        return Err(ClassifyError::Unknown(format!(
            "{}<{}>",
            expr.head,
            expr.args.join(", ")
        )));
    };

    // Markable<T, Traits> carries a traits argument with no wire meaning.
    let expected = if head == "Markable" && expr.args.len() == 2 {
        2
    } else {
        1
    };
    expr.expect_arity(expected)?;
    Ok(wrap(expr.args.swap_remove(0)))
}

fn classify_named(catalog: &Catalog, name: &str) -> Result<TypeShape, ClassifyError> {
    if let Some(shape) = catalog_entry(catalog, name) {
        return Ok(shape);
    }
    if let Some(primitive) = Primitive::from_name(name) {
        return Ok(TypeShape::Primitive(primitive));
    }
    if catalog.struct_fields(name).is_some() {
        return Ok(TypeShape::Struct(name.to_string()));
    }
    Err(ClassifyError::Unknown(name.to_string()))
}

/// Identifier or enum registered under exactly `name`, or a struct when the
/// name carries template brackets.
fn catalog_entry(catalog: &Catalog, name: &str) -> Option<TypeShape> {
    if catalog.is_identifier(name) {
        return Some(TypeShape::Identifier(name.to_string()));
    }
    if catalog.enum_descriptor(name).is_some() {
        return Some(TypeShape::Enum(name.to_string()));
    }
    if is_template(name) && catalog.struct_fields(name).is_some() {
        return Some(TypeShape::Struct(name.to_string()));
    }
    None
}

fn parse_cardinality(arg: &str) -> Result<usize, GrammarError> {
    let digits = arg.trim().trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    digits
        .parse::<usize>()
        .map_err(|_| GrammarError::Cardinality(arg.to_string()))
}
