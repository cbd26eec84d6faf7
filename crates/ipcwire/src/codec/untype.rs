// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Projection of typed parse trees onto plain values.

use crate::codec::node::{ParsedNode, ParsedValue};
use serde_json::{Map, Value};

/// Strip type tags from a parsed tree.
///
/// Scalars come back as-is; records and lists keep their shape with every
/// child projected. Record keys stay in schema order.
pub fn untype(node: &ParsedNode) -> Value {
    match &node.parsed_value {
        ParsedValue::Scalar(value) => value.clone(),
        ParsedValue::Record(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, child)| (name.clone(), untype(child)))
                .collect::<Map<String, Value>>(),
        ),
        ParsedValue::List(elements) => Value::Array(elements.iter().map(untype).collect()),
    }
}
