// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec errors.
//!
//! Both error kinds nest: every struct field and top-level argument wraps
//! the error of its child in a `Field` frame, and sequence elements wrap in
//! an `Element` frame. The rendered message therefore reads as a path from
//! the message root down to the failing leaf.

use crate::grammar::GrammarError;
use crate::types::ClassifyError;
use thiserror::Error;

/// Errors raised while turning values into wire nodes.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("field '{name}' of type '{type_name}': {source}")]
    Field {
        name: String,
        type_name: String,
        source: Box<SerializationError>,
    },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<SerializationError>,
    },

    #[error("missing required field")]
    MissingField,

    #[error("value {value} is out-of-bounds for {type_name}")]
    OutOfBounds { value: String, type_name: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("value {value} is not a valid {enum_name}")]
    InvalidEnumValue { value: u64, enum_name: String },

    #[error("variant type '{found}' is not one of [{alternatives}]")]
    UnknownVariantType { found: String, alternatives: String },

    #[error("expected {expected} element(s), found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("{what} of length {len} does not fit its wire count")]
    TooLong { what: &'static str, len: usize },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),

    #[error("unknown message '{0}'")]
    UnknownMessage(String),

    #[error("message '{0}' has no reply")]
    NoReply(String),
}

/// Errors raised while reading wire bytes back.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("field '{name}' of type '{type_name}': {source}")]
    Field {
        name: String,
        type_name: String,
        source: Box<ParserError>,
    },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ParserError>,
    },

    #[error("read of {need} byte(s) at offset {offset} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        need: usize,
        len: usize,
    },

    #[error("variant index {index} out of range for {count} alternative(s)")]
    InvalidVariantIndex { index: u8, count: usize },

    #[error("invalid {what} byte {value}")]
    InvalidFlag { what: &'static str, value: u8 },

    #[error("value {value} is not a valid {enum_name}")]
    InvalidEnumValue { value: u64, enum_name: String },

    #[error("invalid UTF-16 string data")]
    InvalidUtf16,

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),

    #[error("element count exceeds limit of {0}")]
    ElementLimit(usize),

    #[error("header carries message id {found}, expected {expected} for '{name}'")]
    MessageMismatch {
        name: String,
        expected: u16,
        found: u16,
    },

    #[error("unknown message '{0}'")]
    UnknownMessage(String),

    #[error("message '{0}' has no reply")]
    NoReply(String),

    #[error("{0} unexpected trailing byte(s)")]
    TrailingBytes(usize),
}

impl From<ClassifyError> for SerializationError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Grammar(g) => Self::Grammar(g),
            ClassifyError::Unknown(name) => Self::UnknownType(name),
        }
    }
}

impl From<ClassifyError> for ParserError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Grammar(g) => Self::Grammar(g),
            ClassifyError::Unknown(name) => Self::UnknownType(name),
        }
    }
}

macro_rules! impl_path_helpers {
    ($error:ident) => {
        impl $error {
            pub(crate) fn in_field(self, name: &str, type_name: &str) -> Self {
                Self::Field {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    source: Box::new(self),
                }
            }

            pub(crate) fn in_element(self, index: usize) -> Self {
                Self::Element {
                    index,
                    source: Box::new(self),
                }
            }

            /// The innermost error, below all field and element frames.
            pub fn root_cause(&self) -> &Self {
                let mut current = self;
                loop {
                    match current {
                        Self::Field { source, .. } | Self::Element { source, .. } => {
                            current = &**source;
                        }
                        other => return other,
                    }
                }
            }

            /// Field names and `[index]` steps from the root to the failure.
            pub fn path(&self) -> Vec<String> {
                let mut steps = Vec::new();
                let mut current = self;
                loop {
                    match current {
                        Self::Field { name, source, .. } => {
                            steps.push(name.clone());
                            current = &**source;
                        }
                        Self::Element { index, source } => {
                            steps.push(format!("[{}]", index));
                            current = &**source;
                        }
                        _ => return steps,
                    }
                }
            }
        }
    };
}

impl_path_helpers!(SerializationError);
impl_path_helpers!(ParserError);
