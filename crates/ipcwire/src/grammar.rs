// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Template type grammar.
//!
//! Type names follow a C++-like spelling: `Head<Arg1, Arg2<Inner>, ...>`.
//! Arguments are split at bracket depth zero only, so nested template
//! arguments survive intact.

use thiserror::Error;

/// Errors raised while taking a template expression apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("unbalanced template brackets in '{0}'")]
    Unbalanced(String),

    #[error("'{0}' is not a template expression")]
    NotTemplate(String),

    #[error("template '{head}' expects {expected} argument(s), found {found}")]
    Arity {
        head: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid array cardinality '{0}'")]
    Cardinality(String),
}

/// A parsed `Head<args...>` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExpression {
    pub head: String,
    pub args: Vec<String>,
}

impl TemplateExpression {
    /// Parse a full template type name into head and split arguments.
    pub fn parse(name: &str) -> Result<Self, GrammarError> {
        let (head, inner) = parse_template_head(name)?;
        let args = split_template_arguments(inner)?;
        Ok(Self {
            head: head.to_string(),
            args,
        })
    }

    /// Require exactly `expected` arguments.
    pub fn expect_arity(&self, expected: usize) -> Result<(), GrammarError> {
        if self.args.len() != expected {
            return Err(GrammarError::Arity {
                head: self.head.clone(),
                expected,
                found: self.args.len(),
            });
        }
        Ok(())
    }
}

/// Split a comma-separated template argument list at bracket depth zero.
///
/// `"A<B,C>, D"` yields `["A<B,C>", "D"]`. Each segment is trimmed.
pub fn split_template_arguments(expr: &str) -> Result<Vec<String>, GrammarError> {
    let mut args = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, c) in expr.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| GrammarError::Unbalanced(expr.to_string()))?;
            }
            ',' if depth == 0 => {
                args.push(expr[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(GrammarError::Unbalanced(expr.to_string()));
    }

    args.push(expr[start..].trim().to_string());
    Ok(args)
}

/// Split `Head<inner>` into `("Head", "inner")`.
///
/// The name must end with `>`; the head runs up to the first `<`.
pub fn parse_template_head(name: &str) -> Result<(&str, &str), GrammarError> {
    let name = name.trim();
    let body = name
        .strip_suffix('>')
        .ok_or_else(|| GrammarError::NotTemplate(name.to_string()))?;
    let open = body
        .find('<')
        .ok_or_else(|| GrammarError::Unbalanced(name.to_string()))?;
    Ok((body[..open].trim(), &body[open + 1..]))
}

/// Whether a type name is spelled as a template expression.
pub fn is_template(name: &str) -> bool {
    name.trim_end().ends_with('>')
}
