// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alias resolution for native type spellings.

use std::collections::HashMap;

/// Native spellings understood without any catalog help.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("char", "int8_t"),
    ("signed char", "int8_t"),
    ("unsigned char", "uint8_t"),
    ("short", "int16_t"),
    ("unsigned short", "uint16_t"),
    ("int", "int32_t"),
    ("unsigned", "uint32_t"),
    ("unsigned int", "uint32_t"),
    ("long", "int64_t"),
    ("unsigned long", "uint64_t"),
    ("long long", "int64_t"),
    ("unsigned long long", "uint64_t"),
    ("size_t", "uint64_t"),
    ("ssize_t", "int64_t"),
    ("int8", "int8_t"),
    ("uint8", "uint8_t"),
    ("int16", "int16_t"),
    ("uint16", "uint16_t"),
    ("int32", "int32_t"),
    ("uint32", "uint32_t"),
    ("int64", "int64_t"),
    ("uint64", "uint64_t"),
    ("pid_t", "int32_t"),
    ("ProcessID", "pid_t"),
    ("CGFloat", "double"),
    ("WTF::String", "String"),
    ("AtomString", "String"),
    ("WTF::AtomString", "String"),
    ("std::monostate", "std::nullptr_t"),
];

/// Table of `alias -> target` rewrites applied until a fixed point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with the built-in native spellings.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (alias, target) in BUILTIN_ALIASES {
            table.insert(*alias, *target);
        }
        table
    }

    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(alias.into(), target.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `name` through the table until it is no longer an alias.
    ///
    /// Stops after `len()` hops so that a cyclic table cannot spin forever;
    /// [`AliasTable::find_cycle`] reports such tables at build time.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name.trim();
        for _ in 0..=self.entries.len() {
            match self.entries.get(current) {
                Some(target) => current = target.as_str(),
                None => return current,
            }
        }
        current
    }

    /// First alias that participates in a cycle, if any.
    pub fn find_cycle(&self) -> Option<&str> {
        let mut aliases: Vec<&String> = self.entries.keys().collect();
        aliases.sort();
        for start in aliases {
            let mut current = start.as_str();
            for _ in 0..=self.entries.len() {
                match self.entries.get(current) {
                    Some(target) if target == start => return Some(start.as_str()),
                    Some(target) => current = target.as_str(),
                    None => break,
                }
            }
        }
        None
    }
}
