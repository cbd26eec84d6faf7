// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration.
//!
//! ```toml
//! max_depth = 32
//! max_elements = 65536
//! append_trailer = true
//! reject_trailing_bytes = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default ceiling on struct/container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default ceiling on container elements materialized by one decode call.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 20;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Knobs shared by every encode/decode call of a codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum nesting depth of types before the call fails.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of container elements one decode call may produce.
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,

    /// Append the diagnostic trailer to encoded messages.
    #[serde(default = "default_true")]
    pub append_trailer: bool,

    /// Fail message decoding when bytes other than the trailer follow the
    /// arguments.
    #[serde(default)]
    pub reject_trailing_bytes: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_elements() -> usize {
    DEFAULT_MAX_ELEMENTS
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_elements: DEFAULT_MAX_ELEMENTS,
            append_trailer: true,
            reject_trailing_bytes: false,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be > 0".into()));
        }
        if self.max_elements == 0 {
            return Err(ConfigError::Invalid("max_elements must be > 0".into()));
        }
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn with_trailer(mut self, enabled: bool) -> Self {
        self.append_trailer = enabled;
        self
    }

    pub fn with_reject_trailing_bytes(mut self, enabled: bool) -> Self {
        self.reject_trailing_bytes = enabled;
        self
    }
}
