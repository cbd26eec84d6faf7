// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ipcwire CLI
//!
//! Encode and decode IPC messages against a type catalog.
//!
//! # Usage
//!
//! ```bash
//! # Encode a message; prints hex
//! ipcwire --catalog messages.json encode WebPage_SetZoom '{"factor": 1.5}'
//!
//! # Encode from a values file, as a reply, to destination 7
//! ipcwire --catalog messages.yaml encode WebPage_Ping @reply.json --reply --destination 7
//!
//! # Decode hex back to JSON (add --typed for type-tagged output)
//! ipcwire --catalog messages.json decode WebPage_SetZoom 0000070000000000...
//!
//! # Validate a catalog
//! ipcwire --catalog messages.json check
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ipcwire::{
    classify, ArgumentDescriptor, Catalog, Codec, CodecConfig, ParsedNode, ParsedValue,
    SerializationError, TypeCategory, TypeShape,
};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// ipcwire message codec
#[derive(Parser, Debug)]
#[command(name = "ipcwire")]
#[command(about = "Encode, decode and check IPC messages against a type catalog")]
#[command(version)]
struct Args {
    /// Catalog file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Codec configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode argument values into a message; prints hex
    Encode {
        /// Message name
        message: String,

        /// Argument values as a JSON record, or @path to read them from a file
        values: String,

        /// Destination id written to the header
        #[arg(short, long, default_value_t = 0)]
        destination: u64,

        /// Encode the reply argument list
        #[arg(short, long)]
        reply: bool,
    },

    /// Decode a hex-encoded message to JSON
    Decode {
        /// Message name
        message: String,

        /// Message bytes as hex (whitespace and a 0x prefix are ignored)
        hex: String,

        /// Decode the reply argument list
        #[arg(short, long)]
        reply: bool,

        /// Print the type-tagged tree instead of plain values
        #[arg(short, long)]
        typed: bool,
    },

    /// Load the catalog and verify every type it references
    Check,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(catalog_path) = args.catalog.as_deref() else {
        bail!("--catalog <file> is required");
    };
    let catalog = load_catalog(catalog_path)?;
    let config = match args.config.as_deref() {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    let codec = Codec::with_config(&catalog, config);

    match args.command {
        Commands::Encode {
            message,
            values,
            destination,
            reply,
        } => cmd_encode(&codec, &message, &values, destination, reply),
        Commands::Decode {
            message,
            hex,
            reply,
            typed,
        } => cmd_decode(&codec, &message, &hex, reply, typed),
        Commands::Check => cmd_check(&catalog),
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = Catalog::from_file(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    tracing::info!(
        "Loaded catalog {} ({} messages)",
        path.display(),
        catalog.message_count()
    );
    Ok(catalog)
}

fn cmd_encode(
    codec: &Codec<'_>,
    message: &str,
    values: &str,
    destination: u64,
    reply: bool,
) -> Result<()> {
    let text = match values.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read values file {}", path))?,
        None => values.to_string(),
    };
    let values: Value = serde_json::from_str(&text).context("Argument values are not valid JSON")?;

    let bytes = if reply {
        codec.encode_reply(message, destination, &values)
    } else {
        codec.encode_message(message, destination, &values)
    }
    .with_context(|| format!("Failed to encode '{}'", message))?;

    println!("{}", to_hex(&bytes));
    Ok(())
}

fn cmd_decode(codec: &Codec<'_>, message: &str, hex: &str, reply: bool, typed: bool) -> Result<()> {
    let bytes = from_hex(hex)?;
    let decoded = if reply {
        codec.decode_reply(message, &bytes)
    } else {
        codec.decode_message(message, &bytes)
    }
    .with_context(|| format!("Failed to decode '{}'", message))?;

    tracing::info!(
        "Header: flags={:#04x} id={} destination={} ({} of {} bytes, trailer={})",
        decoded.header.flags,
        decoded.header.message_id,
        decoded.header.destination_id,
        decoded.consumed,
        bytes.len(),
        decoded.trailer
    );

    let output = if typed {
        typed_json(&decoded.arguments)
    } else {
        decoded.plain
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_check(catalog: &Catalog) -> Result<()> {
    let mut errors = Vec::new();

    for (name, schema) in catalog.messages() {
        let replies = schema.reply_arguments.as_deref().unwrap_or_default();
        for descriptor in schema.arguments.iter().chain(replies) {
            check_descriptor(catalog, name, descriptor, &mut errors);
        }
    }

    println!("Messages:    {}", catalog.message_count());
    println!("Structs:     {}", catalog.struct_count());
    println!("Enums:       {}", catalog.enum_count());
    println!("Identifiers: {}", catalog.identifier_count());

    if errors.is_empty() {
        println!("[OK] All referenced types resolve");
        return Ok(());
    }
    for error in &errors {
        eprintln!("[ERROR] {}", error);
    }
    bail!("{} unresolved type reference(s)", errors.len())
}

fn check_descriptor(
    catalog: &Catalog,
    owner: &str,
    descriptor: &ArgumentDescriptor,
    errors: &mut Vec<String>,
) {
    let mut pending = vec![descriptor.effective_type()];
    let mut seen = std::collections::HashSet::new();

    while let Some(type_name) = pending.pop() {
        if !seen.insert(type_name.clone()) {
            continue;
        }
        let shape = match classify(catalog, &type_name) {
            Ok(shape) => shape,
            Err(e) => {
                errors.push(format!(
                    "{}.{}: type '{}': {}",
                    owner,
                    descriptor.name,
                    type_name,
                    SerializationError::from(e)
                ));
                continue;
            }
        };
        match shape {
            TypeShape::Optional(inner)
            | TypeShape::Markable(inner)
            | TypeShape::Vector(inner)
            | TypeShape::HashSet(inner)
            | TypeShape::OptionSet(inner) => pending.push(inner),
            TypeShape::FixedArray { element, .. } => pending.push(element),
            TypeShape::HashMap { key, value } => pending.extend([key, value]),
            TypeShape::Pair(first, second) => pending.extend([first, second]),
            TypeShape::Variant(alternatives) => pending.extend(alternatives),
            TypeShape::Struct(name) => {
                let fields = catalog.struct_fields(&name).unwrap_or_default();
                pending.extend(fields.iter().map(ArgumentDescriptor::effective_type));
            }
            TypeShape::Primitive(_) | TypeShape::Identifier(_) | TypeShape::Enum(_) => {}
        }
    }
}

fn typed_json(node: &ParsedNode) -> Value {
    let category = match node.category {
        TypeCategory::Primitive => "primitive",
        TypeCategory::Enum => "enum",
        TypeCategory::Identifier => "identifier",
        TypeCategory::Composite => "composite",
    };
    let value = match &node.parsed_value {
        ParsedValue::Scalar(value) => value.clone(),
        ParsedValue::Record(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, child)| (name.clone(), typed_json(child)))
                .collect::<Map<String, Value>>(),
        ),
        ParsedValue::List(elements) => Value::Array(elements.iter().map(typed_json).collect()),
    };
    json!({ "type": node.parsed_type, "category": category, "value": value })
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    if digits.len() % 2 != 0 {
        bail!("Hex input has an odd number of digits ({})", digits.len());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits
                .get(i..i + 2)
                .with_context(|| format!("Non-ASCII hex input at offset {}", i))?;
            u8::from_str_radix(pair, 16)
                .with_context(|| format!("Invalid hex byte '{}' at offset {}", pair, i / 2))
        })
        .collect()
}
