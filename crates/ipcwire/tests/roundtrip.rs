// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::too_many_lines)] // Test catalogs

//! Value -> bytes -> value round trips through the public codec API.

use ipcwire::{
    ArgumentDescriptor, Catalog, Codec, CodecConfig, EnumDescriptor, ParserError,
    SerializationError,
};
use serde_json::{json, Value};

fn catalog() -> Catalog {
    Catalog::builder()
        .structure(
            "WebCore::IntPoint",
            vec![
                ArgumentDescriptor::new("x", "int"),
                ArgumentDescriptor::new("y", "int"),
            ],
        )
        .structure(
            "WebCore::IntRect",
            vec![
                ArgumentDescriptor::new("location", "WebCore::IntPoint"),
                ArgumentDescriptor::new("size", "WebCore::IntSize"),
            ],
        )
        .structure(
            "WebCore::IntSize",
            vec![
                ArgumentDescriptor::new("width", "int"),
                ArgumentDescriptor::new("height", "int"),
            ],
        )
        .structure(
            "WebKit::NavigationActionData",
            vec![
                ArgumentDescriptor::new("navigationType", "WebCore::NavigationType"),
                ArgumentDescriptor::new("modifiers", "OptionSet<WebKit::Modifier>"),
                ArgumentDescriptor::new("frame", "WebCore::FrameIdentifier"),
                ArgumentDescriptor::new("openerFrame", "Markable<WebCore::FrameIdentifier>"),
                ArgumentDescriptor::new("downloadAttribute", "WTF::String"),
                ArgumentDescriptor::new("clickLocation", "WebCore::IntPoint").optional(),
            ],
        )
        .structure("WebCore::Empty", vec![])
        .enumeration(
            "WebCore::NavigationType",
            EnumDescriptor::new(1, [0, 1, 2, 3, 4, 5]),
        )
        .enumeration("WebKit::Modifier", EnumDescriptor::new(1, [1, 2, 4, 8]))
        .enumeration("WebCore::ScrollbarMode", EnumDescriptor::new(4, [0, 1, 2]))
        .identifier("WebCore::FrameIdentifier")
        .identifier("WebCore::PageIdentifier")
        .alias("WebCore::LayoutUnit", "int")
        .message_with_reply(
            "WebPage_DecidePolicy",
            42,
            vec![
                ArgumentDescriptor::new("pageID", "WebCore::PageIdentifier"),
                ArgumentDescriptor::new("action", "WebKit::NavigationActionData"),
                ArgumentDescriptor::new("headers", "HashMap<String, String>"),
            ],
            vec![
                ArgumentDescriptor::new("policy", "uint8_t"),
                ArgumentDescriptor::new("reason", "std::optional<String>"),
            ],
        )
        .build()
        .unwrap()
}

fn round_trip(type_name: &str, value: Value) -> Value {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let arguments = vec![ArgumentDescriptor::new("value", type_name)];
    let values = json!({ "value": value });

    let bytes = codec
        .encode_arguments(&arguments, &values)
        .unwrap_or_else(|e| panic!("encode {}: {}", type_name, e));
    let (plain, end) = codec
        .decode_arguments(&bytes, 0, &arguments)
        .unwrap_or_else(|e| panic!("decode {}: {}", type_name, e));
    assert_eq!(end, bytes.len(), "{} left unread bytes", type_name);
    plain["value"].clone()
}

fn assert_round_trip(type_name: &str, value: Value) {
    assert_eq!(round_trip(type_name, value.clone()), value, "{}", type_name);
}

#[test]
fn test_primitives() {
    assert_round_trip("bool", json!(true));
    assert_round_trip("int8_t", json!(-128));
    assert_round_trip("uint8_t", json!(255));
    assert_round_trip("int16_t", json!(-32768));
    assert_round_trip("uint16_t", json!(65535));
    assert_round_trip("int32_t", json!(i32::MIN));
    assert_round_trip("uint32_t", json!(u32::MAX));
    assert_round_trip("int64_t", json!(i64::MIN));
    assert_round_trip("uint64_t", json!(u64::MAX));
    assert_round_trip("float", json!(1.5));
    assert_round_trip("double", json!(-0.1));
    assert_round_trip("IPC::ConnectionHandle", json!(3));
    assert_round_trip("std::nullptr_t", Value::Null);
}

#[test]
fn test_native_spellings() {
    assert_round_trip("unsigned", json!(7));
    assert_round_trip("long long", json!(-7));
    assert_round_trip("size_t", json!(1u64 << 40));
    assert_round_trip("ProcessID", json!(4242));
    assert_round_trip("CGFloat", json!(2.5));
    assert_round_trip("WebCore::LayoutUnit", json!(-3));
}

#[test]
fn test_boolean_coercion_normalizes() {
    assert_eq!(round_trip("bool", json!(0)), json!(false));
    assert_eq!(round_trip("bool", json!(1)), json!(true));
}

#[test]
fn test_strings() {
    assert_round_trip("String", json!(""));
    assert_round_trip("String", json!("plain ascii"));
    assert_round_trip("String", json!("latin-1 caf\u{e9}"));
    assert_round_trip("String", json!("wide \u{4e2d}\u{6587} and emoji \u{1F600}"));
    assert_round_trip("String", Value::Null);
    assert_round_trip("AtomString", json!("atom"));
}

#[test]
fn test_optionals() {
    assert_round_trip("Optional<uint32_t>", json!({}));
    assert_round_trip("Optional<uint32_t>", json!({ "optionalValue": 12 }));
    assert_round_trip("RefPtr<WebCore::IntPoint>", json!({ "optionalValue": { "x": 1, "y": 2 } }));
    assert_round_trip("std::unique_ptr<String>", json!({}));
    assert_round_trip("Markable<WebCore::FrameIdentifier>", json!({ "optionalValue": 9 }));
    assert_round_trip("Markable<WebCore::FrameIdentifier>", json!({}));
    assert_round_trip(
        "std::optional<std::optional<bool>>",
        json!({ "optionalValue": {} }),
    );
}

#[test]
fn test_sequences() {
    assert_round_trip("Vector<uint8_t>", json!([1, 2, 3]));
    assert_round_trip("Vector<uint8_t>", json!([]));
    assert_round_trip("std::span<double>", json!([0.5, 1.5]));
    assert_round_trip("Vector<Vector<String>>", json!([["a"], [], ["b", "c"]]));
    assert_round_trip("HashSet<uint64_t>", json!([10, 20]));
    assert_round_trip("ListHashSet<String>", json!(["x"]));
    assert_round_trip("std::array<float, 3>", json!([1.0, 2.0, 3.0]));
    assert_round_trip("std::pair<String, int64_t>", json!(["k", -1]));
    assert_round_trip(
        "HashMap<String, Vector<int>>",
        json!([{ "key": "a", "value": [1, 2] }, { "key": "b", "value": [] }]),
    );
    assert_round_trip("std::map<uint16_t, bool>", json!([]));
}

#[test]
fn test_variants() {
    assert_round_trip(
        "std::variant<int, String, WebCore::IntPoint>",
        json!({ "variantType": "WebCore::IntPoint", "variant": { "x": 4, "y": 5 } }),
    );
    assert_round_trip(
        "Variant<std::nullptr_t, double>",
        json!({ "variantType": "std::nullptr_t", "variant": null }),
    );
}

#[test]
fn test_transparent_wrappers() {
    assert_round_trip("Ref<WebCore::IntPoint>", json!({ "x": 0, "y": 0 }));
    assert_round_trip("UniqueRef<Vector<int>>", json!([1]));
}

#[test]
fn test_nested_structs() {
    assert_round_trip(
        "WebCore::IntRect",
        json!({ "location": { "x": -1, "y": 2 }, "size": { "width": 3, "height": 4 } }),
    );
}

#[test]
fn test_enums_and_option_sets() {
    assert_round_trip("WebCore::ScrollbarMode", json!(2));
    assert_round_trip("OptionSet<WebKit::Modifier>", json!(0b1011));
}

#[test]
fn test_struct_keys_keep_schema_order() {
    let value = round_trip("WebCore::IntPoint", json!({ "y": 2, "x": 1 }));
    assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"x":1,"y":2}"#);
}

#[test]
fn test_full_message_round_trip() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let values = json!({
        "pageID": 77,
        "action": {
            "navigationType": 3,
            "modifiers": 5,
            "frame": 1001,
            "openerFrame": {},
            "downloadAttribute": null,
            "clickLocation": { "optionalValue": { "x": 10, "y": 20 } }
        },
        "headers": [{ "key": "Accept", "value": "text/html" }]
    });

    let bytes = codec
        .encode_message("WebPage_DecidePolicy", 5, &values)
        .unwrap();
    let decoded = codec.decode_message("WebPage_DecidePolicy", &bytes).unwrap();
    assert_eq!(decoded.header.message_id, 42);
    assert_eq!(decoded.header.destination_id, 5);
    assert_eq!(decoded.plain, values);
    assert!(decoded.trailer);
    assert!(ipcwire::has_trailer(&bytes, decoded.consumed));

    let reply = codec
        .encode_reply("WebPage_DecidePolicy", 5, &json!({ "policy": 1, "reason": {} }))
        .unwrap();
    let decoded = codec.decode_reply("WebPage_DecidePolicy", &reply).unwrap();
    assert_eq!(decoded.plain, json!({ "policy": 1, "reason": {} }));
}

#[test]
fn test_enum_override_replaces_type() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let arguments =
        vec![ArgumentDescriptor::new("mode", "uint32_t").with_enum_override("WebCore::ScrollbarMode")];

    assert_eq!(codec.encode_arguments(&arguments, &json!({ "mode": 1 })).unwrap().len(), 4);
    let err = codec
        .encode_arguments(&arguments, &json!({ "mode": 9 }))
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        SerializationError::InvalidEnumValue { value: 9, .. }
    ));
}

#[test]
fn test_error_paths_name_every_frame() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let arguments = vec![ArgumentDescriptor::new("rects", "Vector<WebCore::IntRect>")];
    let values = json!({ "rects": [
        { "location": { "x": 0, "y": 0 }, "size": { "width": 1, "height": 1 } },
        { "location": { "x": 0, "y": 0 }, "size": { "width": 1, "height": "tall" } }
    ]});

    let err = codec.encode_arguments(&arguments, &values).unwrap_err();
    assert_eq!(err.path(), vec!["rects", "[1]", "size", "height"]);
    assert_eq!(
        err.to_string(),
        "field 'rects' of type 'Vector<WebCore::IntRect>': element 1: \
         field 'size' of type 'WebCore::IntSize': field 'height' of type 'int': \
         expected integer, found string \"tall\""
    );
}

#[test]
fn test_concrete_scenarios() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);

    // uint8_t 300 is out of range.
    let arguments = vec![ArgumentDescriptor::new("v", "uint8_t")];
    let err = codec
        .encode_arguments(&arguments, &json!({ "v": 300 }))
        .unwrap_err();
    assert!(err.to_string().contains("out-of-bounds"));

    // Absent optional is a single zero byte and parses back to {}.
    let arguments = vec![ArgumentDescriptor::new("v", "Optional<uint32_t>")];
    let nodes = codec
        .serialize_arguments(&arguments, &json!({ "v": {} }))
        .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].as_scalar(), Some(&ipcwire::Scalar::Bool(false)));
    let (plain, _) = codec.decode_arguments(&[0x00], 0, &arguments).unwrap();
    assert_eq!(plain, json!({ "v": {} }));

    // Variant index past the alternatives.
    let arguments = vec![ArgumentDescriptor::new("v", "Variant<int, bool>")];
    let err = codec.decode_arguments(&[2], 0, &arguments).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ParserError::InvalidVariantIndex { index: 2, count: 2 }
    ));
}

#[test]
fn test_zero_sized_elements() {
    assert_round_trip("std::array<std::nullptr_t, 2>", json!([null, null]));
    assert_round_trip("Vector<WebCore::Empty>", json!([{}, {}, {}]));
    assert_round_trip("Vector<std::nullptr_t>", json!(vec![Value::Null; 9]));
    assert_round_trip("Vector<std::monostate>", json!(vec![Value::Null; 4096]));
    assert_round_trip(
        "HashMap<uint8_t, Vector<std::nullptr_t>>",
        json!([{ "key": 1, "value": [null, null, null, null, null, null, null, null, null] }]),
    );
    assert_eq!(
        round_trip(
            "std::variant<int, std::nullptr_t>",
            json!({ "variantType": "std::nullptr_t" })
        ),
        json!({ "variantType": "std::nullptr_t", "variant": null })
    );
}

#[test]
fn test_bracketed_struct_name() {
    let catalog = Catalog::builder()
        .structure(
            "WebCore::RectEdges<bool>",
            vec![
                ArgumentDescriptor::new("top", "bool"),
                ArgumentDescriptor::new("right", "bool"),
                ArgumentDescriptor::new("bottom", "bool"),
                ArgumentDescriptor::new("left", "bool"),
            ],
        )
        .build()
        .unwrap();
    let codec = Codec::new(&catalog);
    let arguments = vec![ArgumentDescriptor::new("edges", "WebCore::RectEdges<bool>")];
    let values = json!({ "edges": { "top": true, "right": false, "bottom": true, "left": false } });

    let bytes = codec.encode_arguments(&arguments, &values).unwrap();
    assert_eq!(bytes, vec![1, 0, 1, 0]);
    let (plain, _) = codec.decode_arguments(&bytes, 0, &arguments).unwrap();
    assert_eq!(plain, values);
}

#[test]
fn test_depth_ceiling_is_configurable() {
    let catalog = catalog();
    let deep_type = (0..20).fold("int".to_string(), |t, _| format!("Vector<{}>", t));
    let deep_value = (0..20).fold(json!(1), |v, _| json!([v]));
    let arguments = vec![ArgumentDescriptor::new("v", deep_type.as_str())];
    let values = json!({ "v": deep_value });

    let bytes = Codec::new(&catalog)
        .encode_arguments(&arguments, &values)
        .unwrap();

    let shallow = Codec::with_config(&catalog, CodecConfig::default().with_max_depth(8));
    assert!(matches!(
        shallow.encode_arguments(&arguments, &values).unwrap_err().root_cause(),
        SerializationError::DepthExceeded(8)
    ));
    assert!(matches!(
        shallow.decode_arguments(&bytes, 0, &arguments).unwrap_err().root_cause(),
        ParserError::DepthExceeded(8)
    ));
}
