// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

//! Hostile input: truncated, mutated and random buffers must fail cleanly.

use ipcwire::{
    ArgumentDescriptor, Catalog, Codec, CodecConfig, EnumDescriptor, ParserError,
};
use serde_json::json;

fn catalog() -> Catalog {
    Catalog::builder()
        .structure(
            "WebCore::Cookie",
            vec![
                ArgumentDescriptor::new("name", "String"),
                ArgumentDescriptor::new("value", "String"),
                ArgumentDescriptor::new("expires", "std::optional<double>"),
                ArgumentDescriptor::new("secure", "bool"),
            ],
        )
        .enumeration("WebCore::SameSite", EnumDescriptor::new(1, [0, 1, 2]))
        .identifier("WebCore::PageIdentifier")
        .message(
            "NetworkProcess_SetCookies",
            90,
            vec![
                ArgumentDescriptor::new("page", "WebCore::PageIdentifier"),
                ArgumentDescriptor::new("cookies", "Vector<WebCore::Cookie>"),
                ArgumentDescriptor::new("policy", "WebCore::SameSite"),
                ArgumentDescriptor::new("origins", "HashMap<String, Vector<uint16_t>>"),
                ArgumentDescriptor::new("extra", "std::variant<int64_t, String>"),
                ArgumentDescriptor::new("tail", "std::array<uint32_t, 2>"),
            ],
        )
        .build()
        .unwrap()
}

fn arguments(catalog: &Catalog) -> &[ArgumentDescriptor] {
    &catalog.message("NetworkProcess_SetCookies").unwrap().arguments
}

fn sample_bytes(codec: &Codec<'_>) -> Vec<u8> {
    let values = json!({
        "page": 12,
        "cookies": [
            { "name": "sid", "value": "abc", "expires": { "optionalValue": 1.5e9 }, "secure": true },
            { "name": "l\u{e4}ng", "value": "\u{263a}", "expires": {}, "secure": false }
        ],
        "policy": 2,
        "origins": [{ "key": "https://a.example", "value": [443, 8443] }],
        "extra": { "variantType": "String", "variant": "x" },
        "tail": [1, 2]
    });
    codec
        .encode_arguments(arguments(codec.catalog()), &values)
        .unwrap()
}

#[test]
fn test_every_truncation_fails() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let bytes = sample_bytes(&codec);

    let (_, end) = codec
        .decode_arguments(&bytes, 0, arguments(&catalog))
        .unwrap();
    assert_eq!(end, bytes.len());

    for len in 0..bytes.len() {
        let result = codec.decode_arguments(&bytes[..len], 0, arguments(&catalog));
        let err = match result {
            Ok(_) => panic!("prefix of {} bytes decoded", len),
            Err(e) => e,
        };
        assert!(
            matches!(err.root_cause(), ParserError::OutOfBounds { .. }),
            "prefix {}: {}",
            len,
            err
        );
    }
}

#[test]
fn test_every_truncated_message_fails() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let values = codec
        .decode_arguments(&sample_bytes(&codec), 0, arguments(&catalog))
        .unwrap()
        .0;
    let message = codec
        .encode_message("NetworkProcess_SetCookies", 1, &values)
        .unwrap();
    let decoded = codec
        .decode_message("NetworkProcess_SetCookies", &message)
        .unwrap();

    for len in 0..decoded.consumed {
        assert!(
            codec
                .decode_message("NetworkProcess_SetCookies", &message[..len])
                .is_err(),
            "message prefix {} decoded",
            len
        );
    }
}

#[test]
fn test_random_mutations_never_panic() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let original = sample_bytes(&codec);
    let mut rng = fastrand::Rng::with_seed(0x1BAD_5EED);

    for _ in 0..2000 {
        let mut bytes = original.clone();
        for _ in 0..rng.usize(1..4) {
            let index = rng.usize(..bytes.len());
            bytes[index] = rng.u8(..);
        }
        let _ = codec.decode_arguments(&bytes, 0, arguments(&catalog));
    }
}

#[test]
fn test_random_buffers_never_panic() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..2000 {
        let len = rng.usize(0..256);
        let bytes: Vec<u8> = std::iter::repeat_with(|| rng.u8(..)).take(len).collect();
        let _ = codec.decode_arguments(&bytes, 0, arguments(&catalog));
        let _ = codec.decode_message("NetworkProcess_SetCookies", &bytes);
    }
}

#[test]
fn test_huge_counts_do_not_allocate() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let arguments = vec![ArgumentDescriptor::new("v", "Vector<Vector<uint8_t>>")];

    let mut bytes = u64::MAX.to_le_bytes().to_vec();
    bytes.extend(u64::MAX.to_le_bytes());
    let err = codec.decode_arguments(&bytes, 0, &arguments).unwrap_err();
    assert!(matches!(err.root_cause(), ParserError::OutOfBounds { .. }));
    assert_eq!(err.path(), vec!["v", "[0]", "[0]"]);
}

#[test]
fn test_nested_zero_sized_counts_are_bounded() {
    let catalog = catalog();
    let arguments = vec![ArgumentDescriptor::new(
        "map",
        "HashMap<uint16_t, Vector<std::nullptr_t>>",
    )];

    // 250 entries of 16 bytes, each claiming a million zero-sized elements.
    let entries = 250u32;
    let mut bytes = entries.to_le_bytes().to_vec();
    for key in 0..entries as u16 {
        bytes.extend(key.to_le_bytes());
        bytes.resize(bytes.len().next_multiple_of(8), 0);
        bytes.extend(1_000_000u64.to_le_bytes());
    }

    let strict = Codec::with_config(&catalog, CodecConfig::default().with_max_elements(10_000));
    let err = strict.decode_arguments(&bytes, 0, &arguments).unwrap_err();
    assert!(matches!(err.root_cause(), ParserError::ElementLimit(10_000)));
    assert_eq!(err.path()[0], "map");
}

#[test]
fn test_offset_past_end() {
    let catalog = catalog();
    let codec = Codec::new(&catalog);
    let arguments = vec![ArgumentDescriptor::new("v", "uint8_t")];
    assert!(matches!(
        codec.decode_arguments(&[1, 2], usize::MAX, &arguments),
        Err(ParserError::Field { .. })
    ));
}
