// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use ipcwire::{ArgumentDescriptor, Catalog, Codec, CodecConfig, EnumDescriptor};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        Catalog::builder()
            .structure(
                "WebCore::Cookie",
                vec![
                    ArgumentDescriptor::new("name", "String"),
                    ArgumentDescriptor::new("expires", "std::optional<double>"),
                    ArgumentDescriptor::new("sameSite", "WebCore::SameSite"),
                    ArgumentDescriptor::new("owner", "Markable<WebCore::PageIdentifier>"),
                ],
            )
            .enumeration("WebCore::SameSite", EnumDescriptor::new(1, [0, 1, 2]))
            .enumeration("WebCore::Flags", EnumDescriptor::option_set(4))
            .identifier("WebCore::PageIdentifier")
            .message(
                "Fuzz_Everything",
                1,
                vec![
                    ArgumentDescriptor::new("cookies", "Vector<WebCore::Cookie>"),
                    ArgumentDescriptor::new("set", "HashSet<String>"),
                    ArgumentDescriptor::new("map", "HashMap<uint16_t, Vector<std::nullptr_t>>"),
                    ArgumentDescriptor::new("pair", "std::pair<bool, int64_t>"),
                    ArgumentDescriptor::new("choice", "std::variant<float, String, std::nullptr_t>"),
                    ArgumentDescriptor::new("flags", "OptionSet<WebCore::Flags>"),
                    ArgumentDescriptor::new("fixed", "std::array<IPC::ConnectionHandle, 2>"),
                ],
            )
            .build()
            .expect("fuzz catalog")
    })
}

fuzz_target!(|data: &[u8]| {
    let catalog = catalog();
    let codec = Codec::with_config(catalog, CodecConfig::default().with_max_elements(1 << 16));
    let arguments = &catalog
        .message("Fuzz_Everything")
        .expect("fuzz message")
        .arguments;

    // Bare argument lists at offset 0
    if let Ok((plain, _)) = codec.decode_arguments(data, 0, arguments) {
        // Non-finite floats project to null and cannot be re-encoded;
        // everything else must survive a second trip unchanged.
        if let Ok(bytes) = codec.encode_arguments(arguments, &plain) {
            let (again, _) = codec
                .decode_arguments(&bytes, 0, arguments)
                .expect("decode re-encoded arguments");
            assert_eq!(plain, again);
        }
    }

    // Framed messages
    let _ = codec.decode_message("Fuzz_Everything", data);
});
