// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use ipcwire::{classify, Catalog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary catalogs must load or fail cleanly
    if let Ok(catalog) = Catalog::from_json_str(text) {
        for (_, schema) in catalog.messages() {
            for argument in &schema.arguments {
                let _ = classify(&catalog, &argument.effective_type());
            }
        }
    }

    // Arbitrary type expressions must classify or fail cleanly
    let _ = classify(&Catalog::default(), text);
});
