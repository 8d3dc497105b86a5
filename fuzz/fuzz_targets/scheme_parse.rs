//! Fuzz target for scheme text and the context engine
//!
//! # Invariants
//!
//! - Parsing and context construction never panic
//! - Canonical text of a parsed scheme parses back to the same scheme
//! - A context built from a scheme reports that scheme back

#![no_main]

use libfuzzer_sys::fuzz_target;
use qkd_crypto::{engine, Scheme};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(scheme) = Scheme::parse(text) else {
        return;
    };

    let canonical = scheme.to_string();
    let reparsed = Scheme::parse(&canonical).expect("canonical text must parse");
    assert_eq!(reparsed, scheme);

    if let Ok(context) = engine::create(&scheme) {
        assert_eq!(context.scheme(), scheme);
        let _ = context.fresh_clone().finalize(&qkd_crypto::Key::null());
    }
});
