//! Fuzz target for the vehicle-type classifier.
//!
//! Any UTF-8 input must classify without panicking, identically every time.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vahan::classify;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        assert_eq!(classify(text), classify(text));
    }
});
