//! Fuzz target for parsing and normalizing a raw extract.
//!
//! Malformed bytes may be rejected but must never panic, and every parsed
//! row must come out as exactly one record with a finite, non-negative count.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vahan::input::Parser;
use vahan::Normalizer;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok((table, _skipped)) = Parser::new().parse_bytes(data, "fuzz") else {
        return;
    };
    let Ok(normalizer) = Normalizer::new() else {
        return;
    };

    let normalized = normalizer.normalize_table(&table, Some(2021));
    assert_eq!(normalized.records.len(), table.row_count());
    for record in &normalized.records {
        assert!(record.registrations.is_finite() && record.registrations >= 0.0);
    }
});
