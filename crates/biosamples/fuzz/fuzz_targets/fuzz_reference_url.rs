//! Fuzz target for external-reference URL normalisation.
//!
//! Arbitrary input must either normalise or fail with an error, never panic.

#![no_main]

use biosamples::canonical::normalize_reference_url;
use biosamples::model::ExternalReference;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(normalized) = normalize_reference_url(input) {
        let _ = normalize_reference_url(&normalized.url);
    }

    if let Ok(reference) = ExternalReference::new(input) {
        let _ = reference.nickname();
        let _ = reference.data_id();
    }
});
