//! Fuzz target for accession parsing.
//!
//! Parsing must never panic, and anything it accepts must split into a
//! prefix and digits that re-join to the input.

#![no_main]

use biosamples::Accession;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    match Accession::parse(&input) {
        Ok(accession) => {
            let (prefix, digits) = accession.split();
            assert!(!prefix.is_empty());
            assert!(!digits.is_empty());
            assert_eq!(format!("{}{}", prefix, digits), input);
            let _ = accession.number();
        }
        Err(_) => assert!(!Accession::is_valid(&input)),
    }
});
