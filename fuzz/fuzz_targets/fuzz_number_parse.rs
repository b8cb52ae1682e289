#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine, panics are bugs.
        if let Ok(number) = docket::DocumentNumber::parse(s) {
            let reparsed = docket::DocumentNumber::parse(&number.to_string()).unwrap();
            assert_eq!(reparsed, number);
        }
        let _ = docket::trailing_sequence(s);
    }
});
