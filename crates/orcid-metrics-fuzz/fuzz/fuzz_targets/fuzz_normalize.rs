#![no_main]

use libfuzzer_sys::fuzz_target;
use orcid_metrics::models::normalize;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
});
