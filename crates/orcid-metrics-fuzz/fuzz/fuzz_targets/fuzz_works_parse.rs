#![no_main]

use libfuzzer_sys::fuzz_target;
use orcid_metrics::models::WorksPayload;
use orcid_metrics::pipeline::extract;

fuzz_target!(|data: &[u8]| {
    // Malformed summaries must be skipped, never panic
    if let Ok(payload) = serde_json::from_slice::<WorksPayload>(data) {
        let (ids, no_ids) = extract(&payload.groups());
        assert!(ids.values().chain(no_ids.iter()).all(|&year| year > 0));
        let _ = payload.records();
    }
});
