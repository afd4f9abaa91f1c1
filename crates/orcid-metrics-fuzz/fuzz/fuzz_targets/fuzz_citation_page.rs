#![no_main]

use libfuzzer_sys::fuzz_target;
use orcid_metrics::models::{CitationPage, IdType};

fuzz_target!(|data: &[u8]| {
    if let Ok(page) = serde_json::from_slice::<CitationPage>(data) {
        let _ = page.next_cursor();
        for record in &page.results {
            for id_type in IdType::ALL {
                if let Some(key) = record.key(id_type) {
                    assert!(!key.value().is_empty());
                }
            }
        }
    }
});
