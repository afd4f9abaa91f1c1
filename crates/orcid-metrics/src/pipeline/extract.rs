//! Identifier extraction from registry work groups.

use crate::models::{IdentifierYearMap, NoIdentifierYears, WorkGroup, WorkRecord};

/// Split a researcher's works into identified and unidentified years.
///
/// Works without a positive publication year contribute to neither side.
/// For the rest, the first recognized external id decides the key; a later
/// work with the same key overwrites the earlier year.
#[must_use]
pub fn extract(groups: &[WorkGroup]) -> (IdentifierYearMap, NoIdentifierYears) {
    let mut ids = IdentifierYearMap::new();
    let mut no_ids = NoIdentifierYears::new();

    for record in groups.iter().flat_map(|g| g.records()) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed work summary");
                continue;
            }
        };
        insert(&mut ids, &mut no_ids, &record);
    }

    tracing::debug!(identified = ids.len(), unidentified = no_ids.len(), "Identifiers extracted");
    (ids, no_ids)
}

fn insert(ids: &mut IdentifierYearMap, no_ids: &mut NoIdentifierYears, record: &WorkRecord) {
    let Some(year) = record.publication_year.filter(|y| *y > 0) else {
        return;
    };
    match record.primary_identifier() {
        Some(key) => {
            ids.insert(key, year);
        }
        None => no_ids.push(year),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{IdentifierKey, WorksPayload};

    fn payload(value: serde_json::Value) -> WorksPayload {
        serde_json::from_value(value).unwrap()
    }

    fn summary(year: serde_json::Value, ids: serde_json::Value) -> serde_json::Value {
        json!({
            "title": {"title": {"value": "A work"}},
            "publication-date": {"year": {"value": year}},
            "external-ids": {"external-id": ids}
        })
    }

    #[test]
    fn test_first_recognized_id_wins() {
        let p = payload(json!({"group": [{"work-summary": [summary(
            json!("2020"),
            json!([
                {"external-id-type": "isbn", "external-id-value": "978-3"},
                {"external-id-type": "pmid", "external-id-value": "123"},
                {"external-id-type": "doi", "external-id-value": "10.1/A"}
            ]),
        )]}]}));

        let (ids, no_ids) = extract(&p.groups());
        assert!(no_ids.is_empty());
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[&IdentifierKey::parse("pmid:123").unwrap()], 2020);
    }

    #[test]
    fn test_missing_or_bad_year_skips_work() {
        let p = payload(json!({"group": [{"work-summary": [
            summary(json!(null), json!([{"external-id-type": "doi", "external-id-value": "10.1/a"}])),
            summary(json!("n/a"), json!([])),
            summary(json!("0"), json!([])),
            summary(json!(2019), json!([])),
        ]}]}));

        let (ids, no_ids) = extract(&p.groups());
        assert!(ids.is_empty());
        assert_eq!(no_ids, vec![2019]);
    }

    #[test]
    fn test_last_write_wins() {
        let doi = json!([{"external-id-type": "doi", "external-id-value": "https://doi.org/10.1/A"}]);
        let doi_bare = json!([{"external-id-type": "DOI", "external-id-value": "10.1/a"}]);
        let p = payload(json!({"group": [
            {"work-summary": [summary(json!("2018"), doi)]},
            {"work-summary": [summary(json!("2021"), doi_bare)]}
        ]}));

        let (ids, _) = extract(&p.groups());
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[&IdentifierKey::parse("doi:10.1/a").unwrap()], 2021);
    }

    #[test]
    fn test_malformed_summary_skipped() {
        let p = payload(json!({"group": [{"work-summary": [
            "not an object",
            summary(json!("2022"), json!([])),
        ]}]}));

        let (ids, no_ids) = extract(&p.groups());
        assert!(ids.is_empty());
        assert_eq!(no_ids, vec![2022]);
    }

    #[test]
    fn test_empty_payload() {
        let (ids, no_ids) = extract(&payload(json!({})).groups());
        assert!(ids.is_empty());
        assert!(no_ids.is_empty());
    }
}
