//! ORCID `/works` payload and the typed work records built from it.
//!
//! The raw payload structs mirror the ORCID v3.0 JSON (kebab-case, every field
//! optional). [`WorkRecord`] is the single parsing boundary: everything past it
//! works with plain owned fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{IdType, IdentifierKey};
use crate::error::MalformedRecord;

/// Response of `GET /{orcid}/works`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksPayload {
    /// Work groups; the registry merges an author's re-reported versions into one group.
    ///
    /// Kept untyped like the summaries so one bad group cannot fail the payload.
    #[serde(default)]
    pub group: Option<Vec<serde_json::Value>>,
}

impl WorksPayload {
    /// Parseable work groups in registry order. Malformed groups are skipped.
    #[must_use]
    pub fn groups(&self) -> Vec<WorkGroup> {
        self.group
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| match WorkGroup::deserialize(raw) {
                Ok(group) => Some(group),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping work group");
                    None
                }
            })
            .collect()
    }

    /// Every parseable work in registry order. Malformed summaries are skipped.
    #[must_use]
    pub fn records(&self) -> Vec<WorkRecord> {
        self.groups().iter().flat_map(|g| g.records()).filter_map(skip_malformed).collect()
    }
}

fn skip_malformed(record: Result<WorkRecord, MalformedRecord>) -> Option<WorkRecord> {
    match record {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping work summary");
            None
        }
    }
}

/// One group of work summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkGroup {
    /// Summaries kept untyped so one bad entry cannot fail the whole payload.
    #[serde(rename = "work-summary", default)]
    pub work_summary: Option<Vec<serde_json::Value>>,
}

impl WorkGroup {
    /// Parse each summary of the group.
    pub fn records(&self) -> impl Iterator<Item = Result<WorkRecord, MalformedRecord>> + '_ {
        self.work_summary.as_deref().unwrap_or_default().iter().map(WorkRecord::from_summary)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WorkSummary {
    #[serde(default)]
    put_code: Option<i64>,
    #[serde(default)]
    title: Option<TitleBlock>,
    #[serde(default, rename = "type")]
    work_type: Option<String>,
    #[serde(default)]
    publication_date: Option<PublicationDate>,
    #[serde(default)]
    journal_title: Option<ValueField<String>>,
    #[serde(default)]
    external_ids: Option<ExternalIdList>,
    #[serde(default)]
    url: Option<ValueField<String>>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleBlock {
    #[serde(default)]
    title: Option<ValueField<String>>,
}

#[derive(Debug, Deserialize)]
struct ValueField<T> {
    value: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PublicationDate {
    #[serde(default)]
    year: Option<ValueField<Scalar>>,
}

/// ORCID sends years as strings; tolerate numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(i64),
    Text(String),
}

impl Scalar {
    fn as_year(&self) -> Option<i32> {
        let year = match self {
            Self::Number(n) => i32::try_from(*n).ok()?,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        (year > 0).then_some(year)
    }
}

#[derive(Debug, Deserialize)]
struct ExternalIdList {
    #[serde(rename = "external-id", default)]
    external_id: Option<Vec<RawExternalId>>,
}

#[derive(Debug, Deserialize)]
struct RawExternalId {
    #[serde(rename = "external-id-type", default)]
    id_type: Option<String>,
    #[serde(rename = "external-id-value", default)]
    value: Option<String>,
}

/// An `(idType, idValue)` pair as declared by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalId {
    /// Registry type label (e.g. "doi", "isbn").
    pub id_type: String,
    /// Raw value.
    pub value: String,
}

impl ExternalId {
    /// Create an external id pair.
    #[must_use]
    pub fn new(id_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self { id_type: id_type.into(), value: value.into() }
    }
}

/// A work as read from the registry. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Title with HTML entities decoded.
    pub title: String,

    /// Publication year, `None` when missing, non-numeric or not positive.
    pub publication_year: Option<i32>,

    /// External ids in declared order.
    pub external_ids: Vec<ExternalId>,

    /// Work type (e.g. "journal-article").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,

    /// Journal or container title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Landing page URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Registry API path of the full work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Registry put-code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_code: Option<i64>,

    /// Short description, when the registry has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

impl WorkRecord {
    /// Create a record with a title, year and ids; passthrough fields empty.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        publication_year: Option<i32>,
        external_ids: Vec<ExternalId>,
    ) -> Self {
        Self { title: title.into(), publication_year, external_ids, ..Default::default() }
    }

    /// Parse one untyped work summary.
    pub fn from_summary(value: &serde_json::Value) -> Result<Self, MalformedRecord> {
        let summary =
            WorkSummary::deserialize(value).map_err(|e| MalformedRecord::new(e.to_string()))?;

        let title = summary
            .title
            .and_then(|t| t.title)
            .and_then(|t| t.value)
            .map(|t| decode_html_entities(&t))
            .unwrap_or_else(|| "Untitled".to_string());

        let publication_year = summary
            .publication_date
            .and_then(|d| d.year)
            .and_then(|y| y.value)
            .and_then(|y| y.as_year());

        let external_ids = summary
            .external_ids
            .and_then(|ids| ids.external_id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ext| Some(ExternalId::new(ext.id_type?, ext.value?)))
            .collect();

        Ok(Self {
            title,
            publication_year,
            external_ids,
            work_type: summary.work_type,
            container: summary.journal_title.and_then(|j| j.value),
            url: summary.url.and_then(|u| u.value),
            path: summary.path,
            put_code: summary.put_code,
            short_description: summary.short_description,
        })
    }

    /// First recognized identifier in declared order.
    ///
    /// An id of a known type whose value normalizes to nothing is passed over.
    #[must_use]
    pub fn primary_identifier(&self) -> Option<IdentifierKey> {
        self.external_ids.iter().find_map(|ext| {
            let id_type = IdType::parse(&ext.id_type)?;
            IdentifierKey::new(id_type, &ext.value)
        })
    }

    /// Normalized DOI if the work declares one.
    #[must_use]
    pub fn doi(&self) -> Option<String> {
        self.external_ids
            .iter()
            .filter(|ext| IdType::parse(&ext.id_type) == Some(IdType::Doi))
            .find_map(|ext| IdentifierKey::new(IdType::Doi, &ext.value))
            .map(|key| key.value().to_string())
    }

    /// Case-insensitive substring match on title or short description.
    #[must_use]
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .short_description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// A work with its citation count attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitedWork {
    /// The registry work.
    #[serde(flatten)]
    pub work: WorkRecord,

    /// Key the citation count was looked up by.
    pub identifier: Option<IdentifierKey>,

    /// Citations; 0 for works without an identifier.
    pub cited_by_count: u64,
}

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").expect("valid entity pattern"));

/// Decode the HTML entities ORCID leaves in titles.
#[must_use]
pub fn decode_html_entities(text: &str) -> String {
    let named = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    let decoded = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures<'_>| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });

    // Last, so "&amp;lt;" becomes "&lt;" rather than "<".
    decoded.replace("&amp;", "&")
}
