//! OpenAlex `/works` response models, restricted to identifier and citation fields.

use serde::{Deserialize, Serialize};

use super::{IdType, IdentifierKey};

/// One page of an OpenAlex works query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationPage {
    /// Matching works.
    #[serde(default)]
    pub results: Vec<CitationRecord>,

    /// Paging metadata.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl CitationPage {
    /// Cursor for the next page, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta.as_ref()?.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// Paging metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total matches.
    #[serde(default)]
    pub count: Option<u64>,

    /// Cursor for the next page; absent or null on the last page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Nested identifier block of an OpenAlex work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationIds {
    /// DOI URL.
    #[serde(default)]
    pub doi: Option<String>,
    /// PubMed URL.
    #[serde(default)]
    pub pmid: Option<String>,
    /// PubMed Central URL.
    #[serde(default)]
    pub pmcid: Option<String>,
    /// arXiv id or URL.
    #[serde(default)]
    pub arxiv: Option<String>,
}

impl CitationIds {
    fn get(&self, id_type: IdType) -> Option<&str> {
        match id_type {
            IdType::Doi => self.doi.as_deref(),
            IdType::Pmid => self.pmid.as_deref(),
            IdType::Pmcid => self.pmcid.as_deref(),
            IdType::Arxiv => self.arxiv.as_deref(),
        }
    }
}

/// A work as returned by the citation index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Flat DOI field (the only identifier OpenAlex exposes at top level).
    #[serde(default)]
    pub doi: Option<String>,
    /// Flat PMID, if a deployment exposes it.
    #[serde(default)]
    pub pmid: Option<String>,
    /// Flat PMCID, if a deployment exposes it.
    #[serde(default)]
    pub pmcid: Option<String>,
    /// Flat arXiv id, if a deployment exposes it.
    #[serde(default)]
    pub arxiv: Option<String>,

    /// Nested identifier block.
    #[serde(default)]
    pub ids: Option<CitationIds>,

    /// Times cited.
    #[serde(default)]
    pub cited_by_count: Option<u64>,
}

impl CitationRecord {
    /// Raw identifier value for a type: flat field first, then the nested block.
    #[must_use]
    pub fn identifier(&self, id_type: IdType) -> Option<&str> {
        let flat = match id_type {
            IdType::Doi => self.doi.as_deref(),
            IdType::Pmid => self.pmid.as_deref(),
            IdType::Pmcid => self.pmcid.as_deref(),
            IdType::Arxiv => self.arxiv.as_deref(),
        };
        flat.filter(|v| !v.trim().is_empty()).or_else(|| self.ids.as_ref()?.get(id_type))
    }

    /// Normalized key for a type.
    #[must_use]
    pub fn key(&self, id_type: IdType) -> Option<IdentifierKey> {
        IdentifierKey::new(id_type, self.identifier(id_type)?)
    }

    /// Citation count or 0 if not available.
    #[must_use]
    pub fn citations(&self) -> u64 {
        self.cited_by_count.unwrap_or(0)
    }
}
