//! External work identifiers and their normalized `type:value` keys.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier types the citation index can be queried by.
///
/// Declaration order is the scan priority used when a work lists several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Digital Object Identifier.
    Doi,
    /// PubMed ID.
    Pmid,
    /// PubMed Central ID.
    Pmcid,
    /// arXiv preprint ID.
    Arxiv,
}

struct Prefixes {
    /// Resolver URLs that identify the type on their own.
    url: Regex,
    /// Everything strippable from the front of a value, URLs included.
    any: Regex,
}

fn prefixes(url: &str, scheme: &str) -> Prefixes {
    Prefixes {
        url: Regex::new(&format!("(?i)^(?:{url})")).expect("valid identifier url pattern"),
        any: Regex::new(&format!("(?i)^(?:{url}|{scheme})"))
            .expect("valid identifier prefix pattern"),
    }
}

static DOI_PREFIXES: LazyLock<Prefixes> =
    LazyLock::new(|| prefixes(r"(?:https?://)?(?:dx\.)?doi\.org/", r"doi:\s*"));

static PMID_PREFIXES: LazyLock<Prefixes> = LazyLock::new(|| {
    prefixes(
        r"(?:https?://)?(?:www\.)?(?:pubmed\.ncbi\.nlm\.nih\.gov|ncbi\.nlm\.nih\.gov/pubmed)/",
        r"pmid:\s*",
    )
});

// The bare `pmc` alternative comes last so `pmcid:` wins (leftmost-first).
static PMCID_PREFIXES: LazyLock<Prefixes> = LazyLock::new(|| {
    prefixes(
        r"(?:https?://)?(?:www\.)?(?:ncbi\.nlm\.nih\.gov/pmc/articles|pmc\.ncbi\.nlm\.nih\.gov/articles)/",
        r"pmcid:\s*|pmc",
    )
});

static ARXIV_PREFIXES: LazyLock<Prefixes> = LazyLock::new(|| {
    prefixes(r"(?:https?://)?(?:www\.)?arxiv\.org/(?:abs|pdf)/", r"arxiv:\s*")
});

impl IdType {
    /// All types in scan-priority order.
    pub const ALL: [Self; 4] = [Self::Doi, Self::Pmid, Self::Pmcid, Self::Arxiv];

    /// Lower-case name used in keys and in OpenAlex filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doi => "doi",
            Self::Pmid => "pmid",
            Self::Pmcid => "pmcid",
            Self::Arxiv => "arxiv",
        }
    }

    /// Parse a registry type label, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "doi" => Some(Self::Doi),
            "pmid" => Some(Self::Pmid),
            "pmcid" | "pmc" => Some(Self::Pmcid),
            "arxiv" => Some(Self::Arxiv),
            _ => None,
        }
    }

    fn prefixes(self) -> &'static Prefixes {
        match self {
            Self::Doi => &DOI_PREFIXES,
            Self::Pmid => &PMID_PREFIXES,
            Self::Pmcid => &PMCID_PREFIXES,
            Self::Arxiv => &ARXIV_PREFIXES,
        }
    }

    /// Strip resolver URLs and scheme prefixes, then lower-case.
    ///
    /// Prefixes are stripped repeatedly so the result is a fixed point.
    #[must_use]
    pub fn normalize_value(self, raw: &str) -> String {
        let pattern = &self.prefixes().any;
        let mut value = raw.trim();
        while let Some(m) = pattern.find(value) {
            if m.end() == 0 {
                break;
            }
            value = value[m.end()..].trim();
        }
        value.to_lowercase()
    }

    /// Type implied by a resolver URL such as `https://doi.org/...`.
    #[must_use]
    pub fn from_url(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|t| t.prefixes().url.is_match(raw))
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown identifier type: {s}"))
    }
}

/// Normalized `"{type}:{value}"` key.
///
/// Two works with equal keys are the same publication for citation lookup and
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IdentifierKey {
    id_type: IdType,
    value: String,
}

impl IdentifierKey {
    /// Build a key from a known type and a raw value.
    ///
    /// Returns `None` when nothing is left after normalization.
    #[must_use]
    pub fn new(id_type: IdType, raw_value: &str) -> Option<Self> {
        let value = id_type.normalize_value(raw_value);
        if value.is_empty() {
            return None;
        }
        Some(Self { id_type, value })
    }

    /// Parse `type:value` or a resolver URL.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some((head, rest)) = raw.split_once(':') {
            if let Some(id_type) = IdType::parse(head) {
                return Self::new(id_type, rest);
            }
        }
        IdType::from_url(raw).and_then(|id_type| Self::new(id_type, raw))
    }

    /// Identifier type.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        self.id_type
    }

    /// Normalized value without the type prefix.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for IdentifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id_type, self.value)
    }
}

impl From<IdentifierKey> for String {
    fn from(key: IdentifierKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for IdentifierKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("not an identifier key: {raw}"))
    }
}

impl FromStr for IdentifierKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not an identifier key: {s}"))
    }
}

/// Normalize any identifier string to its key form.
///
/// Unrecognized input is trimmed and lower-cased, so the function is total and
/// `normalize(normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    IdentifierKey::parse(raw).map_or_else(|| raw.trim().to_lowercase(), |key| key.to_string())
}
