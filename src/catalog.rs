//! The token catalog: a precedence-merged mapping from token name to value.
//!
//! A catalog is built fresh per render batch from an ordered list of
//! sources (provider mappings, user constants, prompt answers). Later
//! sources shadow earlier ones key-for-key, never mapping-for-mapping.

use indexmap::IndexMap;

/// Outcome of a single token lookup.
///
/// A name that is present but maps to an empty string is `Empty`,
/// which is distinct from a name the catalog has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Known(&'a str),
    Empty,
    Unknown,
}

impl<'a> Resolution<'a> {
    /// True for `Empty` and `Unknown`; used by optional-segment logic.
    pub fn is_blank(&self) -> bool {
        !matches!(self, Resolution::Known(_))
    }
}

/// Immutable token name -> value mapping for one render batch.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    entries: IndexMap<String, String>,
}

impl TokenCatalog {
    /// Builds a catalog from sources in precedence order: a key defined
    /// by a later source overrides the same key from an earlier source.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = IndexMap<String, String>>,
    {
        let mut entries = IndexMap::new();
        for source in sources {
            for (key, value) in source {
                entries.insert(key, value);
            }
        }
        Self { entries }
    }

    /// Looks a name up, distinguishing known-but-empty from unknown.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        match self.entries.get(name) {
            Some(value) if value.is_empty() => Resolution::Empty,
            Some(value) => Resolution::Known(value),
            None => Resolution::Unknown,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
