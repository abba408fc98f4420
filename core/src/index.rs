use crate::tokenizer::{normalize, Normalization};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub type DocId = u32;

/// Sorted, duplicate-free document identifiers for one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostingsList(Vec<DocId>);

impl PostingsList {
    pub fn new() -> Self { Self::default() }

    /// Build from identifiers in any order; sorts and drops duplicates.
    pub fn from_unsorted<I: IntoIterator<Item = DocId>>(ids: I) -> Self {
        let mut ids: Vec<DocId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn as_slice(&self) -> &[DocId] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, DocId> { self.0.iter() }
    pub fn into_vec(self) -> Vec<DocId> { self.0 }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.0.binary_search(&doc_id).is_ok()
    }
}

impl From<BTreeSet<DocId>> for PostingsList {
    fn from(set: BTreeSet<DocId>) -> Self {
        // BTreeSet iterates ascending without duplicates
        Self(set.into_iter().collect())
    }
}

impl FromIterator<DocId> for PostingsList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}

impl AsRef<[DocId]> for PostingsList {
    fn as_ref(&self) -> &[DocId] { &self.0 }
}

impl<'a> IntoIterator for &'a PostingsList {
    type Item = &'a DocId;
    type IntoIter = std::slice::Iter<'a, DocId>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Immutable term -> postings mapping for one corpus.
///
/// Every stored term has a non-empty postings list. A term that is not stored
/// has an implicit empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvertedIndex {
    postings: BTreeMap<String, PostingsList>,
    /// Document labels keyed by id, for display.
    docs: BTreeMap<DocId, String>,
    num_docs: u32,
    #[serde(skip)]
    normalization: Normalization,
}

impl InvertedIndex {
    pub(crate) fn from_parts(
        postings: BTreeMap<String, PostingsList>,
        docs: BTreeMap<DocId, String>,
        normalization: Normalization,
    ) -> Self {
        debug_assert!(postings.values().all(|p| !p.is_empty()));
        let num_docs = u32::try_from(docs.len()).unwrap_or(u32::MAX);
        Self { postings, docs, num_docs, normalization }
    }

    /// Number of documents presented to the build, unreadable ones included.
    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn normalization(&self) -> Normalization { self.normalization }

    /// Postings for an already-normalized term.
    pub fn get(&self, term: &str) -> Option<&PostingsList> {
        self.postings.get(term)
    }

    /// Postings for a raw query term. Unknown terms give an empty slice.
    pub fn postings(&self, raw_term: &str) -> &[DocId] {
        let term = normalize(raw_term, self.normalization);
        self.postings.get(&term).map(PostingsList::as_slice).unwrap_or(&[])
    }

    /// Document frequency of a raw query term.
    pub fn doc_freq(&self, raw_term: &str) -> usize {
        self.postings(raw_term).len()
    }

    /// Terms with their postings, in ascending term order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostingsList)> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Document ids known to this index, ascending.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    pub fn doc_name(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(String::as_str)
    }

    pub fn max_doc_id(&self) -> Option<DocId> {
        self.docs.keys().next_back().copied()
    }
}
