//! Index construction.
//!
//! Documents are folded into a term -> id-set accumulator; the accumulator is
//! frozen into an [`InvertedIndex`] by [`IndexBuilder::finish`]. The parallel
//! paths tokenize documents on rayon workers and merge each document's term set
//! into a sharded accumulator, one `parking_lot::Mutex` per shard. Set union
//! commutes, so every path produces the same index for the same corpus.

use crate::error::BuildWarning;
use crate::index::{DocId, InvertedIndex, PostingsList};
use crate::source::DocumentSource;
use crate::tokenizer::{normalize, tokenize_line, Normalization};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::io;

/// Finished index plus everything the build recovered from.
#[derive(Debug)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Default)]
pub struct IndexBuilder {
    normalization: Normalization,
    postings: HashMap<String, BTreeSet<DocId>>,
    docs: BTreeMap<DocId, String>,
    warnings: Vec<BuildWarning>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Record a document id. Returns false when the document must be skipped.
    fn register(&mut self, doc_id: DocId, name: String) -> bool {
        if doc_id == 0 {
            tracing::warn!("skipping document with id 0");
            self.warnings.push(BuildWarning::InvalidDocumentId);
            return false;
        }
        if self.docs.contains_key(&doc_id) {
            tracing::warn!(doc_id, "duplicate document id, merging postings");
            self.warnings.push(BuildWarning::DuplicateDocument { doc_id });
            return true;
        }
        self.docs.insert(doc_id, name);
        true
    }

    fn unavailable(&mut self, doc_id: DocId, name: String, source: io::Error) {
        tracing::warn!(doc_id, %name, error = %source, "document unavailable, indexing as empty");
        self.warnings.push(BuildWarning::DocumentUnavailable { doc_id, name, source });
    }

    /// Add one document's raw tokens. Tokens are normalized here.
    pub fn add_document<I, S>(&mut self, doc_id: DocId, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_named_document(doc_id, format!("doc{doc_id}"), tokens);
    }

    pub fn add_named_document<I, S>(&mut self, doc_id: DocId, name: impl Into<String>, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.register(doc_id, name.into()) {
            return;
        }
        for tok in tokens {
            let term = normalize(tok.as_ref(), self.normalization);
            if term.is_empty() { continue; }
            self.postings.entry(term).or_default().insert(doc_id);
        }
    }

    /// Read and add one source. A read failure leaves the document empty.
    pub fn add_source<S: DocumentSource + ?Sized>(&mut self, doc_id: DocId, source: &S) {
        let name = source.name();
        match source.read_lines() {
            Ok(lines) => {
                self.add_named_document(doc_id, name, lines.iter().flat_map(|l| tokenize_line(l)));
            }
            Err(e) => {
                if self.register(doc_id, name.clone()) {
                    self.unavailable(doc_id, name, e);
                }
            }
        }
    }

    /// Add sources in order, assigning ids 1..=n.
    pub fn build_from_sources<S: DocumentSource>(mut self, sources: &[S]) -> BuildOutput {
        let base = self.next_doc_id();
        for (i, source) in sources.iter().enumerate() {
            self.add_source(base + i as DocId, source);
        }
        self.finish()
    }

    /// Parallel counterpart of [`build_from_sources`](Self::build_from_sources).
    pub fn build_from_sources_parallel<S>(mut self, sources: &[S]) -> BuildOutput
    where
        S: DocumentSource + Sync,
    {
        let base = self.next_doc_id();
        for (i, source) in sources.iter().enumerate() {
            self.register(base + i as DocId, source.name());
        }

        let normalization = self.normalization;
        let shards = ShardedPostings::new();
        let mut failures: Vec<(DocId, String, io::Error)> = sources
            .par_iter()
            .enumerate()
            .filter_map(|(i, source)| {
                let doc_id = base + i as DocId;
                match source.read_lines() {
                    Ok(lines) => {
                        let terms = doc_terms(lines.iter().flat_map(|l| tokenize_line(l)), normalization);
                        shards.insert_document(doc_id, terms);
                        None
                    }
                    Err(e) => Some((doc_id, source.name(), e)),
                }
            })
            .collect();
        failures.sort_by_key(|(doc_id, _, _)| *doc_id);
        for (doc_id, name, e) in failures {
            self.unavailable(doc_id, name, e);
        }

        self.merge_shards(shards);
        self.finish()
    }

    /// Parallel counterpart of [`build`]: documents are tokenized on rayon workers.
    pub fn build_parallel<T, S>(mut self, documents: Vec<(DocId, T)>) -> BuildOutput
    where
        T: IntoIterator<Item = S> + Send,
        S: AsRef<str>,
    {
        // registration stays sequential so warnings come out in input order
        let accepted: Vec<(DocId, T)> = documents
            .into_iter()
            .filter(|(doc_id, _)| self.register(*doc_id, format!("doc{doc_id}")))
            .collect();

        let normalization = self.normalization;
        let shards = ShardedPostings::new();
        accepted.into_par_iter().for_each(|(doc_id, tokens)| {
            shards.insert_document(doc_id, doc_terms(tokens, normalization));
        });

        self.merge_shards(shards);
        self.finish()
    }

    fn merge_shards(&mut self, shards: ShardedPostings) {
        for (term, ids) in shards.into_entries() {
            self.postings.entry(term).or_default().extend(ids);
        }
    }

    fn next_doc_id(&self) -> DocId {
        self.docs.keys().next_back().map_or(1, |max| max + 1)
    }

    /// Freeze the accumulated postings.
    pub fn finish(self) -> BuildOutput {
        let postings: BTreeMap<String, PostingsList> = self
            .postings
            .into_iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(term, ids)| (term, PostingsList::from(ids)))
            .collect();
        let index = InvertedIndex::from_parts(postings, self.docs, self.normalization);
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            warnings = self.warnings.len(),
            "index build complete"
        );
        BuildOutput { index, warnings: self.warnings }
    }
}

/// Build from (id, raw tokens) pairs with default normalization.
pub fn build<I, T, S>(documents: I) -> BuildOutput
where
    I: IntoIterator<Item = (DocId, T)>,
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = IndexBuilder::new();
    for (doc_id, tokens) in documents {
        builder.add_document(doc_id, tokens);
    }
    builder.finish()
}

/// Build from sources with default normalization, ids 1..=n in order.
pub fn build_from_sources<S: DocumentSource>(sources: &[S]) -> BuildOutput {
    IndexBuilder::new().build_from_sources(sources)
}

fn doc_terms<I, S>(tokens: I, normalization: Normalization) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|tok| normalize(tok.as_ref(), normalization))
        .filter(|term| !term.is_empty())
        .collect()
}

/// Term -> id-set accumulator with one lock per shard of the term space.
struct ShardedPostings {
    shards: Vec<Mutex<HashMap<String, BTreeSet<DocId>>>>,
}

impl ShardedPostings {
    fn new() -> Self {
        let n = (rayon::current_num_threads() * 4).max(1);
        Self { shards: (0..n).map(|_| Mutex::new(HashMap::new())).collect() }
    }

    fn shard_for(&self, term: &str) -> &Mutex<HashMap<String, BTreeSet<DocId>>> {
        let mut hasher = DefaultHasher::new();
        term.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    fn insert_document(&self, doc_id: DocId, terms: HashSet<String>) {
        for term in terms {
            self.shard_for(&term).lock().entry(term).or_default().insert(doc_id);
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (String, BTreeSet<DocId>)> {
        self.shards.into_iter().flat_map(|shard| shard.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TextSource;

    fn split(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn duplicate_terms_collapse() {
        let out = build(vec![(1, split("Caesar caesar CAESAR")), (2, split("brutus caesar"))]);
        assert!(out.warnings.is_empty());
        assert_eq!(out.index.postings("caesar"), &[1, 2]);
        assert_eq!(out.index.postings("brutus"), &[2]);
        assert_eq!(out.index.num_terms(), 2);
    }

    #[test]
    fn id_zero_is_skipped() {
        let out = build(vec![(0, split("ghost")), (1, split("brutus"))]);
        assert!(matches!(out.warnings.as_slice(), [BuildWarning::InvalidDocumentId]));
        assert!(out.index.postings("ghost").is_empty());
        assert_eq!(out.index.num_docs(), 1);
    }

    #[test]
    fn duplicate_ids_merge_and_warn() {
        let out = build(vec![(1, split("brutus")), (1, split("caesar"))]);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].doc_id(), Some(1));
        assert_eq!(out.index.postings("brutus"), &[1]);
        assert_eq!(out.index.postings("caesar"), &[1]);
        assert_eq!(out.index.num_docs(), 1);
    }

    #[test]
    fn sources_get_sequential_ids() {
        let sources = vec![
            TextSource::new("a.txt", "Brutus killed\nCaesar"),
            TextSource::new("b.txt", "caesar"),
        ];
        let out = build_from_sources(&sources);
        assert_eq!(out.index.postings("caesar"), &[1, 2]);
        assert_eq!(out.index.doc_name(2), Some("b.txt"));
    }

    #[test]
    fn parallel_matches_sequential() {
        let docs: Vec<(DocId, Vec<String>)> = (1..=50)
            .map(|id| {
                let toks = (0..20).map(|k| format!("t{}", (id * 7 + k) % 13)).collect();
                (id, toks)
            })
            .collect();
        let seq = build(docs.clone());
        let par = IndexBuilder::new().build_parallel(docs);
        assert_eq!(seq.index, par.index);
    }

    #[test]
    fn normalization_is_applied_by_builder() {
        let mut builder = IndexBuilder::new().with_normalization(Normalization::NfkcLowercase);
        builder.add_document(1, ["ＢＲＵＴＵＳ"]);
        let out = builder.finish();
        assert_eq!(out.index.get("brutus").map(|p| p.as_slice()), Some(&[1][..]));
    }
}
