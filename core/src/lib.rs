//! In-memory inverted index with boolean postings algebra.
//!
//! Build an [`InvertedIndex`] once with [`IndexBuilder`] (or [`build`] /
//! [`build_from_sources`]), then answer AND/OR/NOT queries through the
//! functions in [`algebra`] or a parsed [`Query`]. The index is immutable and
//! can be shared across threads without locking.

pub mod algebra;
pub mod builder;
pub mod error;
pub mod index;
pub mod query;
pub mod source;
pub mod tokenizer;

pub use algebra::{complement, difference, intersect, intersect_terms, plan_and, union};
pub use builder::{build, build_from_sources, BuildOutput, IndexBuilder};
pub use error::{AlgebraError, BuildWarning, QueryError};
pub use index::{DocId, InvertedIndex, PostingsList};
pub use query::{parse_query, Query};
pub use source::{DocumentSource, FileSource, TextSource};
pub use tokenizer::Normalization;
