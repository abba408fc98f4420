//! Typed errors and recoverable build conditions.
//!
//! Nothing in here aborts an index build. Build problems are collected as
//! [`BuildWarning`]s next to the finished index; algebra and query errors are
//! only returned from the explicitly checked entry points.

use crate::DocId;
use std::io;
use thiserror::Error;

/// A condition the builder recovered from.
#[derive(Error, Debug)]
pub enum BuildWarning {
    /// The source could not be opened or read; the document contributes no terms.
    #[error("document {doc_id} ({name}) unavailable: {source}")]
    DocumentUnavailable {
        doc_id: DocId,
        name: String,
        #[source]
        source: io::Error,
    },

    /// The same identifier was supplied more than once; contributions were merged.
    #[error("document id {doc_id} supplied more than once")]
    DuplicateDocument { doc_id: DocId },

    /// Document identifiers are 1-based; id 0 was skipped.
    #[error("document id 0 is not a valid identifier, document skipped")]
    InvalidDocumentId,
}

impl BuildWarning {
    pub fn doc_id(&self) -> Option<DocId> {
        match self {
            Self::DocumentUnavailable { doc_id, .. } | Self::DuplicateDocument { doc_id } => {
                Some(*doc_id)
            }
            Self::InvalidDocumentId => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    /// Complement was asked for a corpus smaller than the largest identifier present.
    #[error("corpus size {total_docs} is smaller than document id {max_doc_id}")]
    InvalidCorpusSize { total_docs: u32, max_doc_id: DocId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    Empty,

    #[error("unexpected token {token:?} at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unexpected end of query, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}
