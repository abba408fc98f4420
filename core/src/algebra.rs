//! Merge-based set operations over sorted, duplicate-free id sequences.
//!
//! Every function here expects ascending input without duplicates and produces
//! ascending output without duplicates. [`PostingsList`](crate::PostingsList)
//! upholds that by construction; for raw slices use [`sorted_ids`] first.

use crate::error::AlgebraError;
use crate::index::{DocId, InvertedIndex};
use std::cmp::Ordering;

fn is_sorted_set(ids: &[DocId]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}

/// Sort and dedup arbitrary ids into a valid operand.
pub fn sorted_ids<I: IntoIterator<Item = DocId>>(ids: I) -> Vec<DocId> {
    let mut v: Vec<DocId> = ids.into_iter().collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Two-pointer intersection, O(|a| + |b|).
pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_sorted_set(a) && is_sorted_set(b));
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

pub fn union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_sorted_set(a) && is_sorted_set(b));
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Ids in `a` that are not in `b`.
pub fn difference(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_sorted_set(a) && is_sorted_set(b));
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for &id in a {
        while j < b.len() && b[j] < id {
            j += 1;
        }
        if j < b.len() && b[j] == id {
            j += 1;
        } else {
            out.push(id);
        }
    }
    out
}

/// Every id in `1..=total_docs` not in `a`. Ids above `total_docs` are ignored.
pub fn complement(a: &[DocId], total_docs: u32) -> Vec<DocId> {
    debug_assert!(is_sorted_set(a));
    if let Some(&max) = a.last() {
        if max > total_docs {
            tracing::debug!(total_docs, max_doc_id = max, "complement clamped to corpus size");
        }
    }
    let mut out = Vec::with_capacity((total_docs as usize).saturating_sub(a.len()));
    let mut j = 0;
    for id in 1..=total_docs {
        while j < a.len() && a[j] < id {
            j += 1;
        }
        if j < a.len() && a[j] == id {
            j += 1;
        } else {
            out.push(id);
        }
    }
    out
}

/// Like [`complement`], but rejects a corpus size below the largest id in `a`.
pub fn try_complement(a: &[DocId], total_docs: u32) -> Result<Vec<DocId>, AlgebraError> {
    match a.last() {
        Some(&max_doc_id) if max_doc_id > total_docs => {
            Err(AlgebraError::InvalidCorpusSize { total_docs, max_doc_id })
        }
        _ => Ok(complement(a, total_docs)),
    }
}

/// N-way intersection, smallest operand first, stopping as soon as the result is empty.
/// No operands gives an empty result.
pub fn intersect_many<L: AsRef<[DocId]>>(lists: &[L]) -> Vec<DocId> {
    let mut ordered: Vec<&[DocId]> = lists.iter().map(|l| l.as_ref()).collect();
    ordered.sort_by_key(|l| l.len());
    intersect_in_order(&ordered).0
}

/// Intersects left to right and returns the result with the number of merges run.
fn intersect_in_order(ordered: &[&[DocId]]) -> (Vec<DocId>, usize) {
    let Some((first, rest)) = ordered.split_first() else {
        return (Vec::new(), 0);
    };
    let mut result = first.to_vec();
    let mut merges = 0;
    for (step, list) in rest.iter().enumerate() {
        if result.is_empty() {
            tracing::debug!(remaining = rest.len() - step, "intersection empty, short-circuit");
            break;
        }
        result = intersect(&result, list);
        merges += 1;
    }
    (result, merges)
}

pub fn union_many<L: AsRef<[DocId]>>(lists: &[L]) -> Vec<DocId> {
    lists
        .iter()
        .fold(Vec::new(), |acc, list| union(&acc, list.as_ref()))
}

/// Order in which [`intersect_terms`] visits the terms: ascending postings size.
/// The sort is stable, so ties keep the caller's order.
pub fn plan_and<'a, S: AsRef<str>>(index: &InvertedIndex, terms: &'a [S]) -> Vec<&'a str> {
    let mut plan: Vec<&str> = terms.iter().map(|t| t.as_ref()).collect();
    plan.sort_by_key(|t| index.doc_freq(t));
    plan
}

/// Conjunction of all terms' postings. Unknown terms have empty postings, so
/// any unknown term makes the result empty without touching the other lists.
pub fn intersect_terms<S: AsRef<str>>(index: &InvertedIndex, terms: &[S]) -> Vec<DocId> {
    let plan = plan_and(index, terms);
    tracing::debug!(?plan, "and plan");
    let lists: Vec<&[DocId]> = plan.iter().map(|t| index.postings(t)).collect();
    let (result, merges) = intersect_in_order(&lists);
    tracing::debug!(merges, hits = result.len(), "and evaluated");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_basic() {
        assert_eq!(intersect(&[1, 2, 4, 11, 31, 45], &[2, 31, 54, 101]), vec![2, 31]);
        assert!(intersect(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn union_basic() {
        assert_eq!(union(&[1, 3, 5], &[2, 3, 6, 7]), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(union(&[], &[4]), vec![4]);
    }

    #[test]
    fn difference_basic() {
        assert_eq!(difference(&[1, 2, 3, 4, 5], &[2, 4, 9]), vec![1, 3, 5]);
        assert_eq!(difference(&[1, 2], &[]), vec![1, 2]);
    }

    #[test]
    fn complement_basic() {
        assert_eq!(complement(&[1, 3, 4], 5), vec![2, 5]);
        assert_eq!(complement(&[], 3), vec![1, 2, 3]);
        assert!(complement(&[1, 2], 0).is_empty());
    }

    #[test]
    fn complement_clamps_out_of_range() {
        assert_eq!(complement(&[2, 7, 9], 4), vec![1, 3, 4]);
        assert_eq!(
            try_complement(&[2, 7], 4),
            Err(AlgebraError::InvalidCorpusSize { total_docs: 4, max_doc_id: 7 })
        );
        assert_eq!(try_complement(&[2, 4], 4), Ok(vec![1, 3]));
    }

    #[test]
    fn many_way_ops() {
        let lists = vec![vec![1, 2, 3, 4], vec![2, 4], vec![4, 5]];
        assert_eq!(intersect_many(&lists), vec![4]);
        assert_eq!(union_many(&lists), vec![1, 2, 3, 4, 5]);
        assert!(intersect_many::<Vec<DocId>>(&[]).is_empty());
    }

    #[test]
    fn empty_operand_stops_merging() {
        let (result, merges) = intersect_in_order(&[&[], &[1, 2, 4], &[1, 3, 4]]);
        assert!(result.is_empty());
        assert_eq!(merges, 0);

        // becomes empty after the first merge, the third list is never visited
        let (result, merges) = intersect_in_order(&[&[1], &[2], &[1, 2, 3]]);
        assert!(result.is_empty());
        assert_eq!(merges, 1);

        let (result, merges) = intersect_in_order(&[&[4], &[1, 2, 4], &[1, 3, 4]]);
        assert_eq!(result, vec![4]);
        assert_eq!(merges, 2);
    }

    #[test]
    fn unknown_term_is_planned_first_and_nothing_is_merged() {
        let index = crate::builder::build(vec![
            (1, vec!["brutus", "caesar"]),
            (2, vec!["brutus"]),
            (3, vec!["caesar"]),
            (4, vec!["noble", "brutus", "caesar"]),
            (5, vec!["calpurnia"]),
        ])
        .index;
        let terms = ["brutus", "caesar", "noble", "window"];
        let plan = plan_and(&index, &terms);
        assert_eq!(plan, vec!["window", "noble", "brutus", "caesar"]);

        let lists: Vec<&[DocId]> = plan.iter().map(|t| index.postings(t)).collect();
        let (result, merges) = intersect_in_order(&lists);
        assert!(result.is_empty());
        assert_eq!(merges, 0);
        assert!(intersect_terms(&index, &terms).is_empty());
    }

    #[test]
    fn sorted_ids_normalizes_input() {
        assert_eq!(sorted_ids([5, 1, 5, 3]), vec![1, 3, 5]);
    }
}
