//! Order-preserving identifier intersection

use rustc_hash::FxHashSet;

/// Identifiers present in both `column_ids` and `candidate_ids`, in
/// `column_ids` order.
///
/// Duplicates in either input yield a single output entry. No overlap gives
/// an empty vector.
pub fn intersect_preserving_order<I, S>(column_ids: &[String], candidate_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let candidates: FxHashSet<String> = candidate_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();
    let mut emitted = FxHashSet::default();

    column_ids
        .iter()
        .filter(|id| candidates.contains(id.as_str()) && emitted.insert(id.as_str()))
        .cloned()
        .collect()
}
