//! Index-stable bulk mutations over dense object sequences
//!
//! Sequences never have gaps: removing an element moves the last element
//! into the freed slot. [`swap_insert_many`] is the exact inverse of
//! [`swap_delete_many`], which is what makes delete operations undoable.

/// Remove the elements at `indices` with swap-remove semantics.
///
/// Indices are processed from highest to lowest, so a removal only ever moves
/// an element that sits above every index still pending. The order of the
/// remaining elements is not preserved.
///
/// Panics if an index is out of range.
pub fn swap_delete_many<T>(vec: &mut Vec<T>, indices: &[usize]) {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    for idx in sorted {
        vec.swap_remove(idx);
    }
}

/// Put back elements removed by [`swap_delete_many`] at their original indices.
///
/// `indices` and `values` must be paired the same way [`copy_indices`] pairs
/// them, and `vec` must be in the state the matching delete left it in.
/// The deletions are replayed backwards: lowest index first, each value is
/// pushed then swapped into its slot.
pub fn swap_insert_many<T>(vec: &mut Vec<T>, indices: &[usize], values: &[T])
where
    T: Clone,
{
    assert_eq!(indices.len(), values.len(), "indices and values must be paired");
    let mut pairs: Vec<(usize, &T)> = indices.iter().copied().zip(values).collect();
    pairs.sort_unstable_by_key(|(idx, _)| *idx);
    for (idx, value) in pairs {
        vec.push(value.clone());
        let last = vec.len() - 1;
        vec.swap(idx, last);
    }
}

/// Append clones of `source[i]` for each `i` in `indices`, in order.
pub fn copy_indices<T: Clone>(dest: &mut Vec<T>, source: &[T], indices: &[usize]) {
    dest.extend(indices.iter().map(|&i| source[i].clone()));
}
