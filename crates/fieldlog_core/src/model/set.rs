//! Multiset helpers over `HasEquals` records.
//!
//! Record lists in this domain hold dozens of entries, so the quadratic
//! searches below are acceptable.

use crate::model::common::HasEquals;

/// Returns whether `a` and `b` hold the same values regardless of order,
/// with duplicate counts respected (`[x,x,x]` != `[x,x]`).
pub fn data_sets_equal<T: HasEquals>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&T> = b.iter().collect();
    for item in a {
        match remaining.iter().position(|candidate| item.equals(candidate)) {
            Some(index) => {
                remaining.remove(index);
            }
            None => return false,
        }
    }
    remaining.is_empty()
}

/// Keeps the first occurrence of every distinct value, in encounter order.
pub fn deduplicated_set<'a, T, I>(items: I) -> Vec<&'a T>
where
    T: HasEquals + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut unique: Vec<&'a T> = Vec::new();
    for item in items {
        if !unique.iter().any(|seen| item.equals(seen)) {
            unique.push(item);
        }
    }
    unique
}

/// Returns the entries of `items` that have no equal in `remove`.
pub fn set_remove<'a, T: HasEquals>(items: &'a [T], remove: &[T]) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| !remove.iter().any(|r| item.equals(r)))
        .collect()
}
