//! Union-find clustering of equivalence relations.
//!
//! [`disjoint_set_merge`] partitions a finite element universe into
//! disjoint subsets according to a list of equivalence pairs. Used to
//! deduplicate or group structures that an external comparison has
//! declared equivalent.

use crate::error::Error;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

/// Partitions `elements` into disjoint subsets.
///
/// Two elements end up in the same subset iff they are connected by a
/// chain of `pairs` (the reflexive-transitive closure of the declared
/// equivalence). Unpaired elements form singletons. Duplicate elements
/// collapse; duplicate and reversed pairs are harmless.
///
/// # Errors
///
/// Returns [`Error::UnknownElement`] if a pair references an element
/// absent from `elements` — a contract violation, not an invitation to
/// insert it silently.
///
/// # Algorithm
///
/// Union-find with path compression; each pair unions its two
/// representatives, then all elements are grouped by representative.
/// The order of returned subsets is unspecified, but the partition
/// content is deterministic for a given input.
pub fn disjoint_set_merge<T>(
    elements: impl IntoIterator<Item = T>,
    pairs: &[(T, T)],
) -> Result<Vec<HashSet<T>>, Error>
where
    T: Eq + Hash + Clone + Debug,
{
    let mut universe: Vec<T> = Vec::new();
    let mut index: HashMap<T, usize> = HashMap::new();
    for element in elements {
        if !index.contains_key(&element) {
            index.insert(element.clone(), universe.len());
            universe.push(element);
        }
    }

    let mut parent: Vec<usize> = (0..universe.len()).collect();

    for (a, b) in pairs {
        let ia = *index
            .get(a)
            .ok_or_else(|| Error::UnknownElement(format!("{a:?}")))?;
        let ib = *index
            .get(b)
            .ok_or_else(|| Error::UnknownElement(format!("{b:?}")))?;
        let ra = find(&mut parent, ia);
        let rb = find(&mut parent, ib);
        if ra != rb {
            parent[rb] = ra;
        }
    }

    let mut groups: HashMap<usize, HashSet<T>> = HashMap::new();
    for (i, element) in universe.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().insert(element.clone());
    }

    Ok(groups.into_values().collect())
}

/// Finds the representative of `i`, compressing the path on the way up.
fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut cursor = i;
    while parent[cursor] != root {
        let next = parent[cursor];
        parent[cursor] = root;
        cursor = next;
    }
    root
}
