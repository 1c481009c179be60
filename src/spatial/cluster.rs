//! Connected components of overlapping boxes, and the union-find keys they
//! are computed with.

use std::collections::HashMap;
use std::ops::ControlFlow;

use ena::unify::{InPlaceUnificationTable, UnifyKey};

use super::bbox::Bbox;
use super::box_intersection::self_box_intersection;

/// Index of one element in a unification table.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct ElementKey(u32);

impl UnifyKey for ElementKey {
    type Value = ();
    fn index(&self) -> u32 {
        self.0
    }
    fn from_index(u: u32) -> ElementKey {
        ElementKey(u)
    }
    fn tag() -> &'static str {
        "ElementKey"
    }
}

/// Classes of `0..n` under the equivalence generated by `pairs`.
/// Classes are ordered by their smallest member, members ascending.
pub fn equivalence_classes(
    n: usize,
    pairs: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<Vec<usize>> {
    let mut table: InPlaceUnificationTable<ElementKey> = InPlaceUnificationTable::new();
    let keys: Vec<ElementKey> = (0..n).map(|_| table.new_key(())).collect();
    for (i, j) in pairs {
        table.union(keys[i], keys[j]);
    }

    let mut slot_of_root: HashMap<ElementKey, usize> = HashMap::new();
    let mut classes: Vec<Vec<usize>> = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        let root = table.find(*key);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            classes.push(Vec::new());
            classes.len() - 1
        });
        classes[slot].push(i);
    }
    classes
}

/// Groups box indices into connected components of the overlap graph.
/// Components are ordered by their smallest index, members ascending.
#[must_use]
pub fn cluster_boxes(boxes: &[Bbox]) -> Vec<Vec<usize>> {
    let indexed: Vec<(Bbox, usize)> = boxes.iter().copied().zip(0..).collect();
    let mut overlaps = Vec::new();
    let _ = self_box_intersection(&indexed, |&i, &j| {
        overlaps.push((i, j));
        ControlFlow::Continue(())
    });
    equivalence_classes(boxes.len(), overlaps)
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;

    fn interval(lo: f64, hi: f64) -> Bbox {
        Bbox::new(Point3::new(lo, 0.0, 0.0), Point3::new(hi, 1.0, 0.0))
    }

    #[test]
    fn chains_form_one_cluster() {
        let boxes = [
            interval(0.0, 1.0),
            interval(5.0, 6.0),
            interval(1.0, 2.0),
            interval(2.5, 3.0),
            interval(1.5, 2.5),
        ];
        let clusters = cluster_boxes(&boxes);
        assert_eq!(clusters, vec![vec![0, 2, 3, 4], vec![1]]);
    }

    #[test]
    fn classes_follow_transitive_pairs() {
        let classes = equivalence_classes(6, [(4, 1), (1, 3), (5, 5), (0, 2)]);
        assert_eq!(classes, vec![vec![0, 2], vec![1, 3, 4], vec![5]]);
        assert!(equivalence_classes(0, []).is_empty());
    }
}
