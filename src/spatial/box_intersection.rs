//! Box-intersection sweep over boxes sorted on their lower x bound.

use std::ops::ControlFlow;

use super::bbox::Bbox;

fn overlaps_yz(a: &Bbox, b: &Bbox) -> bool {
    (1..3).all(|i| a.mins[i] <= b.maxs[i] && b.mins[i] <= a.maxs[i])
}

fn sorted_by_min_x<T>(boxes: &[(Bbox, T)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&i, &j| boxes[i].0.mins.x.total_cmp(&boxes[j].0.mins.x));
    order
}

/// Calls `callback` once for every pair `(a, b)`, `a` from `first` and `b`
/// from `second`, whose boxes overlap. Touching boxes overlap.
///
/// The sweep stops as soon as the callback breaks, and the break is
/// returned to the caller.
pub fn box_intersection<A, B, F>(
    first: &[(Bbox, A)],
    second: &[(Bbox, B)],
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&A, &B) -> ControlFlow<()>,
{
    let order_a = sorted_by_min_x(first);
    let order_b = sorted_by_min_x(second);
    let (mut i, mut j) = (0, 0);
    while i < order_a.len() && j < order_b.len() {
        let (box_a, payload_a) = &first[order_a[i]];
        let (box_b, payload_b) = &second[order_b[j]];
        if box_a.mins.x <= box_b.mins.x {
            for &k in &order_b[j..] {
                let (candidate, payload) = &second[k];
                if candidate.mins.x > box_a.maxs.x {
                    break;
                }
                if overlaps_yz(box_a, candidate) {
                    callback(payload_a, payload)?;
                }
            }
            i += 1;
        } else {
            for &k in &order_a[i..] {
                let (candidate, payload) = &first[k];
                if candidate.mins.x > box_b.maxs.x {
                    break;
                }
                if overlaps_yz(candidate, box_b) {
                    callback(payload, payload_b)?;
                }
            }
            j += 1;
        }
    }
    ControlFlow::Continue(())
}

/// Calls `callback` once for every unordered pair of distinct boxes of
/// `boxes` that overlap.
pub fn self_box_intersection<T, F>(boxes: &[(Bbox, T)], mut callback: F) -> ControlFlow<()>
where
    F: FnMut(&T, &T) -> ControlFlow<()>,
{
    let order = sorted_by_min_x(boxes);
    for (pos, &i) in order.iter().enumerate() {
        let (box_i, payload_i) = &boxes[i];
        for &k in &order[pos + 1..] {
            let (candidate, payload) = &boxes[k];
            if candidate.mins.x > box_i.maxs.x {
                break;
            }
            if overlaps_yz(box_i, candidate) {
                callback(payload_i, payload)?;
            }
        }
    }
    ControlFlow::Continue(())
}
