//! Exact boolean operations on sets of polygons with holes.
//!
//! Both operands are normalised (exterior counter-clockwise, holes
//! clockwise) so every region lies to the left of its directed edges. Edges
//! are split at their mutual intersections, each piece is classified against
//! the other operand, the pieces bounding the result are selected, and rings
//! are traced back from the selection.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use num_traits::One;
use tracing::{trace, warn};

use super::intersect_2d::{intersect_segments_2d, simplify_ring, SegmentIntersection2};
use super::number::{sign, Ft};
use super::point::{Point2, Vector2};
use super::polygon_2d::{ring_signed_area, PolygonWithHoles2};
use super::predicates::{classify_point_in_ring, PointClassification};
use super::primitives::Segment2;
use crate::spatial::{self_box_intersection, Bbox};

/// Boolean set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    Intersection,
    Union,
    Difference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceClass {
    Inside,
    Outside,
    SharedSame,
    SharedOpposite,
}

/// Applies `op` to the regions covered by `a` and `b`. The polygons of each
/// operand must have pairwise disjoint interiors.
#[must_use]
pub fn overlay(
    a: &[PolygonWithHoles2],
    b: &[PolygonWithHoles2],
    op: SetOperation,
) -> Vec<PolygonWithHoles2> {
    let a = normalized_operand(a);
    let b = normalized_operand(b);

    let edges: Vec<(Segment2, Operand)> = a
        .iter()
        .flat_map(|p| p.edges().map(|e| (e, Operand::First)))
        .chain(b.iter().flat_map(|p| p.edges().map(|e| (e, Operand::Second))))
        .filter(|(e, _)| !e.is_degenerate())
        .collect();
    let pieces = split_edges(&edges);

    let keys = |owner: Operand| -> HashSet<(Point2, Point2)> {
        pieces
            .iter()
            .filter(|(_, o)| *o == owner)
            .map(|(s, _)| (s.source.clone(), s.target.clone()))
            .collect()
    };
    let first_keys = keys(Operand::First);
    let second_keys = keys(Operand::Second);

    let mut selected: Vec<Segment2> = Vec::new();
    for (piece, owner) in pieces {
        let (other, other_keys) = match owner {
            Operand::First => (&b, &second_keys),
            Operand::Second => (&a, &first_keys),
        };
        let class = classify_piece(&piece, other, other_keys);
        let keep = match (op, owner, class) {
            (SetOperation::Intersection, _, PieceClass::Inside)
            | (SetOperation::Intersection, Operand::First, PieceClass::SharedSame)
            | (SetOperation::Union, _, PieceClass::Outside)
            | (SetOperation::Union, Operand::First, PieceClass::SharedSame)
            | (
                SetOperation::Difference,
                Operand::First,
                PieceClass::Outside | PieceClass::SharedOpposite,
            ) => Some(piece),
            (SetOperation::Difference, Operand::Second, PieceClass::Inside) => {
                Some(piece.reversed())
            }
            _ => None,
        };
        selected.extend(keep);
    }

    let selected = cancel_opposite_edges(selected);
    trace!(edges = selected.len(), ?op, "tracing overlay result");
    assemble_rings(trace_rings(&selected))
}

/// Union of arbitrary, possibly overlapping, polygons.
#[must_use]
pub fn union_all(polygons: &[PolygonWithHoles2]) -> Vec<PolygonWithHoles2> {
    polygons.iter().fold(Vec::new(), |acc, p| {
        overlay(&acc, std::slice::from_ref(p), SetOperation::Union)
    })
}

/// Merges polygons with pairwise disjoint interiors, dissolving shared edges.
#[must_use]
pub fn merge_disjoint(polygons: &[PolygonWithHoles2]) -> Vec<PolygonWithHoles2> {
    overlay(polygons, &[], SetOperation::Union)
}

fn normalized_operand(polygons: &[PolygonWithHoles2]) -> Vec<PolygonWithHoles2> {
    polygons
        .iter()
        .filter(|p| !p.is_empty())
        .map(PolygonWithHoles2::normalized)
        .collect()
}

/// Splits every edge at the points where it meets another edge.
fn split_edges(edges: &[(Segment2, Operand)]) -> Vec<(Segment2, Operand)> {
    let boxes: Vec<(Bbox, usize)> = edges
        .iter()
        .enumerate()
        .map(|(i, (e, _))| (Bbox::from_points_2d([&e.source, &e.target]), i))
        .collect();
    let mut cuts: Vec<Vec<Point2>> = vec![Vec::new(); edges.len()];
    let _ = self_box_intersection(&boxes, |&i, &j| {
        match intersect_segments_2d(&edges[i].0, &edges[j].0) {
            SegmentIntersection2::None => {}
            SegmentIntersection2::Point(p) => {
                cuts[i].push(p.clone());
                cuts[j].push(p);
            }
            SegmentIntersection2::Segment(s) => {
                for k in [i, j] {
                    cuts[k].push(s.source.clone());
                    cuts[k].push(s.target.clone());
                }
            }
        }
        ControlFlow::Continue(())
    });

    let mut pieces = Vec::new();
    for ((edge, owner), edge_cuts) in edges.iter().zip(cuts) {
        for piece in split_segment(edge, edge_cuts) {
            pieces.push((piece, *owner));
        }
    }
    pieces
}

/// Splits `edge` at `cuts`, keeping its direction.
pub(crate) fn split_segment(edge: &Segment2, cuts: Vec<Point2>) -> Vec<Segment2> {
    let one = Ft::one();
    let mut params: Vec<_> = cuts
        .into_iter()
        .map(|p| (edge.param_of(&p), p))
        .filter(|(t, _)| sign(t) == Ordering::Greater && *t < one)
        .collect();
    params.sort_by(|x, y| x.0.cmp(&y.0));
    params.dedup_by(|x, y| x.0 == y.0);

    let mut points = Vec::with_capacity(params.len() + 2);
    points.push(edge.source.clone());
    points.extend(params.into_iter().map(|(_, p)| p));
    points.push(edge.target.clone());
    points
        .windows(2)
        .filter(|w| w[0] != w[1])
        .map(|w| Segment2::new(w[0].clone(), w[1].clone()))
        .collect()
}

fn classify_piece(
    piece: &Segment2,
    other: &[PolygonWithHoles2],
    other_keys: &HashSet<(Point2, Point2)>,
) -> PieceClass {
    if other_keys.contains(&(piece.source.clone(), piece.target.clone())) {
        return PieceClass::SharedSame;
    }
    if other_keys.contains(&(piece.target.clone(), piece.source.clone())) {
        return PieceClass::SharedOpposite;
    }
    let mid = piece.source.midpoint(&piece.target);
    if other
        .iter()
        .any(|p| p.bounded_side(&mid) == PointClassification::Inside)
    {
        PieceClass::Inside
    } else {
        PieceClass::Outside
    }
}

/// Removes duplicate edges and pairs of opposite edges.
fn cancel_opposite_edges(edges: Vec<Segment2>) -> Vec<Segment2> {
    let mut seen = HashSet::new();
    let unique: Vec<Segment2> = edges
        .into_iter()
        .filter(|e| seen.insert((e.source.clone(), e.target.clone())))
        .collect();
    unique
        .into_iter()
        .filter(|e| !seen.contains(&(e.target.clone(), e.source.clone())))
        .collect()
}

/// Rank of `c` when turning clockwise from `r`: the clockwise half-plane
/// first, then the counter-clockwise one, and `r` itself last.
fn turn_rank(r: &Vector2, c: &Vector2) -> u8 {
    match sign(&r.cross(c)) {
        Ordering::Less => 0,
        Ordering::Greater => 1,
        Ordering::Equal if sign(&r.dot(c)) == Ordering::Less => 1,
        Ordering::Equal => 2,
    }
}

fn turn_order(r: &Vector2, c1: &Vector2, c2: &Vector2) -> Ordering {
    turn_rank(r, c1)
        .cmp(&turn_rank(r, c2))
        .then_with(|| sign(&c1.cross(c2)))
}

/// Traces closed rings from directed edges, keeping the region on the left.
/// At a vertex with several outgoing edges the first one clockwise from the
/// reversed incoming edge is taken, so rings touching at a vertex separate.
#[must_use]
pub fn trace_rings(edges: &[Segment2]) -> Vec<Vec<Point2>> {
    let mut outgoing: HashMap<&Point2, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(&e.source).or_default().push(i);
    }
    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut ring = vec![edges[start].source.clone()];
        let mut current = start;
        loop {
            let vertex = &edges[current].target;
            let back = &edges[current].source - vertex;
            let next = outgoing
                .get(vertex)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&k| !used[k] || k == start)
                .min_by(|&x, &y| {
                    let cx = &edges[x].target - &edges[x].source;
                    let cy = &edges[y].target - &edges[y].source;
                    turn_order(&back, &cx, &cy)
                });
            match next {
                Some(k) if k == start => break,
                Some(k) => {
                    used[k] = true;
                    ring.push(edges[k].source.clone());
                    current = k;
                }
                None => {
                    warn!("dropping an open chain while tracing rings");
                    ring.clear();
                    break;
                }
            }
        }
        let ring = simplify_ring(ring);
        if ring.len() >= 3 {
            rings.push(ring);
        }
    }
    rings
}

/// Groups traced rings into polygons: counter-clockwise rings are shells,
/// clockwise rings are holes of the smallest shell containing them.
#[must_use]
pub fn assemble_rings(rings: Vec<Vec<Point2>>) -> Vec<PolygonWithHoles2> {
    let mut shells: Vec<(PolygonWithHoles2, Ft)> = Vec::new();
    let mut holes = Vec::new();
    for ring in rings {
        let area = ring_signed_area(&ring);
        match sign(&area) {
            Ordering::Greater => shells.push((PolygonWithHoles2::from_outer(ring), area)),
            Ordering::Less => holes.push(ring),
            Ordering::Equal => {}
        }
    }
    for hole in holes {
        let Some(sample) = super::polygon_2d::interior_point(&[hole.as_slice()]) else {
            continue;
        };
        let owner = shells
            .iter_mut()
            .filter(|(shell, _)| {
                classify_point_in_ring(&sample, &shell.outer) == PointClassification::Inside
            })
            .min_by(|x, y| x.1.cmp(&y.1));
        match owner {
            Some((shell, _)) => shell.holes.push(hole),
            None => warn!("dropping a hole without enclosing shell"),
        }
    }
    shells.into_iter().map(|(p, _)| p).collect()
}
