use nalgebra::{Matrix3, Point2 as Position, Vector2, Vector3};
use tracing::{debug, trace};

use crate::error::{OperationError, Result};
use crate::geometry::{Geometry, LineString, MultiLineString, Point, Polygon};
use crate::math::polygon_2d::oriented_ring;
use crate::math::predicates::{orient2d, Orientation};
use crate::math::Point2;
use crate::set::dim2::polygon_to_exact;

/// Determinant below which two directions, or three wavefront lines, are
/// treated as parallel.
const PARALLEL: f64 = 1e-12;

/// Straight skeleton of planar polygons.
///
/// The skeleton is traced by shrinking every ring at unit speed: the
/// vertices of the wavefront slide along the bisectors of their edges, and
/// their paths are the arcs of the skeleton. Arcs are returned as two-point
/// line strings in xy; Z is dropped.
///
/// Triangles, polygons and multipolygons are handled; every other type
/// gives an empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightSkeleton {
    inner_only: bool,
    distance_in_m: bool,
}

impl StraightSkeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the arcs that start at a polygon vertex.
    #[must_use]
    pub fn inner_only(mut self, inner_only: bool) -> Self {
        self.inner_only = inner_only;
        self
    }

    /// Stores at each arc end the distance to the polygon boundary as M.
    #[must_use]
    pub fn distance_in_m(mut self, distance_in_m: bool) -> Self {
        self.distance_in_m = distance_in_m;
        self
    }

    /// # Errors
    ///
    /// Returns [`OperationError::Failed`] when the wavefront stops making
    /// progress, which only happens for self-intersecting rings.
    pub fn execute(&self, g: &Geometry) -> Result<MultiLineString> {
        debug!(kind = g.geometry_type().name(), inner_only = self.inner_only, "straight skeleton");
        let polygons: Vec<Polygon> = match g {
            Geometry::Triangle(t) => vec![Polygon::from_triangle(t)],
            Geometry::Polygon(p) => vec![p.clone()],
            Geometry::MultiPolygon(m) => m.geometries().to_vec(),
            _ => Vec::new(),
        };
        let mut out = MultiLineString::empty();
        for polygon in &polygons {
            let Some(rings) = skeleton_rings(polygon) else {
                continue;
            };
            for arc in Wavefront::new(&rings).run()? {
                if self.inner_only && arc.from_contour {
                    continue;
                }
                out.push(self.line(&arc)?);
            }
        }
        Ok(out)
    }

    fn line(&self, arc: &Arc) -> Result<LineString> {
        let end = |p: &Position<f64>, time: f64| -> Result<Point> {
            let point = Point::xy(p.x, p.y)?;
            Ok(if self.distance_in_m { point.with_m(time) } else { point })
        };
        Ok(LineString::new(vec![end(&arc.from, arc.from_time)?, end(&arc.to, arc.to_time)?]))
    }
}

/// Skeleton with default options.
///
/// # Errors
///
/// See [`StraightSkeleton::execute`].
pub fn straight_skeleton(g: &Geometry) -> Result<MultiLineString> {
    StraightSkeleton::new().execute(g)
}

/// Rings ready for the wavefront: exterior counter-clockwise, holes
/// clockwise, no collinear vertices. `None` for a degenerate exterior.
fn skeleton_rings(polygon: &Polygon) -> Option<Vec<Vec<Position<f64>>>> {
    let exact = polygon_to_exact(polygon);
    let outer = strip_collinear(oriented_ring(exact.outer, true));
    if outer.len() < 3 {
        return None;
    }
    let holes = exact
        .holes
        .into_iter()
        .map(|h| strip_collinear(oriented_ring(h, false)))
        .filter(|h| h.len() >= 3);
    let rings = std::iter::once(outer)
        .chain(holes)
        .map(|ring| ring.iter().map(Point2::to_na).collect())
        .collect();
    Some(rings)
}

fn strip_collinear(mut ring: Vec<Point2>) -> Vec<Point2> {
    while ring.len() >= 3 {
        let n = ring.len();
        let flat = (0..n).find(|&i| {
            orient2d(&ring[(i + n - 1) % n], &ring[i], &ring[(i + 1) % n]) == Orientation::Collinear
        });
        let Some(i) = flat else {
            break;
        };
        ring.remove(i);
    }
    ring
}

/// Supporting line of a polygon edge, `normal · x = offset` at time zero,
/// with the unit normal pointing into the polygon.
#[derive(Debug, Clone)]
struct Edge {
    normal: Vector2<f64>,
    offset: f64,
    direction: Vector2<f64>,
}

/// Wavefront vertex between its `left` and `right` edges, at `origin` at
/// `time`.
#[derive(Debug, Clone)]
struct Node {
    origin: Position<f64>,
    time: f64,
    left: usize,
    right: usize,
    prev: usize,
    next: usize,
    alive: bool,
    contour: bool,
}

#[derive(Debug, Clone)]
struct Arc {
    from: Position<f64>,
    to: Position<f64>,
    from_time: f64,
    to_time: f64,
    from_contour: bool,
}

/// Edge events collapse the wavefront edge right of `vertex`; split events
/// (`opposite` set) let the reflex `vertex` hit the edge right of `opposite`.
#[derive(Debug, Clone)]
struct Event {
    time: f64,
    at: Position<f64>,
    vertex: usize,
    opposite: Option<usize>,
}

impl Event {
    fn precedes(&self, other: &Self, eps: f64) -> bool {
        if self.time < other.time - eps {
            return true;
        }
        if self.time > other.time + eps {
            return false;
        }
        (self.opposite.is_some(), self.vertex) < (other.opposite.is_some(), other.vertex)
    }
}

struct Wavefront {
    edges: Vec<Edge>,
    nodes: Vec<Node>,
    arcs: Vec<Arc>,
    now: f64,
    eps: f64,
}

impl Wavefront {
    fn new(rings: &[Vec<Position<f64>>]) -> Self {
        let (mut lo, mut hi) = (Vector2::repeat(f64::MAX), Vector2::repeat(f64::MIN));
        for p in rings.iter().flatten() {
            lo = lo.inf(&p.coords);
            hi = hi.sup(&p.coords);
        }
        let eps = 1e-9 * (hi - lo).norm().max(1.0);

        let mut edges = Vec::new();
        let mut nodes = Vec::new();
        for ring in rings {
            let n = ring.len();
            let (first_edge, first_node) = (edges.len(), nodes.len());
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                let direction = (b - a).normalize();
                let normal = Vector2::new(-direction.y, direction.x);
                edges.push(Edge { normal, offset: normal.dot(&a.coords), direction });
            }
            for (i, origin) in ring.iter().enumerate() {
                nodes.push(Node {
                    origin: *origin,
                    time: 0.0,
                    left: first_edge + (i + n - 1) % n,
                    right: first_edge + i,
                    prev: first_node + (i + n - 1) % n,
                    next: first_node + (i + 1) % n,
                    alive: true,
                    contour: true,
                });
            }
        }
        Self { edges, nodes, arcs: Vec::new(), now: 0.0, eps }
    }

    fn run(mut self) -> Result<Vec<Arc>> {
        let limit = 16 * self.nodes.len() + 64;
        self.cleanup();
        let mut steps = 0;
        while self.nodes.iter().any(|n| n.alive) {
            steps += 1;
            if steps > limit {
                let reason = "straight skeleton did not converge".into();
                return Err(OperationError::Failed(reason).into());
            }
            let Some(event) = self.next_event() else {
                let reason = "straight skeleton wavefront stalled".into();
                return Err(OperationError::Failed(reason).into());
            };
            trace!(time = event.time, split = event.opposite.is_some(), "skeleton event");
            self.now = self.now.max(event.time);
            match event.opposite {
                None => self.collapse_edge(&event),
                Some(opposite) => self.split(&event, opposite),
            }
            self.cleanup();
        }
        debug!(arcs = self.arcs.len(), steps, "straight skeleton traced");
        Ok(self.arcs)
    }

    /// Solves `normal · x - t = offset` for the three edges.
    fn meet(&self, edges: [usize; 3]) -> Option<(Position<f64>, f64)> {
        let [a, b, c] = edges.map(|e| &self.edges[e]);
        #[rustfmt::skip]
        let m = Matrix3::new(
            a.normal.x, a.normal.y, -1.0,
            b.normal.x, b.normal.y, -1.0,
            c.normal.x, c.normal.y, -1.0,
        );
        if m.determinant().abs() < PARALLEL {
            return None;
        }
        let x = m.lu().solve(&Vector3::new(a.offset, b.offset, c.offset))?;
        Some((Position::new(x.x, x.y), x.z))
    }

    fn velocity(&self, node: &Node) -> Vector2<f64> {
        let (a, b) = (self.edges[node.left].normal, self.edges[node.right].normal);
        let det = a.perp(&b);
        if det.abs() < PARALLEL {
            return if a.dot(&b) > 0.0 { a } else { Vector2::zeros() };
        }
        Vector2::new(b.y - a.y, a.x - b.x) / det
    }

    fn position(&self, i: usize, time: f64) -> Position<f64> {
        let node = &self.nodes[i];
        node.origin + self.velocity(node) * (time - node.time)
    }

    fn is_reflex(&self, node: &Node) -> bool {
        self.edges[node.left].direction.perp(&self.edges[node.right].direction) < -PARALLEL
    }

    /// Vertex whose two edges face each other; it has no bisector.
    fn is_antiparallel(&self, node: &Node) -> bool {
        let (a, b) = (self.edges[node.left].normal, self.edges[node.right].normal);
        a.perp(&b).abs() < PARALLEL && a.dot(&b) < 0.0
    }

    fn next_event(&self) -> Option<Event> {
        let mut best: Option<Event> = None;
        let mut offer = |event: Event| {
            if best.as_ref().is_none_or(|b| event.precedes(b, self.eps)) {
                best = Some(event);
            }
        };
        let alive = || self.nodes.iter().enumerate().filter(|(_, n)| n.alive);

        for (i, v) in alive() {
            let u = &self.nodes[v.next];
            if let Some((at, time)) = self.meet([v.left, v.right, u.right]) {
                if time >= self.now - self.eps {
                    offer(Event { time, at, vertex: i, opposite: None });
                }
            }
        }

        for (i, v) in alive().filter(|(_, v)| self.is_reflex(v)) {
            let here = self.position(i, self.now);
            for (j, p) in alive() {
                let (q, e) = (p.next, p.right);
                if e == v.left || e == v.right || j == i || q == i {
                    continue;
                }
                let edge = &self.edges[e];
                if edge.normal.dot(&here.coords) - (edge.offset + self.now) < -self.eps {
                    continue;
                }
                let Some((at, time)) = self.meet([v.left, v.right, e]) else {
                    continue;
                };
                if time < self.now - self.eps {
                    continue;
                }
                let (from, to) = (self.position(j, time), self.position(q, time));
                let along = (at - from).dot(&edge.direction);
                let length = (to - from).dot(&edge.direction);
                if along < -self.eps || along > length + self.eps {
                    continue;
                }
                offer(Event { time, at, vertex: i, opposite: Some(j) });
            }
        }
        best
    }

    fn arc(&mut self, from: Position<f64>, to: Position<f64>, times: (f64, f64), contour: bool) {
        if (to - from).norm() > self.eps {
            self.arcs.push(Arc {
                from,
                to,
                from_time: times.0,
                to_time: times.1,
                from_contour: contour,
            });
        }
    }

    fn kill(&mut self, i: usize, at: Position<f64>, time: f64) {
        let (origin, start, contour) = {
            let node = &mut self.nodes[i];
            node.alive = false;
            (node.origin, node.time, node.contour)
        };
        self.arc(origin, at, (start, time), contour);
    }

    /// Appends a vertex and links it between `prev` and `next`.
    fn spawn(
        &mut self,
        at: Position<f64>,
        time: f64,
        edges: (usize, usize),
        links: (usize, usize),
    ) {
        let i = self.nodes.len();
        self.nodes.push(Node {
            origin: at,
            time,
            left: edges.0,
            right: edges.1,
            prev: links.0,
            next: links.1,
            alive: true,
            contour: false,
        });
        self.nodes[links.0].next = i;
        self.nodes[links.1].prev = i;
    }

    fn collapse_edge(&mut self, event: &Event) {
        let v = self.nodes[event.vertex].clone();
        let u = self.nodes[v.next].clone();
        if self.nodes[u.next].next == event.vertex {
            for i in [event.vertex, v.next, u.next] {
                self.kill(i, event.at, event.time);
            }
            return;
        }
        self.kill(event.vertex, event.at, event.time);
        self.kill(v.next, event.at, event.time);
        self.spawn(event.at, event.time, (v.left, u.right), (v.prev, u.next));
    }

    fn split(&mut self, event: &Event, opposite: usize) {
        let v = self.nodes[event.vertex].clone();
        let (q, e) = (self.nodes[opposite].next, self.nodes[opposite].right);
        self.kill(event.vertex, event.at, event.time);
        self.spawn(event.at, event.time, (v.left, e), (v.prev, q));
        self.spawn(event.at, event.time, (e, v.right), (opposite, v.next));
    }

    /// Resolves the vertices a previous event left without a trajectory:
    /// loops of one or two vertices and vertices between facing edges.
    fn cleanup(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.nodes.len() {
                if !self.nodes[i].alive {
                    continue;
                }
                let next = self.nodes[i].next;
                if next == i {
                    self.kill(i, self.position(i, self.now), self.now);
                    changed = true;
                } else if self.nodes[next].next == i {
                    let (a, b) = (self.position(i, self.now), self.position(next, self.now));
                    self.kill(i, a, self.now);
                    self.kill(next, b, self.now);
                    self.arc(a, b, (self.now, self.now), false);
                    changed = true;
                } else if self.is_antiparallel(&self.nodes[i]) {
                    self.collapse_strip(i);
                    changed = true;
                }
            }
        }
    }

    /// Merges a vertex between facing edges into the nearer neighbour, or
    /// into both when they are equally far.
    fn collapse_strip(&mut self, i: usize) {
        let w = self.nodes[i].clone();
        let (p, n) = (self.nodes[w.prev].clone(), self.nodes[w.next].clone());
        let (a, b) = (self.position(w.prev, self.now), self.position(w.next, self.now));
        let (to_a, to_b) = ((a - w.origin).norm(), (b - w.origin).norm());
        let now = self.now;
        if (to_a - to_b).abs() <= self.eps {
            self.kill(i, a, now);
            self.kill(w.prev, a, now);
            self.kill(w.next, a, now);
            if p.prev != w.next {
                self.spawn(a, now, (p.left, n.right), (p.prev, n.next));
            }
        } else if to_b < to_a {
            self.kill(i, b, now);
            self.kill(w.next, b, now);
            self.spawn(b, now, (w.left, n.right), (w.prev, n.next));
        } else {
            self.kill(i, a, now);
            self.kill(w.prev, a, now);
            self.spawn(a, now, (p.left, w.right), (p.prev, w.next));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{MultiPolygon, Triangle};

    fn ring(points: &[(f64, f64)]) -> LineString {
        let mut points: Vec<Point> =
            points.iter().map(|&(x, y)| Point::xy(x, y).unwrap()).collect();
        points.push(points[0].clone());
        LineString::new(points)
    }

    fn polygon(points: &[(f64, f64)]) -> Geometry {
        Geometry::Polygon(Polygon::new(ring(points)))
    }

    fn ends(l: &LineString) -> [(f64, f64); 2] {
        let xy = |p: &Point| {
            let q = p.to_point2().unwrap().to_na();
            (q.x, q.y)
        };
        [xy(&l.points()[0]), xy(&l.points()[1])]
    }

    fn has_arc(skeleton: &MultiLineString, a: (f64, f64), b: (f64, f64)) -> bool {
        let close = |p: (f64, f64), q: (f64, f64)| {
            (p.0 - q.0).abs() < 1e-6 && (p.1 - q.1).abs() < 1e-6
        };
        skeleton.geometries().iter().map(ends).any(|[p, q]| {
            (close(p, a) && close(q, b)) || (close(p, b) && close(q, a))
        })
    }

    #[test]
    fn rectangle_has_a_ridge() {
        let rectangle = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let sk = straight_skeleton(&rectangle).unwrap();
        assert_eq!(sk.geometries().len(), 5);
        assert!(has_arc(&sk, (1.0, 1.0), (3.0, 1.0)));
        assert!(has_arc(&sk, (0.0, 0.0), (1.0, 1.0)));
        assert!(has_arc(&sk, (4.0, 2.0), (3.0, 1.0)));
    }

    #[test]
    fn triangle_arcs_meet_at_the_incenter() {
        let t = Triangle::new(
            Point::xy(0.0, 0.0).unwrap(),
            Point::xy(4.0, 0.0).unwrap(),
            Point::xy(0.0, 3.0).unwrap(),
        );
        let sk = straight_skeleton(&Geometry::Triangle(t)).unwrap();
        assert_eq!(sk.geometries().len(), 3);
        for l in sk.geometries() {
            let [_, q] = ends(l);
            assert_relative_eq!(q.0, 1.0, epsilon = 1e-9);
            assert_relative_eq!(q.1, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn clockwise_input_and_collinear_vertices_are_normalised() {
        let sk = straight_skeleton(&polygon(&[
            (0.0, 2.0),
            (4.0, 2.0),
            (4.0, 0.0),
            (2.0, 0.0),
            (0.0, 0.0),
        ]))
        .unwrap();
        assert_eq!(sk.geometries().len(), 5);
        assert!(has_arc(&sk, (1.0, 1.0), (3.0, 1.0)));
    }

    #[test]
    fn reflex_vertex_splits_the_wavefront() {
        let notch = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 4.0), (5.0, 1.0), (0.0, 4.0)]);
        let sk = straight_skeleton(&notch).unwrap();
        assert_eq!(sk.geometries().len(), 7);
        let split = sk
            .geometries()
            .iter()
            .map(ends)
            .find(|[p, _]| p.0 == 5.0 && p.1 == 1.0)
            .unwrap();
        assert_relative_eq!(split[1].0, 5.0, epsilon = 1e-9);
        assert_relative_eq!(split[1].1, 0.4616, epsilon = 1e-4);
    }

    #[test]
    fn hole_gives_a_midline_ring() {
        let g = Geometry::Polygon(Polygon::with_holes(
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            vec![ring(&[(3.0, 3.0), (3.0, 7.0), (7.0, 7.0), (7.0, 3.0)])],
        ));
        let sk = straight_skeleton(&g).unwrap();
        assert_eq!(sk.geometries().len(), 12);
        assert!(has_arc(&sk, (0.0, 0.0), (1.5, 1.5)));
        assert!(has_arc(&sk, (3.0, 3.0), (1.5, 1.5)));
        assert!(has_arc(&sk, (1.5, 1.5), (8.5, 1.5)));
    }

    #[test]
    fn inner_only_keeps_interior_arcs() {
        let g = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let sk = StraightSkeleton::new().inner_only(true).execute(&g).unwrap();
        assert_eq!(sk.geometries().len(), 1);
        assert!(has_arc(&sk, (1.0, 1.0), (3.0, 1.0)));
    }

    #[test]
    fn distances_are_stored_in_m() {
        let g = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let sk = StraightSkeleton::new().distance_in_m(true).execute(&g).unwrap();
        for l in sk.geometries() {
            assert!(l.is_measured());
            let m: Vec<f64> = l.points().iter().map(|p| p.coordinate().m().unwrap()).collect();
            let corner = ends(l)[0].1 == 0.0 || ends(l)[0].1 == 2.0;
            assert_relative_eq!(m[0], if corner { 0.0 } else { 1.0 }, epsilon = 1e-9);
            assert_relative_eq!(m[1], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn multipolygons_are_skeletonised_part_by_part() {
        let square = |x: f64| {
            Polygon::new(ring(&[(x, 0.0), (x + 2.0, 0.0), (x + 2.0, 2.0), (x, 2.0)]))
        };
        let g = Geometry::MultiPolygon(MultiPolygon::new(vec![square(0.0), square(5.0)]));
        assert_eq!(straight_skeleton(&g).unwrap().geometries().len(), 8);
    }

    #[test]
    fn other_types_give_an_empty_skeleton() {
        let line = Geometry::LineString(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]));
        assert!(straight_skeleton(&line).unwrap().is_empty());
        assert!(straight_skeleton(&Geometry::Polygon(Polygon::empty())).unwrap().is_empty());
    }
}
