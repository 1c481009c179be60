use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::{GeometryError, Result};

/// Undirected edge key with the direction the triangle walks it in.
fn edge_key(a: usize, b: usize) -> ((usize, usize), bool) {
    if a < b {
        ((a, b), true)
    } else {
        ((b, a), false)
    }
}

fn triangle_edges(t: &[usize; 3]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..3).map(move |i| (t[i], t[(i + 1) % 3])).filter(|(a, b)| a != b)
}

/// Makes adjacent triangles walk their shared edges in opposite directions.
///
/// Triangles are reached by breadth-first search over manifold edges (edges
/// shared by exactly two triangles), one search per connected component.
/// The first triangle of a component keeps its orientation. Returns the
/// number of reversed triangles, so a second run on the output returns 0.
///
/// # Errors
///
/// Returns [`GeometryError::OrientationConflict`] when a triangle would have
/// to be both kept and reversed (non-orientable or self-intersecting input).
pub fn orient_triangles(triangles: &mut [[usize; 3]]) -> Result<usize> {
    let mut adjacency: HashMap<(usize, usize), Vec<(usize, bool)>> = HashMap::new();
    for (i, t) in triangles.iter().enumerate() {
        for (a, b) in triangle_edges(t) {
            let (key, forward) = edge_key(a, b);
            adjacency.entry(key).or_default().push((i, forward));
        }
    }

    let mut flip: Vec<Option<bool>> = vec![None; triangles.len()];
    let mut components = 0usize;
    for seed in 0..triangles.len() {
        if flip[seed].is_some() {
            continue;
        }
        components += 1;
        flip[seed] = Some(false);
        let mut queue = VecDeque::from([seed]);
        while let Some(t) = queue.pop_front() {
            let t_flipped = flip[t].unwrap_or(false);
            for (a, b) in triangle_edges(&triangles[t]) {
                let (key, forward) = edge_key(a, b);
                let Some(users) = adjacency.get(&key) else {
                    continue;
                };
                if users.len() != 2 {
                    continue;
                }
                let walked = forward != t_flipped;
                for &(u, u_forward) in users.iter().filter(|(u, _)| *u != t) {
                    let required = u_forward == walked;
                    match flip[u] {
                        None => {
                            flip[u] = Some(required);
                            queue.push_back(u);
                        }
                        Some(current) if current != required => {
                            return Err(GeometryError::OrientationConflict(format!(
                                "triangles {t} and {u} cannot be oriented consistently"
                            ))
                            .into());
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }

    let mut reversed = 0;
    for (t, f) in triangles.iter_mut().zip(&flip) {
        if *f == Some(true) {
            t.swap(1, 2);
            reversed += 1;
        }
    }
    debug!(triangles = triangles.len(), components, reversed, "oriented triangle soup");
    Ok(reversed)
}

/// First directed half-edge used by two triangles, if any.
#[must_use]
pub fn repeated_half_edge(triangles: &[[usize; 3]]) -> Option<(usize, usize)> {
    let mut seen = std::collections::HashSet::new();
    triangles
        .iter()
        .flat_map(|t| triangle_edges(t).collect::<Vec<_>>())
        .find(|e| !seen.insert(*e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SfgeomError;

    #[test]
    fn flips_inconsistent_neighbours() {
        let mut tris = vec![[0, 1, 2], [1, 2, 3]];
        assert_eq!(orient_triangles(&mut tris).unwrap(), 1);
        assert_eq!(tris[1], [1, 3, 2]);
        assert!(repeated_half_edge(&tris).is_none());
    }

    #[test]
    fn second_run_is_a_fixpoint() {
        let mut tris = vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 2, 3]];
        orient_triangles(&mut tris).unwrap();
        assert_eq!(orient_triangles(&mut tris).unwrap(), 0);
        assert!(repeated_half_edge(&tris).is_none());
    }

    #[test]
    fn mobius_strip_is_rejected() {
        // Three quads joined into a band with a half twist.
        let mut tris = vec![[0, 1, 3], [1, 4, 3], [1, 2, 4], [2, 5, 4], [2, 3, 5], [3, 0, 5]];
        assert!(matches!(
            orient_triangles(&mut tris),
            Err(SfgeomError::Geometry(GeometryError::OrientationConflict(_)))
        ));
    }
}
