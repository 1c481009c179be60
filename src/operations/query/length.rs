use crate::geometry::{Geometry, LineString};
use crate::math::{Segment2, Segment3};

fn line_length_2d(l: &LineString) -> f64 {
    l.exact_points2()
        .windows(2)
        .map(|w| Segment2::new(w[0].clone(), w[1].clone()).length())
        .sum()
}

fn line_length_3d(l: &LineString) -> f64 {
    l.exact_points3()
        .windows(2)
        .map(|w| Segment3::new(w[0].clone(), w[1].clone()).length())
        .sum()
}

fn total(g: &Geometry, line: fn(&LineString) -> f64) -> f64 {
    match g {
        Geometry::LineString(l) => line(l),
        Geometry::MultiLineString(m) => m.geometries().iter().map(line).sum(),
        Geometry::GeometryCollection(c) => {
            c.geometries().iter().map(|part| total(part, line)).sum()
        }
        _ => 0.0,
    }
}

/// Length of the curves of `g` in the xy plane; other geometries measure 0.
#[must_use]
pub fn length(g: &Geometry) -> f64 {
    total(g, line_length_2d)
}

/// Length of the curves of `g` in space.
#[must_use]
pub fn length_3d(g: &Geometry) -> f64 {
    total(g, line_length_3d)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{GeometryCollection, MultiLineString, Point};

    fn line3(points: &[(f64, f64, f64)]) -> LineString {
        LineString::new(points.iter().map(|&(x, y, z)| Point::xyz(x, y, z).unwrap()).collect())
    }

    #[test]
    fn planar_and_spatial_lengths() {
        let g = Geometry::from(line3(&[(0.0, 0.0, 0.0), (3.0, 4.0, 12.0)]));
        assert_relative_eq!(length(&g), 5.0);
        assert_relative_eq!(length_3d(&g), 13.0);
    }

    #[test]
    fn collections_add_up() {
        let lines = MultiLineString::new(vec![
            line3(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 2.0, 0.0)]),
            line3(&[(5.0, 5.0, 0.0), (5.0, 6.0, 0.0)]),
        ]);
        let g = Geometry::from(GeometryCollection::new(vec![
            Geometry::from(lines),
            Geometry::from(Point::xy(1.0, 1.0).unwrap()),
        ]));
        assert_relative_eq!(length(&g), 4.0);
        assert_relative_eq!(length_3d(&g), 4.0);
    }
}
