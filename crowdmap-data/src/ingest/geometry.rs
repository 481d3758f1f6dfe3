//! Geometry construction per element kind.
//!
//! Construction never reduces: ways keep every vertex and relations keep
//! only their bounding rectangle.

use crowdmap_core::{Geometry, Position};

use super::Rejection;
use crate::overpass::{RawBounds, RawElement, RawVertex};

/// Minimum vertex count, exclusive, for a closed way to become a polygon.
const POLYGON_VERTEX_THRESHOLD: usize = 3;

pub(super) fn node(element: &RawElement) -> Result<Geometry, Rejection> {
    match (element.lon, element.lat) {
        (Some(lon), Some(lat)) => Ok(Geometry::Point {
            coordinates: Position::new(lon, lat),
        }),
        _ => Err(Rejection::Malformed {
            reason: "node without coordinates",
        }),
    }
}

pub(super) fn way(element: &RawElement) -> Result<Geometry, Rejection> {
    let Some(vertices) = element.geometry.as_deref() else {
        return Err(Rejection::NoGeometry);
    };
    if vertices.is_empty() {
        return Err(Rejection::NoGeometry);
    }
    let coordinates = vertices
        .iter()
        .map(|vertex| vertex.map(position))
        .collect::<Option<Vec<_>>>()
        .ok_or(Rejection::Malformed {
            reason: "way with missing vertices",
        })?;
    Ok(classify_path(coordinates))
}

pub(super) fn relation(element: &RawElement) -> Result<Geometry, Rejection> {
    element
        .bounds
        .as_ref()
        .map(bounds_rectangle)
        .ok_or(Rejection::NoGeometry)
}

/// A path is a polygon when it is closed and has more than three vertices.
fn classify_path(coordinates: Vec<Position>) -> Geometry {
    let closed = coordinates.first() == coordinates.last();
    if closed && coordinates.len() > POLYGON_VERTEX_THRESHOLD {
        Geometry::Polygon {
            coordinates: vec![coordinates],
        }
    } else {
        Geometry::LineString { coordinates }
    }
}

fn bounds_rectangle(bounds: &RawBounds) -> Geometry {
    let ring = vec![
        Position::new(bounds.minlon, bounds.minlat),
        Position::new(bounds.maxlon, bounds.minlat),
        Position::new(bounds.maxlon, bounds.maxlat),
        Position::new(bounds.minlon, bounds.maxlat),
        Position::new(bounds.minlon, bounds.minlat),
    ];
    Geometry::Polygon {
        coordinates: vec![ring],
    }
}

const fn position(vertex: RawVertex) -> Position {
    Position::new(vertex.lon, vertex.lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn positions(points: &[(f64, f64)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[rstest]
    #[case(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)], true)]
    #[case(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)], false)]
    #[case(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], false)]
    #[case(&[(0.0, 0.0)], false)]
    fn closed_paths_need_more_than_three_vertices(
        #[case] points: &[(f64, f64)],
        #[case] polygon: bool,
    ) {
        let geometry = classify_path(positions(points));
        assert_eq!(matches!(geometry, Geometry::Polygon { .. }), polygon);
    }

    #[rstest]
    fn relation_bounds_become_a_closed_rectangle() {
        let bounds = RawBounds {
            minlat: -25.0,
            minlon: 33.4,
            maxlat: -24.8,
            maxlon: 33.6,
        };
        assert_eq!(
            bounds_rectangle(&bounds),
            Geometry::Polygon {
                coordinates: vec![positions(&[
                    (33.4, -25.0),
                    (33.6, -25.0),
                    (33.6, -24.8),
                    (33.4, -24.8),
                    (33.4, -25.0),
                ])],
            }
        );
    }
}
