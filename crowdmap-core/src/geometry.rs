//! GeoJSON geometry model and the representative-point reducer.
//!
//! Geometry kinds form a closed enum so the normaliser and the reducer both
//! match exhaustively over them. Positions are WGS84 with
//! `x = longitude` and `y = latitude`.
//!
//! # Examples
//! ```
//! use crowdmap_core::{Geometry, Position};
//!
//! let line = Geometry::LineString {
//!     coordinates: vec![Position::new(0.0, 0.0), Position::new(1.0, 1.0), Position::new(2.0, 2.0)],
//! };
//! assert_eq!(line.representative_point(), Some(Position::new(1.0, 1.0)));
//! ```

use std::fmt;

use geo::{Coord, Rect};
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single `[x, y]` coordinate pair.
///
/// Serialises as a two-element JSON array, matching GeoJSON positions.
/// Deserialisation accepts longer arrays and drops the extra members, such as
/// altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position(pub f64, pub f64);

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PositionVisitor)
    }
}

struct PositionVisitor;

impl<'de> Visitor<'de> for PositionVisitor {
    type Value = Position;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array of at least two numbers")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Position, A::Error> {
        let x = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let y = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Position(x, y))
    }
}

impl Position {
    /// Construct a position from longitude (`x`) and latitude (`y`).
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self(x, y)
    }

    /// Longitude component.
    #[must_use]
    pub const fn x(self) -> f64 {
        self.0
    }

    /// Latitude component.
    #[must_use]
    pub const fn y(self) -> f64 {
        self.1
    }
}

impl From<Position> for Coord<f64> {
    fn from(value: Position) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl From<Coord<f64>> for Position {
    fn from(value: Coord<f64>) -> Self {
        Self(value.x, value.y)
    }
}

/// GeoJSON geometry object.
///
/// Polygon rings are sequences of positions; the first ring is the outer
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// The point's position.
        coordinates: Position,
    },
    /// Several unconnected positions.
    MultiPoint {
        /// Member positions.
        coordinates: Vec<Position>,
    },
    /// An open or closed path.
    LineString {
        /// Path vertices in order.
        coordinates: Vec<Position>,
    },
    /// Several paths.
    MultiLineString {
        /// Member paths.
        coordinates: Vec<Vec<Position>>,
    },
    /// An area bounded by rings.
    Polygon {
        /// Rings; the first is the outer boundary.
        coordinates: Vec<Vec<Position>>,
    },
    /// Several areas.
    MultiPolygon {
        /// Member polygons, each a list of rings.
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    /// A heterogeneous set of geometries.
    GeometryCollection {
        /// Member geometries.
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// Reduce the geometry to one representative position.
    ///
    /// See [`representative_point`].
    #[must_use]
    pub fn representative_point(&self) -> Option<Position> {
        representative_point(self)
    }

    /// Axis-aligned bounds of every position in the geometry.
    ///
    /// Returns `None` for geometries without any positions.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut positions = Vec::new();
        self.collect_positions(&mut positions);
        let mut iter = positions.into_iter();
        let first = Coord::from(iter.next()?);
        let (min, max) = iter.fold((first, first), |(min, max), position| {
            let coord = Coord::from(position);
            (
                Coord {
                    x: min.x.min(coord.x),
                    y: min.y.min(coord.y),
                },
                Coord {
                    x: max.x.max(coord.x),
                    y: max.y.max(coord.y),
                },
            )
        });
        Some(Rect::new(min, max))
    }

    fn collect_positions(&self, out: &mut Vec<Position>) {
        match self {
            Self::Point { coordinates } => out.push(*coordinates),
            Self::MultiPoint { coordinates } | Self::LineString { coordinates } => {
                out.extend_from_slice(coordinates);
            }
            Self::MultiLineString { coordinates } | Self::Polygon { coordinates } => {
                out.extend(coordinates.iter().flatten().copied());
            }
            Self::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().flatten().flatten().copied());
            }
            Self::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.collect_positions(out);
                }
            }
        }
    }
}

/// Map a geometry to a single representative position.
///
/// The rule depends only on the geometry kind; there is no fallback between
/// kinds:
/// - `Point`: the coordinate itself.
/// - `Polygon`: the unweighted mean of the outer ring's vertices. The closing
///   vertex counts like any other, so dense edges pull the result towards
///   them.
/// - `MultiPolygon`: the same mean over the first polygon's outer ring.
/// - `LineString`: the vertex at index `n / 2` (rounded down).
/// - `MultiLineString`: the `LineString` rule on the first line.
/// - Anything else: `None`.
///
/// Empty rings and lines also yield `None`. This is a normal outcome, not a
/// fault.
///
/// # Examples
/// ```
/// use crowdmap_core::{Geometry, Position, representative_point};
///
/// let square = Geometry::Polygon {
///     coordinates: vec![vec![
///         Position::new(0.0, 0.0),
///         Position::new(0.0, 2.0),
///         Position::new(2.0, 2.0),
///         Position::new(2.0, 0.0),
///     ]],
/// };
/// assert_eq!(representative_point(&square), Some(Position::new(1.0, 1.0)));
/// ```
#[must_use]
pub fn representative_point(geometry: &Geometry) -> Option<Position> {
    match geometry {
        Geometry::Point { coordinates } => Some(*coordinates),
        Geometry::Polygon { coordinates } => vertex_mean(coordinates.first()?),
        Geometry::MultiPolygon { coordinates } => vertex_mean(coordinates.first()?.first()?),
        Geometry::LineString { coordinates } => positional_midpoint(coordinates),
        Geometry::MultiLineString { coordinates } => positional_midpoint(coordinates.first()?),
        Geometry::MultiPoint { .. } | Geometry::GeometryCollection { .. } => None,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "vertex averaging is inherently floating-point"
)]
fn vertex_mean(ring: &[Position]) -> Option<Position> {
    if ring.is_empty() {
        return None;
    }
    let count = ring.len() as f64;
    let (sum_x, sum_y) = ring
        .iter()
        .fold((0.0, 0.0), |(x, y), position| (x + position.0, y + position.1));
    Some(Position(sum_x / count, sum_y / count))
}

#[expect(
    clippy::integer_division,
    reason = "the midpoint index rounds down by position"
)]
fn positional_midpoint(line: &[Position]) -> Option<Position> {
    line.get(line.len() / 2).copied()
}
