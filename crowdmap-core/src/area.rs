//! Geographic bounding boxes.

use std::str::FromStr;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bounding box in `(south, west, north, east)` order.
///
/// This is the order Overpass filters use; [`BoundingBox::to_rect`] converts
/// to a `geo` rectangle with `x = longitude`.
///
/// # Examples
/// ```
/// use crowdmap_core::BoundingBox;
///
/// let chicumbane = BoundingBox::new(-25.2, 33.3, -24.7, 33.7);
/// assert!(chicumbane.contains_point(33.3, -25.2));
/// assert!(!chicumbane.contains_point(33.8, -25.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl BoundingBox {
    /// Construct a box from its edges.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Convert to a `geo` rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    /// Whether `(lon, lat)` lies inside the box, edges included.
    #[must_use]
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        (self.west..=self.east).contains(&lon) && (self.south..=self.north).contains(&lat)
    }

    /// Whether `rect` lies entirely inside the box, edges included.
    #[must_use]
    pub fn contains_rect(&self, rect: &Rect<f64>) -> bool {
        self.contains_point(rect.min().x, rect.min().y)
            && self.contains_point(rect.max().x, rect.max().y)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// Failure to parse a `south,west,north,east` box.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoundingBoxError {
    /// The text did not have exactly four comma-separated parts.
    #[error("expected four comma-separated values, found {found}")]
    WrongArity {
        /// Number of parts found.
        found: usize,
    },
    /// A part was not a number.
    #[error("invalid coordinate {value:?}")]
    InvalidCoordinate {
        /// Offending part.
        value: String,
    },
    /// South lies above north or west lies east of east.
    #[error("south must not exceed north and west must not exceed east")]
    Inverted,
}

impl FromStr for BoundingBox {
    type Err = ParseBoundingBoxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts = text
            .split(',')
            .map(|part| {
                let trimmed = part.trim();
                trimmed
                    .parse::<f64>()
                    .map_err(|_| ParseBoundingBoxError::InvalidCoordinate {
                        value: trimmed.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [south, west, north, east] = *parts.as_slice() else {
            return Err(ParseBoundingBoxError::WrongArity { found: parts.len() });
        };
        if south > north || west > east {
            return Err(ParseBoundingBoxError::Inverted);
        }
        Ok(Self::new(south, west, north, east))
    }
}
