//! Normalisation of raw remote elements into keyed features.
//!
//! Each element becomes at most one [`Feature`]. Elements that cannot be
//! represented are rejected with a [`Rejection`] so callers can tell records
//! without geometry apart from malformed ones.

use crowdmap_core::{ElementKind, Feature, ID_PROPERTY, KIND_PROPERTY, Properties};
use log::{debug, info};
use serde_json::Value;

use crate::overpass::{RawElement, RawKind, RawRecord};

mod geometry;
mod tags;

pub use tags::FLATTENED_TAGS;

/// Why an element did not produce a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The element carried no derivable geometry.
    NoGeometry,
    /// The element's shape was unrecognised or missing required data.
    Malformed {
        /// Short description of the defect.
        reason: &'static str,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoGeometry => f.write_str("no geometry"),
            Self::Malformed { reason } => write!(f, "malformed: {reason}"),
        }
    }
}

/// Features produced from a batch of elements and the rejection counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizeReport {
    /// Features in element order.
    pub features: Vec<Feature>,
    /// Elements dropped because they had no geometry.
    pub dropped_no_geometry: usize,
    /// Elements dropped because they were malformed.
    pub dropped_malformed: usize,
}

impl NormalizeReport {
    /// Total number of dropped elements.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped_no_geometry + self.dropped_malformed
    }

    fn record(&mut self, outcome: Result<Feature, Rejection>) {
        match outcome {
            Ok(feature) => self.features.push(feature),
            Err(Rejection::NoGeometry) => self.dropped_no_geometry += 1,
            Err(Rejection::Malformed { .. }) => self.dropped_malformed += 1,
        }
    }
}

/// Convert one element into a feature.
///
/// Provenance fields (`timestamp`, `version`, `changeset`, `user`, `uid`) are
/// copied when present. Tags are copied wholesale under `tags` and the keys in
/// [`FLATTENED_TAGS`] are repeated at the top level.
///
/// # Errors
///
/// Returns [`Rejection::NoGeometry`] for ways without inline geometry and
/// relations without bounds, and [`Rejection::Malformed`] for unknown kinds,
/// nodes without coordinates and ways with missing vertices.
///
/// # Examples
/// ```
/// use crowdmap_core::{ElementKind, Geometry, IdentityKey, Position};
/// use crowdmap_data::ingest::normalize_element;
/// use crowdmap_data::overpass::{RawElement, RawKind};
///
/// let mut node = RawElement::bare(RawKind::Node, 7);
/// node.lat = Some(-24.9);
/// node.lon = Some(33.5);
/// let feature = normalize_element(node).expect("node has coordinates");
/// assert_eq!(feature.identity_key(), Some(IdentityKey::new(7, ElementKind::Node)));
/// assert_eq!(feature.geometry, Some(Geometry::Point { coordinates: Position::new(33.5, -24.9) }));
/// ```
pub fn normalize_element(element: RawElement) -> Result<Feature, Rejection> {
    let (kind, geometry) = match element.kind {
        RawKind::Node => (ElementKind::Node, geometry::node(&element)?),
        RawKind::Way => (ElementKind::Way, geometry::way(&element)?),
        RawKind::Relation => (ElementKind::Relation, geometry::relation(&element)?),
        RawKind::Unknown => {
            return Err(Rejection::Malformed {
                reason: "unknown element kind",
            });
        }
    };
    Ok(Feature::new(properties(element, kind), Some(geometry)))
}

/// Normalise a batch, counting rejections by reason.
///
/// Entries that failed to decode count as malformed.
#[must_use]
pub fn normalize_elements<I>(records: I) -> NormalizeReport
where
    I: IntoIterator,
    I::Item: Into<RawRecord>,
{
    let mut report = NormalizeReport::default();
    for record in records {
        let (id, outcome) = match record.into() {
            RawRecord::Element(element) => (element.id, normalize_element(element)),
            RawRecord::Undecodable { id, message } => {
                debug!("element {id:?} did not decode: {message}");
                let reason = "undecodable element";
                (id, Err(Rejection::Malformed { reason }))
            }
        };
        if let Err(rejection) = &outcome {
            debug!("dropped element {id:?}: {rejection}");
        }
        report.record(outcome);
    }
    info!(
        "normalised {} features ({} without geometry, {} malformed)",
        report.features.len(),
        report.dropped_no_geometry,
        report.dropped_malformed
    );
    report
}

fn properties(element: RawElement, kind: ElementKind) -> Properties {
    let mut properties = Properties::new();
    if let Some(id) = element.id {
        properties.insert(ID_PROPERTY.to_owned(), Value::from(id));
    }
    properties.insert(KIND_PROPERTY.to_owned(), Value::from(kind.as_str()));
    insert_present(&mut properties, "timestamp", element.timestamp);
    insert_present(&mut properties, "version", element.version);
    insert_present(&mut properties, "changeset", element.changeset);
    insert_present(&mut properties, "user", element.user);
    insert_present(&mut properties, "uid", element.uid);
    if let Some(tags) = element.tags {
        tags::propagate(&mut properties, tags);
    }
    properties
}

fn insert_present<T: Into<Value>>(properties: &mut Properties, key: &str, value: Option<T>) {
    if let Some(value) = value {
        properties.insert(key.to_owned(), value.into());
    }
}
