//! Raw element model of Overpass `out meta geom` responses.

use crowdmap_core::Properties;
use serde::Deserialize;
use serde_json::Value;

/// Top-level Overpass JSON response.
///
/// Elements are kept as untyped JSON so one bad entry cannot fail the whole
/// document; [`OverpassResponse::into_records`] decodes them one by one.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OverpassResponse {
    /// Returned elements in server order.
    #[serde(default)]
    pub elements: Vec<Value>,
}

impl OverpassResponse {
    /// Decode each element independently.
    #[must_use]
    pub fn into_records(self) -> Vec<RawRecord> {
        self.elements.into_iter().map(RawRecord::decode).collect()
    }
}

/// One entry of a response, decoded independently of its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// A well-formed element.
    Element(RawElement),
    /// An entry that did not match the element shape.
    Undecodable {
        /// The entry's `id`, when it carried a numeric one.
        id: Option<i64>,
        /// Decoder message.
        message: String,
    },
}

impl RawRecord {
    /// Decode one response entry.
    #[must_use]
    pub fn decode(value: Value) -> Self {
        let id = value.get("id").and_then(Value::as_i64);
        match serde_json::from_value(value) {
            Ok(element) => Self::Element(element),
            Err(err) => Self::Undecodable {
                id,
                message: err.to_string(),
            },
        }
    }
}

impl From<RawElement> for RawRecord {
    fn from(element: RawElement) -> Self {
        Self::Element(element)
    }
}

/// Element kind as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    /// Point entity.
    Node,
    /// Path entity.
    Way,
    /// Area or grouping entity.
    Relation,
    /// Anything else the server may emit (`area`, `count`, ...).
    #[serde(other)]
    Unknown,
}

/// A vertex of a way's inline geometry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawVertex {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Bounding extent reported for ways and relations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawBounds {
    /// Minimum latitude.
    pub minlat: f64,
    /// Minimum longitude.
    pub minlon: f64,
    /// Maximum latitude.
    pub maxlat: f64,
    /// Maximum longitude.
    pub maxlon: f64,
}

/// One element as returned by the remote query service.
///
/// Every field except the kind is optional: the normalizer decides which
/// combinations are usable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawElement {
    /// Element kind.
    #[serde(rename = "type")]
    pub kind: RawKind,
    /// Element identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Node latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Node longitude.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Inline way geometry; missing vertices appear as `null`.
    #[serde(default)]
    pub geometry: Option<Vec<Option<RawVertex>>>,
    /// Bounding extent of ways and relations.
    #[serde(default)]
    pub bounds: Option<RawBounds>,
    /// Last modification time.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Revision number.
    #[serde(default)]
    pub version: Option<i64>,
    /// Changeset of the last modification.
    #[serde(default)]
    pub changeset: Option<i64>,
    /// Contributor display name.
    #[serde(default)]
    pub user: Option<String>,
    /// Contributor identifier.
    #[serde(default)]
    pub uid: Option<i64>,
    /// Nested tag mapping.
    #[serde(default)]
    pub tags: Option<Properties>,
}

impl RawElement {
    /// An element of `kind` with every optional field unset.
    #[must_use]
    pub const fn bare(kind: RawKind, id: i64) -> Self {
        Self {
            kind,
            id: Some(id),
            lat: None,
            lon: None,
            geometry: None,
            bounds: None,
            timestamp: None,
            version: None,
            changeset: None,
            user: None,
            uid: None,
            tags: None,
        }
    }
}
