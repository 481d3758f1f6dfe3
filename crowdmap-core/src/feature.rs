//! Features, identity keys and feature collections.
//!
//! A feature's identity is the pair of its OpenStreetMap element id and
//! element kind, stored in the `osm_id` and `osm_type` properties. Features
//! missing either half have no identity and are never deduplicated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Property holding the source element identifier.
pub const ID_PROPERTY: &str = "osm_id";
/// Property holding the source element kind.
pub const KIND_PROPERTY: &str = "osm_type";

/// Open property mapping carried by every feature.
pub type Properties = Map<String, Value>;

/// Kind of source element a feature was derived from.
///
/// # Examples
/// ```
/// use crowdmap_core::ElementKind;
///
/// assert_eq!(ElementKind::Way.as_str(), "way");
/// assert_eq!("relation".parse::<ElementKind>(), Ok(ElementKind::Relation));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A point entity.
    Node,
    /// A path entity, open or closed.
    Way,
    /// An area or grouping entity.
    Relation,
}

impl ElementKind {
    /// Return the kind as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            _ => Err(format!("unknown element kind '{s}'")),
        }
    }
}

/// Composite identity used to upsert features across merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// Source element identifier.
    pub id: i64,
    /// Source element kind.
    pub kind: ElementKind,
}

impl IdentityKey {
    /// Construct a key from its two components.
    #[must_use]
    pub const fn new(id: i64, kind: ElementKind) -> Self {
        Self { id, kind }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// A GeoJSON feature.
///
/// `geometry` is `None` when the source could not be represented; such
/// features serialise with `"geometry": null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    /// Open property mapping, including provenance and identity fields.
    #[serde(default)]
    pub properties: Properties,
    /// Geometry, if representable.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Construct a feature from its parts.
    #[must_use]
    pub const fn new(properties: Properties, geometry: Option<Geometry>) -> Self {
        Self {
            properties,
            geometry,
        }
    }

    /// Identity key derived from the `osm_id` and `osm_type` properties.
    ///
    /// Returns `None` unless both are present and well-formed.
    ///
    /// # Examples
    /// ```
    /// use crowdmap_core::{ElementKind, Feature, IdentityKey};
    /// use serde_json::json;
    ///
    /// let properties = json!({"osm_id": 5, "osm_type": "way"});
    /// let feature = Feature::new(properties.as_object().cloned().unwrap_or_default(), None);
    /// assert_eq!(feature.identity_key(), Some(IdentityKey::new(5, ElementKind::Way)));
    /// ```
    #[must_use]
    pub fn identity_key(&self) -> Option<IdentityKey> {
        let id = self.properties.get(ID_PROPERTY)?.as_i64()?;
        let kind = self
            .properties
            .get(KIND_PROPERTY)?
            .as_str()?
            .parse::<ElementKind>()
            .ok()?;
        Some(IdentityKey::new(id, kind))
    }

    /// Look up a property value, treating JSON `null` as absent.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|value| !value.is_null())
    }
}

/// Provenance attached to a persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Where the features came from.
    #[serde(default)]
    pub source: String,
    /// RFC 3339 UTC timestamp of when the collection was produced.
    #[serde(default, alias = "extracted", skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Number of features in the collection.
    #[serde(default, alias = "feature_count")]
    pub count: usize,
}

impl CollectionMetadata {
    /// Construct metadata with a source and description; the count is filled
    /// in when the metadata is attached to a collection.
    #[must_use]
    pub fn new(source: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            generated_at: None,
            description: description.into(),
            count: 0,
        }
    }

    /// Stamp the metadata with a generation timestamp.
    #[must_use]
    pub fn generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }
}

/// A GeoJSON feature collection with crowdmap provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    /// Features in collection order.
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Provenance and count.
    #[serde(default)]
    pub metadata: CollectionMetadata,
}

impl FeatureCollection {
    /// Wrap features with metadata, setting the metadata count.
    ///
    /// # Examples
    /// ```
    /// use crowdmap_core::{CollectionMetadata, FeatureCollection};
    ///
    /// let collection = FeatureCollection::new(Vec::new(), CollectionMetadata::new("test", "empty"));
    /// assert_eq!(collection.metadata.count, 0);
    /// ```
    #[must_use]
    pub fn new(features: Vec<Feature>, mut metadata: CollectionMetadata) -> Self {
        metadata.count = features.len();
        Self { features, metadata }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use rstest::rstest;
    use serde_json::json;

    fn feature_from(properties: Value) -> Feature {
        Feature::new(properties.as_object().cloned().unwrap_or_default(), None)
    }

    #[rstest]
    #[case(json!({"osm_id": 6, "osm_type": "node"}), Some(IdentityKey::new(6, ElementKind::Node)))]
    #[case(json!({"osm_id": 6}), None)]
    #[case(json!({"osm_type": "node"}), None)]
    #[case(json!({"osm_id": null, "osm_type": "way"}), None)]
    #[case(json!({"osm_id": "6", "osm_type": "way"}), None)]
    #[case(json!({"osm_id": 6, "osm_type": "area"}), None)]
    fn identity_key_requires_both_components(
        #[case] properties: Value,
        #[case] expected: Option<IdentityKey>,
    ) {
        assert_eq!(feature_from(properties).identity_key(), expected);
    }

    #[rstest]
    fn feature_round_trips_with_null_geometry() {
        let feature = feature_from(json!({"osm_id": 1, "osm_type": "way"}));
        let json = serde_json::to_value(&feature).expect("serialise");
        assert_eq!(
            json,
            json!({"type": "Feature", "properties": {"osm_id": 1, "osm_type": "way"}, "geometry": null})
        );
        let parsed: Feature = serde_json::from_value(json).expect("parse");
        assert_eq!(parsed, feature);
    }

    #[rstest]
    fn collection_reads_legacy_metadata_names() {
        let json = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"osm_id": 1, "osm_type": "node"},
                "geometry": {"type": "Point", "coordinates": [33.5, -24.9]}
            }],
            "metadata": {"source": "s", "extracted": "2026-01-25T10:00:00Z", "description": "d"}
        });
        let parsed: FeatureCollection = serde_json::from_value(json).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed.metadata.generated_at.as_deref(),
            Some("2026-01-25T10:00:00Z")
        );
        assert_eq!(
            parsed.features.first().and_then(|f| f.geometry.clone()),
            Some(Geometry::Point {
                coordinates: Position::new(33.5, -24.9)
            })
        );
    }

    #[rstest]
    fn property_treats_null_as_absent() {
        let feature = feature_from(json!({"building": null, "name": "School"}));
        assert!(feature.property("building").is_none());
        assert_eq!(feature.property("name"), Some(&json!("School")));
    }
}
