//! Feature builders shared by unit and behaviour tests.

use serde_json::{Value, json};

use crate::{CollectionMetadata, ElementKind, Feature, FeatureCollection, Geometry, Position};

/// Build a keyed feature carrying `extra` properties and a point geometry.
///
/// # Examples
/// ```
/// use crowdmap_core::ElementKind;
/// use crowdmap_core::test_support::keyed_feature;
/// use serde_json::json;
///
/// let feature = keyed_feature(5, ElementKind::Way, json!({"v": 1}));
/// assert!(feature.identity_key().is_some());
/// ```
#[must_use]
pub fn keyed_feature(id: i64, kind: ElementKind, extra: Value) -> Feature {
    let mut properties = json!({"osm_id": id, "osm_type": kind.as_str()})
        .as_object()
        .cloned()
        .unwrap_or_default();
    if let Value::Object(extra) = extra {
        properties.extend(extra);
    }
    Feature::new(
        properties,
        Some(Geometry::Point {
            coordinates: Position::new(33.5, -24.9),
        }),
    )
}

/// Wrap features in a collection with fixed test metadata.
#[must_use]
pub fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection::new(
        features,
        CollectionMetadata::new("test fixture", "crowdmap test collection"),
    )
}
