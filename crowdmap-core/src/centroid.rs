//! Reduction of a collection to one point per selected feature.
//!
//! The output is recomputed from scratch on every run; it is never merged.

use serde_json::Value;

use crate::feature::{CollectionMetadata, Feature, FeatureCollection, Properties};
use crate::geometry::{Geometry, Position};

/// Property tested by [`has_building`].
pub const BUILDING_PROPERTY: &str = "building";

/// A reduced feature: one point and the source feature's properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidFeature {
    /// Representative point of the source geometry.
    pub position: Position,
    /// Properties copied verbatim from the source feature.
    pub properties: Properties,
}

impl From<CentroidFeature> for Feature {
    fn from(value: CentroidFeature) -> Self {
        Self::new(
            value.properties,
            Some(Geometry::Point {
                coordinates: value.position,
            }),
        )
    }
}

/// Features produced by [`compute_centroids`] and how many were skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CentroidReport {
    /// Reduced features in input order.
    pub centroids: Vec<CentroidFeature>,
    /// Selected features whose geometry was missing or unreducible.
    pub skipped: usize,
}

impl CentroidReport {
    /// Number of centroids produced.
    #[must_use]
    pub fn produced(&self) -> usize {
        self.centroids.len()
    }

    /// Wrap the centroids in a collection carrying `metadata`.
    #[must_use]
    pub fn into_collection(self, metadata: CollectionMetadata) -> FeatureCollection {
        let features = self.centroids.into_iter().map(Feature::from).collect();
        FeatureCollection::new(features, metadata)
    }
}

/// Default selection predicate: the feature has a non-null `building` property.
///
/// # Examples
/// ```
/// use crowdmap_core::{Feature, has_building};
/// use serde_json::json;
///
/// let hut = Feature::new(json!({"building": "hut"}).as_object().cloned().unwrap_or_default(), None);
/// assert!(has_building(&hut));
/// ```
#[must_use]
pub fn has_building(feature: &Feature) -> bool {
    feature
        .property(BUILDING_PROPERTY)
        .is_some_and(|value| !matches!(value, Value::Bool(false)))
}

/// Reduce every feature accepted by `predicate` to its representative point.
///
/// Features rejected by the predicate are ignored silently; accepted features
/// without geometry, or whose geometry is unreducible, are counted in
/// [`CentroidReport::skipped`].
///
/// # Examples
/// ```
/// use crowdmap_core::{CollectionMetadata, Feature, FeatureCollection, Geometry, Position, compute_centroids, has_building};
/// use serde_json::json;
///
/// let hut = Feature::new(
///     json!({"building": "yes"}).as_object().cloned().unwrap_or_default(),
///     Some(Geometry::Point { coordinates: Position::new(1.0, 2.0) }),
/// );
/// let collection = FeatureCollection::new(vec![hut], CollectionMetadata::default());
/// let report = compute_centroids(&collection, has_building);
/// assert_eq!(report.produced(), 1);
/// ```
pub fn compute_centroids<P>(collection: &FeatureCollection, predicate: P) -> CentroidReport
where
    P: Fn(&Feature) -> bool,
{
    let mut report = CentroidReport::default();
    for feature in collection.features.iter().filter(|feature| predicate(feature)) {
        match feature
            .geometry
            .as_ref()
            .and_then(Geometry::representative_point)
        {
            Some(position) => report.centroids.push(CentroidFeature {
                position,
                properties: feature.properties.clone(),
            }),
            None => report.skipped += 1,
        }
    }
    report
}

/// Input and output sizes of a centroid pass, for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReduction {
    /// Size of the source document in bytes.
    pub bytes_in: u64,
    /// Size of the centroid document in bytes.
    pub bytes_out: u64,
}

impl SizeReduction {
    /// Percentage by which the output is smaller than the input.
    ///
    /// Returns `0.0` for an empty input.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "the reduction is a reporting ratio"
    )]
    pub fn percent(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        (1.0 - self.bytes_out as f64 / self.bytes_in as f64) * 100.0
    }
}
