//! Identity-keyed upsert of freshly fetched features into a collection.

use indexmap::IndexMap;

use crate::feature::{CollectionMetadata, Feature, FeatureCollection, IdentityKey};

/// Result of [`merge`]: the merged collection plus observability counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The merged collection, carrying the metadata supplied to [`merge`].
    pub collection: FeatureCollection,
    /// Incoming features that replaced a feature with the same key.
    pub updated: usize,
    /// Incoming features inserted as new entries.
    pub added: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Keyed(IdentityKey),
    Unkeyed(usize),
}

#[derive(Debug, Default)]
struct FeatureIndex {
    entries: IndexMap<Slot, Feature>,
    unkeyed: usize,
}

impl FeatureIndex {
    /// Insert or replace `feature`, returning `true` if it replaced an entry.
    fn upsert(&mut self, feature: Feature) -> bool {
        let slot = match feature.identity_key() {
            Some(key) => Slot::Keyed(key),
            None => {
                self.unkeyed += 1;
                Slot::Unkeyed(self.unkeyed)
            }
        };
        self.entries.insert(slot, feature).is_some()
    }

    fn into_features(self) -> Vec<Feature> {
        self.entries.into_values().collect()
    }
}

/// Merge `incoming` into `existing`, keyed by [`Feature::identity_key`].
///
/// - A keyed incoming feature replaces the existing feature with the same
///   key wholesale; properties present only on the old feature are lost.
///   A replaced feature keeps the position of the feature it replaced.
/// - Features with new keys are appended in arrival order.
/// - Existing features untouched by `incoming` are carried forward unchanged.
/// - Features without a full key are always appended, never replaced.
///
/// When `existing` is `None` the incoming batch is wrapped on its own, still
/// collapsing duplicate keys within the batch (last one wins).
///
/// Consumers should not rely on the upstream fetch order surviving a merge:
/// the result follows the index's insertion order. Merging the same keyed
/// batch twice yields the same collection as merging it once.
///
/// # Examples
/// ```
/// use crowdmap_core::{CollectionMetadata, Feature, FeatureCollection, merge};
/// use serde_json::json;
///
/// let feature = |v: i64| {
///     Feature::new(
///         json!({"osm_id": 5, "osm_type": "way", "v": v}).as_object().cloned().unwrap_or_default(),
///         None,
///     )
/// };
/// let baseline = FeatureCollection::new(vec![feature(1)], CollectionMetadata::default());
/// let outcome = merge(Some(baseline), vec![feature(2)], CollectionMetadata::default());
/// assert_eq!(outcome.updated, 1);
/// assert_eq!(outcome.collection.features, vec![feature(2)]);
/// ```
#[must_use]
pub fn merge(
    existing: Option<FeatureCollection>,
    incoming: Vec<Feature>,
    metadata: CollectionMetadata,
) -> MergeOutcome {
    let mut index = FeatureIndex::default();
    if let Some(collection) = existing {
        for feature in collection.features {
            index.upsert(feature);
        }
    }

    let mut updated = 0;
    let mut added = 0;
    for feature in incoming {
        if index.upsert(feature) {
            updated += 1;
        } else {
            added += 1;
        }
    }

    MergeOutcome {
        collection: FeatureCollection::new(index.into_features(), metadata),
        updated,
        added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    fn feature(properties: Value) -> Feature {
        Feature::new(properties.as_object().cloned().unwrap_or_default(), None)
    }

    fn metadata() -> CollectionMetadata {
        CollectionMetadata::new("test", "merge fixture")
    }

    #[fixture]
    fn baseline() -> FeatureCollection {
        FeatureCollection::new(
            vec![
                feature(json!({"osm_id": 5, "osm_type": "way", "v": 1, "curated": true})),
                feature(json!({"osm_id": 6, "osm_type": "node", "v": 1})),
            ],
            metadata(),
        )
    }

    #[rstest]
    fn replaces_matching_keys_and_keeps_untouched(baseline: FeatureCollection) {
        let incoming = vec![feature(json!({"osm_id": 5, "osm_type": "way", "v": 2}))];
        let outcome = merge(Some(baseline), incoming, metadata());

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 0);
        assert_eq!(
            outcome.collection.features,
            vec![
                feature(json!({"osm_id": 5, "osm_type": "way", "v": 2})),
                feature(json!({"osm_id": 6, "osm_type": "node", "v": 1})),
            ]
        );
        assert_eq!(outcome.collection.metadata.count, 2);
    }

    #[rstest]
    fn appends_new_keys(baseline: FeatureCollection) {
        let incoming = vec![feature(json!({"osm_id": 5, "osm_type": "node"}))];
        let outcome = merge(Some(baseline), incoming, metadata());
        assert_eq!(outcome.added, 1, "same id with another kind is a new key");
        assert_eq!(outcome.collection.len(), 3);
    }

    #[rstest]
    fn merging_twice_is_idempotent(baseline: FeatureCollection) {
        let batch = vec![
            feature(json!({"osm_id": 5, "osm_type": "way", "v": 3})),
            feature(json!({"osm_id": 7, "osm_type": "relation", "v": 1})),
        ];
        let once = merge(Some(baseline), batch.clone(), metadata()).collection;
        let twice = merge(Some(once.clone()), batch, metadata()).collection;
        assert_eq!(once, twice);
    }

    #[rstest]
    fn unkeyed_features_are_never_deduplicated(baseline: FeatureCollection) {
        let anonymous = feature(json!({"osm_type": "way", "v": 9}));
        let outcome = merge(
            Some(baseline),
            vec![anonymous.clone(), anonymous.clone()],
            metadata(),
        );
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.collection.len(), 4);
    }

    #[rstest]
    fn absent_baseline_wraps_incoming_with_fresh_metadata() {
        let incoming = vec![
            feature(json!({"osm_id": 1, "osm_type": "node", "v": 1})),
            feature(json!({"osm_id": 2, "osm_type": "node"})),
            feature(json!({"osm_id": 1, "osm_type": "node", "v": 2})),
        ];
        let fresh = metadata().generated_at("2026-01-25T00:00:00Z");
        let outcome = merge(None, incoming, fresh.clone());
        assert_eq!(outcome.collection.len(), 2);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.collection.metadata.generated_at, fresh.generated_at);
    }

    #[rstest]
    fn empty_batch_preserves_the_baseline(baseline: FeatureCollection) {
        let features = baseline.features.clone();
        let outcome = merge(Some(baseline), Vec::new(), metadata());
        assert_eq!(outcome.collection.features, features);
        assert_eq!((outcome.updated, outcome.added), (0, 0));
    }
}
