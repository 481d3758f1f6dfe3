//! Contribution statistics over a merged collection.
//!
//! Days are grouped by the first ten characters of each feature's
//! `timestamp` string. The value is never parsed, so malformed timestamps
//! land in whatever bucket their prefix names instead of failing the run.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::feature::{Feature, FeatureCollection};

/// Maximum number of entries kept in [`ContributionStats::top_contributors`].
pub const TOP_CONTRIBUTOR_LIMIT: usize = 20;
/// Bucket used for features without a contributor name.
pub const UNKNOWN_CONTRIBUTOR: &str = "unknown";

const TIMESTAMP_PROPERTY: &str = "timestamp";
const CONTRIBUTOR_PROPERTY: &str = "user";
const DAY_PREFIX_LEN: usize = 10;
const NO_FEATURES_MESSAGE: &str = "No features found";

/// Earliest and latest day seen, if any feature carried a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    /// Lexicographically smallest day key.
    pub earliest: Option<String>,
    /// Lexicographically largest day key.
    pub latest: Option<String>,
}

/// Grouped counts for a non-empty collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionStats {
    /// Number of features analysed.
    pub total_features: usize,
    /// Number of distinct contributor buckets, including `unknown`.
    pub unique_contributors: usize,
    /// `(contributor, count)` pairs, most active first.
    pub top_contributors: Vec<(String, usize)>,
    /// `(day, count)` pairs in ascending day order.
    pub edits_by_date: Vec<(String, usize)>,
    /// Bounds of `edits_by_date`.
    pub date_range: DateRange,
}

/// Outcome of [`analyze_contributions`].
///
/// An empty collection is reported explicitly rather than as zeroed counters.
/// It serialises as `{"error": "No features found"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributionAnalysis {
    /// The collection contained no features.
    NoFeatures,
    /// Counts for a non-empty collection.
    Stats(ContributionStats),
}

impl ContributionAnalysis {
    /// Borrow the statistics, if any.
    #[must_use]
    pub const fn stats(&self) -> Option<&ContributionStats> {
        match self {
            Self::NoFeatures => None,
            Self::Stats(stats) => Some(stats),
        }
    }
}

impl Serialize for ContributionAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoFeatures => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", NO_FEATURES_MESSAGE)?;
                map.end()
            }
            Self::Stats(stats) => stats.serialize(serializer),
        }
    }
}

/// Group a collection's features by contributor and by day.
///
/// Every feature counts towards its contributor (or `unknown`); only features
/// with a non-empty string timestamp count towards a day. Contributors with
/// equal counts keep the order in which they were first encountered.
///
/// # Examples
/// ```
/// use crowdmap_core::{CollectionMetadata, ContributionAnalysis, FeatureCollection, analyze_contributions};
///
/// let empty = FeatureCollection::new(Vec::new(), CollectionMetadata::default());
/// assert_eq!(analyze_contributions(&empty), ContributionAnalysis::NoFeatures);
/// ```
#[must_use]
pub fn analyze_contributions(collection: &FeatureCollection) -> ContributionAnalysis {
    if collection.is_empty() {
        return ContributionAnalysis::NoFeatures;
    }

    let mut contributors: IndexMap<String, usize> = IndexMap::new();
    let mut days: BTreeMap<String, usize> = BTreeMap::new();

    for feature in &collection.features {
        *contributors.entry(contributor_of(feature)).or_insert(0) += 1;
        if let Some(day) = day_of(feature) {
            *days.entry(day).or_insert(0) += 1;
        }
    }

    let unique_contributors = contributors.len();
    let mut top_contributors: Vec<(String, usize)> = contributors.into_iter().collect();
    top_contributors.sort_by(|left, right| right.1.cmp(&left.1));
    top_contributors.truncate(TOP_CONTRIBUTOR_LIMIT);

    let date_range = DateRange {
        earliest: days.keys().next().cloned(),
        latest: days.keys().next_back().cloned(),
    };

    ContributionAnalysis::Stats(ContributionStats {
        total_features: collection.len(),
        unique_contributors,
        top_contributors,
        edits_by_date: days.into_iter().collect(),
        date_range,
    })
}

fn contributor_of(feature: &Feature) -> String {
    match feature.property(CONTRIBUTOR_PROPERTY) {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => UNKNOWN_CONTRIBUTOR.to_owned(),
    }
}

fn day_of(feature: &Feature) -> Option<String> {
    let timestamp = feature.property(TIMESTAMP_PROPERTY)?.as_str()?;
    if timestamp.is_empty() {
        return None;
    }
    Some(timestamp.chars().take(DAY_PREFIX_LEN).collect())
}
