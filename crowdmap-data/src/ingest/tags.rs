//! Tag propagation into feature properties.

use crowdmap_core::Properties;
use serde_json::Value;

/// Tag keys copied to the top level of a feature's properties.
pub const FLATTENED_TAGS: [&str; 6] = [
    "name", "building", "highway", "waterway", "landuse", "amenity",
];

const TAGS_PROPERTY: &str = "tags";

/// Copy `tags` wholesale under `tags` and flatten the allowlisted keys.
pub(super) fn propagate(properties: &mut Properties, tags: Properties) {
    for key in FLATTENED_TAGS {
        if let Some(value) = tags.get(key) {
            properties.insert(key.to_owned(), value.clone());
        }
    }
    properties.insert(TAGS_PROPERTY.to_owned(), Value::Object(tags));
}
