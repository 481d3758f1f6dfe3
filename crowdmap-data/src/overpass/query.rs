//! Overpass QL construction.

use crowdmap_core::BoundingBox;

const ELEMENT_KINDS: [&str; 3] = ["node", "way", "relation"];

/// Parameters of one incremental query.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    /// Area to search.
    pub bbox: BoundingBox,
    /// Calendar date (`YYYY-MM-DD`); elements modified since its midnight UTC
    /// are returned.
    pub since: String,
    /// Tag keys an element must carry to be returned.
    pub filters: Vec<String>,
}

impl OverpassQuery {
    /// Construct a query.
    #[must_use]
    pub fn new(bbox: BoundingBox, since: impl Into<String>, filters: Vec<String>) -> Self {
        Self {
            bbox,
            since: since.into(),
            filters,
        }
    }

    /// Lower bound of the modification window as an Overpass timestamp.
    #[must_use]
    pub fn newer_than(&self) -> String {
        format!("{}T00:00:00Z", self.since)
    }

    /// Render the query as Overpass QL.
    ///
    /// # Examples
    /// ```
    /// use crowdmap_core::BoundingBox;
    /// use crowdmap_data::overpass::OverpassQuery;
    ///
    /// let query = OverpassQuery::new(
    ///     BoundingBox::new(-25.2, 33.3, -24.7, 33.7),
    ///     "2026-01-21",
    ///     vec!["building".to_owned()],
    /// );
    /// let ql = query.to_ql();
    /// assert!(ql.contains(r#"way["building"](newer:"2026-01-21T00:00:00Z")(-25.2,33.3,-24.7,33.7);"#));
    /// assert!(ql.ends_with("out meta geom;\n"));
    /// ```
    #[must_use]
    pub fn to_ql(&self) -> String {
        let newer = self.newer_than();
        let mut ql = String::from("[out:json][timeout:300];\n(\n");
        for filter in &self.filters {
            for kind in ELEMENT_KINDS {
                ql.push_str(&format!(
                    "  {kind}[\"{filter}\"](newer:\"{newer}\")({});\n",
                    self.bbox
                ));
            }
        }
        ql.push_str(");\nout meta geom;\n");
        ql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn emits_one_clause_per_kind_and_filter() {
        let query = OverpassQuery::new(
            BoundingBox::new(-25.2, 33.3, -24.7, 33.7),
            "2026-01-30",
            vec!["building".to_owned(), "waterway".to_owned()],
        );
        let ql = query.to_ql();
        assert!(ql.starts_with("[out:json][timeout:300];\n(\n"));
        assert_eq!(ql.matches("(newer:\"2026-01-30T00:00:00Z\")").count(), 6);
        assert!(ql.contains("  relation[\"waterway\"](newer:\"2026-01-30T00:00:00Z\")(-25.2,33.3,-24.7,33.7);\n"));
    }

    #[rstest]
    fn empty_filters_produce_an_empty_union() {
        let query = OverpassQuery::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "2026-01-21", Vec::new());
        assert_eq!(query.to_ql(), "[out:json][timeout:300];\n(\n);\nout meta geom;\n");
    }
}
