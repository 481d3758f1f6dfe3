//! File-level centroid pass over a persisted collection.

use camino::{Utf8Path, Utf8PathBuf};
use crowdmap_core::{CollectionMetadata, Feature, SizeReduction, compute_centroids};
use log::info;
use thiserror::Error;

use crate::store::{Layout, PersistError, load_collection, write_collection};

/// Default centroid output path.
pub const DEFAULT_CENTROIDS_PATH: &str = "building_centroids.geojson";
/// Description written into centroid metadata.
pub const CENTROID_DESCRIPTION: &str = "Building centroids for low-zoom rendering";

/// Counts from a centroid pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentroidPassReport {
    /// Features in the input collection.
    pub input_features: usize,
    /// Centroids written.
    pub produced: usize,
    /// Selected features skipped for missing or unreducible geometry.
    pub skipped: usize,
    /// Input and output sizes.
    pub sizes: SizeReduction,
}

/// Failure of a centroid pass.
#[derive(Debug, Error)]
pub enum CentroidPassError {
    /// The input collection does not exist.
    #[error("input collection {path} not found")]
    MissingInput {
        /// Expected input path.
        path: Utf8PathBuf,
    },
    /// Reading, parsing or writing failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Reduce the collection at `input` to centroids of the features accepted by
/// `predicate` and write them compactly to `output`.
///
/// The output is recomputed from scratch; an existing file is replaced.
///
/// # Errors
///
/// Returns [`CentroidPassError::MissingInput`] when `input` does not exist and
/// [`CentroidPassError::Persist`] when it cannot be read or the output cannot
/// be written.
pub fn write_centroids<P>(
    input: &Utf8Path,
    output: &Utf8Path,
    predicate: P,
) -> Result<CentroidPassReport, CentroidPassError>
where
    P: Fn(&Feature) -> bool,
{
    let collection = load_collection(input)?.ok_or_else(|| CentroidPassError::MissingInput {
        path: input.to_owned(),
    })?;
    info!("loaded {} features from {input}", collection.len());
    // Measured before writing: `output` may be the same file as `input`.
    let bytes_in = crowdmap_fs::file_len(input).map_err(|source| PersistError::Read {
        path: input.to_owned(),
        source,
    })?;

    let report = compute_centroids(&collection, predicate);
    let produced = report.produced();
    let skipped = report.skipped;
    let metadata = CollectionMetadata::new(format!("Computed from {input}"), CENTROID_DESCRIPTION);
    let centroids = report.into_collection(metadata);
    let bytes_out = write_collection(output, &centroids, Layout::Compact)?;

    let sizes = SizeReduction {
        bytes_in,
        bytes_out,
    };
    info!(
        "wrote {produced} centroids to {output} ({skipped} skipped, {:.1}% smaller)",
        sizes.percent()
    );
    Ok(CentroidPassReport {
        input_features: collection.len(),
        produced,
        skipped,
        sizes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdmap_core::test_support::{collection_of, keyed_feature};
    use crowdmap_core::{ElementKind, FeatureCollection, Geometry, Position, has_building};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    struct Paths {
        input: Utf8PathBuf,
        output: Utf8PathBuf,
        _dir: TempDir,
    }

    #[fixture]
    fn paths() -> Paths {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        Paths {
            input: root.join("mapping.geojson"),
            output: root.join("out/centroids.geojson"),
            _dir: dir,
        }
    }

    fn square_building(id: i64) -> Feature {
        let mut feature = keyed_feature(id, ElementKind::Way, json!({"building": "yes"}));
        feature.geometry = Some(Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.0, 0.0),
                Position::new(0.0, 2.0),
                Position::new(2.0, 2.0),
                Position::new(2.0, 0.0),
            ]],
        });
        feature
    }

    #[rstest]
    fn writes_compact_centroids_with_provenance(paths: Paths) {
        let mut unreducible = keyed_feature(3, ElementKind::Way, json!({"building": "hut"}));
        unreducible.geometry = None;
        let collection = collection_of(vec![
            square_building(1),
            keyed_feature(2, ElementKind::Way, json!({"highway": "track"})),
            unreducible,
        ]);
        write_collection(&paths.input, &collection, Layout::Pretty).expect("seed input");

        let report = write_centroids(&paths.input, &paths.output, has_building).expect("pass");
        assert_eq!(report.input_features, 3);
        assert_eq!((report.produced, report.skipped), (1, 1));
        assert!(report.sizes.bytes_out < report.sizes.bytes_in);

        let text = crowdmap_fs::read_optional(&paths.output)
            .expect("read")
            .expect("present");
        assert!(!text.contains('\n'));
        let centroids: FeatureCollection = serde_json::from_str(&text).expect("parse");
        assert_eq!(centroids.metadata.count, 1);
        assert_eq!(centroids.metadata.description, CENTROID_DESCRIPTION);
        assert_eq!(centroids.metadata.source, format!("Computed from {}", paths.input));
        let point = centroids.features.first().and_then(|f| f.geometry.clone());
        assert_eq!(
            point,
            Some(Geometry::Point {
                coordinates: Position::new(1.0, 1.0)
            })
        );
    }

    #[rstest]
    fn missing_input_is_reported(paths: Paths) {
        let err = write_centroids(&paths.input, &paths.output, has_building)
            .expect_err("missing input");
        assert!(matches!(err, CentroidPassError::MissingInput { .. }));
        assert!(crowdmap_fs::read_optional(&paths.output).expect("read").is_none());
    }

    #[rstest]
    fn overwriting_the_input_reports_its_original_size(paths: Paths) {
        let collection = collection_of(vec![square_building(1), square_building(2)]);
        let original =
            write_collection(&paths.input, &collection, Layout::Pretty).expect("seed input");

        let report = write_centroids(&paths.input, &paths.input, has_building).expect("pass");

        assert_eq!(report.sizes.bytes_in, original);
        assert_eq!(
            report.sizes.bytes_out,
            crowdmap_fs::file_len(&paths.input).expect("len")
        );
        assert!(report.sizes.bytes_out < report.sizes.bytes_in);
        assert!(report.sizes.percent() > 0.0);
    }
}
