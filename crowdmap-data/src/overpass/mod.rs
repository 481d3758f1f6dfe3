//! Remote element source backed by the Overpass API.
//!
//! [`ElementSource`] performs exactly one query attempt per call. Retrying is
//! the caller's concern: the sync orchestrator wraps every call in
//! [`fetch_with_retry`], so the attempt budget is enforced in one place.
//!
//! # Example
//!
//! ```no_run
//! use crowdmap_core::BoundingBox;
//! use crowdmap_data::overpass::{ElementSource, HttpOverpassSource, OverpassQuery};
//!
//! let source = HttpOverpassSource::new("https://overpass-api.de/api/interpreter")?;
//! let query = OverpassQuery::new(
//!     BoundingBox::new(-25.2, 33.3, -24.7, 33.7),
//!     "2026-01-21",
//!     vec!["building".to_owned()],
//! );
//! let elements = source.fetch(&query)?;
//! println!("received {} elements", elements.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod element;
mod error;
mod http;
mod query;
mod retry;

#[doc(hidden)]
pub mod test_support;

pub use element::{OverpassResponse, RawBounds, RawElement, RawKind, RawRecord, RawVertex};
pub use error::{FetchError, TransportError};
pub use http::{
    DEFAULT_OVERPASS_URL, DEFAULT_USER_AGENT, HttpOverpassSource, HttpOverpassSourceConfig,
    SourceBuildError,
};
pub use query::OverpassQuery;
pub use retry::{fetch_with_retry, fetch_with_retry_using};

/// One attempt at fetching raw elements for a query.
pub trait ElementSource {
    /// Fetch every element matching `query`.
    ///
    /// Entries are decoded one at a time, so a malformed entry arrives as
    /// [`RawRecord::Undecodable`] rather than failing the attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing why the attempt failed.
    fn fetch(&self, query: &OverpassQuery) -> Result<Vec<RawRecord>, TransportError>;
}

impl<S: ElementSource + ?Sized> ElementSource for &S {
    fn fetch(&self, query: &OverpassQuery) -> Result<Vec<RawRecord>, TransportError> {
        (**self).fetch(query)
    }
}
