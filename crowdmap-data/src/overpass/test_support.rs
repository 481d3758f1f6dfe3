//! Test utilities for element sources.
//!
//! [`StubElementSource`] replays scripted responses without network I/O and
//! records every query it receives.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::element::{RawElement, RawRecord};
use super::error::TransportError;
use super::query::OverpassQuery;
use super::ElementSource;

type Scripted = Result<Vec<RawRecord>, TransportError>;

/// Scripted [`ElementSource`] for tests.
///
/// Responses are returned in order; once the script runs out the last
/// response is repeated.
///
/// # Example
///
/// ```
/// use crowdmap_core::BoundingBox;
/// use crowdmap_data::overpass::test_support::StubElementSource;
/// use crowdmap_data::overpass::{ElementSource, OverpassQuery, TransportError};
///
/// let timeout = TransportError::Timeout { url: "stub".to_owned(), timeout_secs: 1 };
/// let source = StubElementSource::new(vec![Err(timeout), Ok(Vec::new())]);
/// let query = OverpassQuery::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "2026-01-21", Vec::new());
///
/// assert!(source.fetch(&query).is_err());
/// assert_eq!(source.fetch(&query), Ok(Vec::new()));
/// assert_eq!(source.attempts(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubElementSource {
    script: RefCell<VecDeque<Scripted>>,
    last: RefCell<Option<Scripted>>,
    queries: RefCell<Vec<OverpassQuery>>,
}

impl StubElementSource {
    /// Create a source replaying `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            script: RefCell::new(responses.into()),
            ..Self::default()
        }
    }

    /// Create a source that always returns `elements`.
    #[must_use]
    pub fn with_elements(elements: Vec<RawElement>) -> Self {
        Self::new(vec![Ok(elements.into_iter().map(RawRecord::from).collect())])
    }

    /// Create a source that always fails with `error`.
    #[must_use]
    pub fn with_error(error: TransportError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of fetch calls made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.queries.borrow().len()).unwrap_or(u32::MAX)
    }

    /// Queries received so far, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<OverpassQuery> {
        self.queries.borrow().clone()
    }
}

impl ElementSource for StubElementSource {
    fn fetch(&self, query: &OverpassQuery) -> Result<Vec<RawRecord>, TransportError> {
        self.queries.borrow_mut().push(query.clone());
        let next = self.script.borrow_mut().pop_front();
        match next {
            Some(response) => {
                *self.last.borrow_mut() = Some(response.clone());
                response
            }
            None => self.last.borrow().clone().unwrap_or_else(|| Ok(Vec::new())),
        }
    }
}
