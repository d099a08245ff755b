use chrono::{DateTime, Utc};

use crate::error::Error;

/// One independently fetched piece of a view, with the generation of the
/// dispatch that produced it.
///
/// - success replaces the value and clears the error
/// - a 404 resets the value to its default and records the error
/// - any other failure keeps the last good value and records the error
///
/// A completion older than the one already applied is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice<T> {
    pub value: T,
    pub error: Option<String>,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T: Clone + Default> Slice<T> {
    pub fn new(value: T) -> Self {
        Slice {
            value,
            error: None,
            generation: 0,
            updated_at: None,
        }
    }

    /// `None` when the completion is stale.
    pub fn applied(&self, generation: u64, result: &Result<T, Error>) -> Option<Slice<T>> {
        if generation <= self.generation {
            return None;
        }

        let next = match result {
            Ok(value) => Slice {
                value: value.clone(),
                error: None,
                generation,
                updated_at: Some(Utc::now()),
            },
            Err(e) if e.is_not_found() => Slice {
                value: T::default(),
                error: Some(e.message()),
                generation,
                updated_at: self.updated_at,
            },
            Err(e) => Slice {
                value: self.value.clone(),
                error: Some(e.message()),
                generation,
                updated_at: self.updated_at,
            },
        };
        Some(next)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Has ever received data.
    pub fn is_loaded(&self) -> bool {
        self.updated_at.is_some()
    }
}
