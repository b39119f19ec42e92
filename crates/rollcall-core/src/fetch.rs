//! Outcome of fetching data from the attendance API.
//!
//! A failed fetch and a fetch that returned nothing are different facts: an
//! empty day means nobody has been marked yet, an unavailable day means we do
//! not know. Callers wrap whatever the client returned in [`Fetch`] so the
//! reconciler can tell them apart.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Available(T),
    /// The fetch failed; carries a human-readable reason.
    Unavailable(String),
}

impl<T> Fetch<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Available(value),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }

    pub fn available(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

impl<T: Default> Fetch<T> {
    /// The fetched value, or `T::default()` when unavailable.
    pub fn unwrap_or_default(self) -> T {
        self.available().unwrap_or_default()
    }
}
