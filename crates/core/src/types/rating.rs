//! Bounded farm rating.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside `0.0..=5.0`.
    #[error("rating must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// The rejected value.
        value: Decimal,
        /// Lowest allowed rating.
        min: Decimal,
        /// Highest allowed rating.
        max: Decimal,
    },
}

/// A farm's average review score, from 0 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rating(Decimal);

impl Rating {
    /// Lowest possible rating.
    pub const MIN: Decimal = Decimal::ZERO;
    /// Highest possible rating.
    pub const MAX: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

    /// Create a rating, rejecting values outside `0.0..=5.0`.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] if the value is out of bounds.
    pub fn new(value: Decimal) -> Result<Self, RatingError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Rating {
    type Error = RatingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for Decimal {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
