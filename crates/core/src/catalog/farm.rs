//! Farms that sell through the marketplace.

use std::collections::BTreeSet;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FarmId, Rating};

/// A certification a farm holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Certification {
    Organic,
    Sustainable,
    Biodynamic,
    Humane,
}

impl Certification {
    /// Human-readable label for badges.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Sustainable => "Sustainable",
            Self::Biodynamic => "Biodynamic",
            Self::Humane => "Certified Humane",
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A farm listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub description: String,
    /// Image URL.
    pub image: String,
    pub location: String,
    pub specialty: String,
    pub rating: Rating,
    pub certifications: BTreeSet<Certification>,
}

impl Farm {
    /// Whether the farm holds the given certification.
    #[must_use]
    pub fn is_certified(&self, certification: Certification) -> bool {
        self.certifications.contains(&certification)
    }
}
