//! # Offence Classification
//!
//! Maps a free-text incident description to one of a closed set of offence
//! categories by ordered keyword matching.
//!
//! ## Priority
//!
//! [`KEYWORD_TABLE`] is ordered, and the order is part of the contract: the
//! first category whose keyword set matches wins. Specialisations come
//! before the general offence they refine, so snatching terms are tested
//! before theft terms. A description such as "they snatched my chain and
//! stole my phone" is SNATCHING.
//!
//! No match is a valid result meaning "to be determined". Callers must never
//! substitute a default category.

use serde::{Deserialize, Serialize};

/// Closed set of offence categories the engine can classify and cite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OffenceCategory {
    /// Dishonest taking of movable property.
    Theft,
    /// Theft by sudden seizure from the person.
    Snatching,
    /// Deception inducing delivery of property.
    Cheating,
    /// Culpable homicide amounting to murder.
    Murder,
    /// Sexual offence as defined by statute.
    Rape,
}

/// Total number of offence categories.
pub const OFFENCE_CATEGORY_COUNT: usize = 5;

impl OffenceCategory {
    /// All categories, in declaration order.
    pub fn all() -> &'static [OffenceCategory; OFFENCE_CATEGORY_COUNT] {
        &[
            Self::Theft,
            Self::Snatching,
            Self::Cheating,
            Self::Murder,
            Self::Rape,
        ]
    }

    /// The canonical string name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theft => "THEFT",
            Self::Snatching => "SNATCHING",
            Self::Cheating => "CHEATING",
            Self::Murder => "MURDER",
            Self::Rape => "RAPE",
        }
    }
}

impl std::fmt::Display for OffenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OffenceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown offence category {s:?}"))
    }
}

/// Ordered (category, keywords) table. Earlier rows take precedence.
pub const KEYWORD_TABLE: &[(OffenceCategory, &[&str])] = &[
    (
        OffenceCategory::Snatching,
        &["snatch", "snatched", "snatching", "grabbed", "chain snatching"],
    ),
    (
        OffenceCategory::Theft,
        &["theft", "stole", "stolen", "steal", "burglary", "robbed"],
    ),
    (
        OffenceCategory::Cheating,
        &["cheat", "cheating", "fraud", "fraudulent", "scam", "deceived"],
    ),
    (
        OffenceCategory::Murder,
        &["murder", "killed", "homicide", "death"],
    ),
    (
        OffenceCategory::Rape,
        &["rape", "sexual assault", "molested"],
    ),
];

/// Classify a free-text description.
///
/// Returns the first category in [`KEYWORD_TABLE`] with any keyword
/// occurring as a substring of the lower-cased text, or `None`.
pub fn classify(description: &str) -> Option<OffenceCategory> {
    let text = description.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(category, _)| *category)
}
