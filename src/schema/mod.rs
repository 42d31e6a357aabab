//! Column conventions of the driver-onboarding export.

pub mod adapters;

use serde::Serialize;

/// Onboarding date, `YYYY-MM-DD` in the source file
pub const DATE: &str = "date";
/// City the driver signed up in
pub const CITY: &str = "city";
/// Partner type (fleet, individual, ...)
pub const TYPE_OF_PARTNER: &str = "type_of_partner";
/// Staff member who onboarded the driver
pub const ONBOARDER: &str = "onboarder";
/// Free-text status comment
pub const COMMENT: &str = "comment";
/// Driver identifier
pub const NAMES: &str = "names";
/// Precomputed week bucket
pub const NEW_WEEK: &str = "new_week";

/// Columns whose nulls are replaced at load time
pub const NULL_FILLED_COLUMNS: [&str; 3] = [TYPE_OF_PARTNER, ONBOARDER, COMMENT];

/// Replacement for missing values in [`NULL_FILLED_COLUMNS`]
pub const NULL_FILL_VALUE: &str = "N/A";

/// A categorical filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// `city` column
    City,
    /// `type_of_partner` column
    TypeOfPartner,
    /// `onboarder` column
    Onboarder,
    /// `comment` column
    Comment,
}

impl Dimension {
    /// All dimensions in sidebar order
    pub const ALL: [Self; 4] = [Self::City, Self::TypeOfPartner, Self::Onboarder, Self::Comment];

    /// Column backing this dimension
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::City => CITY,
            Self::TypeOfPartner => TYPE_OF_PARTNER,
            Self::Onboarder => ONBOARDER,
            Self::Comment => COMMENT,
        }
    }

    /// Label shown above the widget
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::City => "Select City",
            Self::TypeOfPartner => "Select Partner",
            Self::Onboarder => "Select Onboarder",
            Self::Comment => "Select Comment",
        }
    }
}

/// One row of the export, as served by the JSON API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingRecord {
    pub date: Option<chrono::NaiveDate>,
    pub city: Option<String>,
    pub type_of_partner: Option<String>,
    pub onboarder: Option<String>,
    pub comment: Option<String>,
    pub names: Option<String>,
    pub new_week: Option<String>,
}
