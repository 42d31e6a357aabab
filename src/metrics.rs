//! Summary counts shown on the metric cards

use std::collections::BTreeMap;
use std::str::FromStr;

use arrow::array::StringArray;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::filter::expr::{Expr, ExpressionFilter};
use crate::schema::{CITY, COMMENT, NAMES, ONBOARDER, TYPE_OF_PARTNER};

/// How status keywords are matched against the `comment` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordMatching {
    /// Case-insensitive substring; "driving" also matches "not driving"
    #[default]
    Substring,
    /// Like [`Self::Substring`], but a keyword does not match comments
    /// containing its negation (`"not " + keyword`)
    ExcludeNegated,
}

impl FromStr for KeywordMatching {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "exclude-negated" | "exclude_negated" => Ok(Self::ExcludeNegated),
            other => Err(DashboardError::Config(format!(
                "Unknown keyword matching mode '{other}', expected 'substring' or 'exclude-negated'"
            ))),
        }
    }
}

/// Colour of a metric card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Large,
    LargeBlue,
    LargeGreen,
    Blue,
    Green,
    Red,
}

impl CardTone {
    /// CSS classes for the card
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Large => "metric-card large",
            Self::LargeBlue => "metric-card large blue",
            Self::LargeGreen => "metric-card large green",
            Self::Blue => "metric-card blue",
            Self::Green => "metric-card green",
            Self::Red => "metric-card red",
        }
    }
}

/// Every named count the dashboard reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Cities,
    Onboarders,
    PartnerTypes,
    Drivers,
    Driving,
    NotDriving,
    UploadingDocs,
    TripCompleted,
    RewardsExpired,
    PaymentStopped,
    Invalid,
}

impl MetricKind {
    /// Cards in the top row
    pub const SUMMARY: [Self; 3] = [Self::Cities, Self::Onboarders, Self::PartnerTypes];

    /// Cards in the driver status row
    pub const STATUS: [Self; 8] = [
        Self::Drivers,
        Self::Driving,
        Self::NotDriving,
        Self::UploadingDocs,
        Self::TripCompleted,
        Self::RewardsExpired,
        Self::PaymentStopped,
        Self::Invalid,
    ];

    /// Stable name used in the JSON output
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cities => "total_cities",
            Self::Onboarders => "total_onboarders",
            Self::PartnerTypes => "total_partners",
            Self::Drivers => "total_drivers",
            Self::Driving => "total_driving",
            Self::NotDriving => "total_not_driving",
            Self::UploadingDocs => "total_uploading_docs",
            Self::TripCompleted => "total_trip_completed",
            Self::RewardsExpired => "total_rewards_expired",
            Self::PaymentStopped => "total_payment_stopped",
            Self::Invalid => "total_invalid",
        }
    }

    /// Card caption
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cities => "Cities",
            Self::Onboarders => "Onboarders",
            Self::PartnerTypes => "Driving Type",
            Self::Drivers => "Registered Drivers",
            Self::Driving => "Drivers Driving",
            Self::NotDriving => "Drivers Not Driving",
            Self::UploadingDocs => "Uploading Docs",
            Self::TripCompleted => "Trip Completed",
            Self::RewardsExpired => "Rewards Expired",
            Self::PaymentStopped => "Payment Stopped",
            Self::Invalid => "Invalid Account",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Cities => "🏙️",
            Self::Onboarders => "🧑‍🏫",
            Self::PartnerTypes => "🤝",
            Self::Drivers => "🚗",
            Self::Driving => "🟢",
            Self::NotDriving => "🔴",
            Self::UploadingDocs => "📄",
            Self::TripCompleted => "✅",
            Self::RewardsExpired => "🏅",
            Self::PaymentStopped => "💸",
            Self::Invalid => "❌",
        }
    }

    #[must_use]
    pub const fn tone(self) -> CardTone {
        match self {
            Self::Cities => CardTone::Large,
            Self::Onboarders => CardTone::LargeBlue,
            Self::PartnerTypes => CardTone::LargeGreen,
            Self::Drivers | Self::UploadingDocs | Self::PaymentStopped => CardTone::Blue,
            Self::Driving | Self::TripCompleted | Self::Invalid => CardTone::Green,
            Self::NotDriving | Self::RewardsExpired => CardTone::Red,
        }
    }

    /// Status keyword searched in `comment`, for keyword-based metrics
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Driving => Some("driving"),
            Self::NotDriving => Some("not driving"),
            Self::UploadingDocs => Some("uploading docs"),
            Self::TripCompleted => Some("trip completed"),
            Self::RewardsExpired => Some("rewards expired"),
            Self::PaymentStopped => Some("payment stopped"),
            Self::Invalid => Some("invalid"),
            Self::Cities | Self::Onboarders | Self::PartnerTypes | Self::Drivers => None,
        }
    }

    /// Column whose distinct values are counted
    const fn distinct_column(self) -> &'static str {
        match self {
            Self::Cities => CITY,
            Self::Onboarders => ONBOARDER,
            Self::PartnerTypes => TYPE_OF_PARTNER,
            _ => NAMES,
        }
    }
}

/// Named counts over a (filtered) table
///
/// Metrics whose source columns are missing are absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics(BTreeMap<MetricKind, usize>);

impl Metrics {
    #[must_use]
    pub fn get(&self, kind: MetricKind) -> Option<usize> {
        self.0.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k.key(), v)))
    }
}

fn distinct_non_null(column: &StringArray) -> usize {
    column.iter().flatten().collect::<FxHashSet<&str>>().len()
}

/// Predicate selecting rows whose comment carries `keyword`
fn keyword_expr(keyword: &str, matching: KeywordMatching) -> Expr {
    let contains = Expr::ContainsIgnoreCase(COMMENT.to_string(), keyword.to_string());
    match matching {
        KeywordMatching::ExcludeNegated if !keyword.starts_with("not ") => Expr::And(vec![
            contains,
            Expr::Not(Box::new(Expr::ContainsIgnoreCase(
                COMMENT.to_string(),
                format!("not {keyword}"),
            ))),
        ]),
        _ => contains,
    }
}

/// Compute every metric over `dataset`
pub fn calculate_metrics(dataset: &Dataset, matching: KeywordMatching) -> Result<Metrics> {
    let mut counts = BTreeMap::new();

    for kind in MetricKind::SUMMARY.into_iter().chain([MetricKind::Drivers]) {
        if let Some(column) = dataset.string_column(kind.distinct_column())? {
            counts.insert(kind, distinct_non_null(column));
        }
    }

    if dataset.has_column(COMMENT) && dataset.has_column(NAMES) {
        for kind in MetricKind::STATUS {
            let Some(keyword) = kind.keyword() else {
                continue;
            };
            let matching_rows = dataset.filter(&ExpressionFilter::new(keyword_expr(keyword, matching)))?;
            let count = matching_rows
                .string_column(NAMES)?
                .map_or(0, distinct_non_null);
            counts.insert(kind, count);
        }
    }

    Ok(Metrics(counts))
}
