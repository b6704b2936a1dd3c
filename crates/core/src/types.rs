use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DataIntegrityError;

/// Unique identifier for a project (lowercase key in the table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployment status of a website or dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Live,
    Development,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Development => "development",
        }
    }

    /// Case-insensitive comparison against a user supplied filter value
    pub fn matches(&self, filter: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(filter.trim())
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single project entry.
///
/// Serializes with the display keys used in tool output (`website status`,
/// `deployment platform`, ...) and deserializes from snake_case keys in
/// catalog files. The id is the table key and is never part of the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing)]
    pub id: ProjectId,
    pub name: String,
    #[serde(rename(serialize = "website status"))]
    pub website_status: ProjectStatus,
    #[serde(rename(serialize = "dashboard status"))]
    pub dashboard_status: ProjectStatus,
    #[serde(rename(serialize = "deployment platform"))]
    pub platform: String,
    pub cost: String,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        website_status: ProjectStatus,
        dashboard_status: ProjectStatus,
        platform: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        Self {
            id: ProjectId::new(id),
            name: name.into(),
            website_status,
            dashboard_status,
            platform: platform.into(),
            cost: cost.into(),
        }
    }

    /// Parse the monthly magnitude out of the display cost
    pub fn monthly_cost(&self) -> Result<Money, DataIntegrityError> {
        Money::parse_monthly(&self.cost).ok_or_else(|| DataIntegrityError {
            project_id: self.id.clone(),
            value: self.cost.clone(),
        })
    }
}

/// Non-negative exact decimal amount of money.
///
/// Stored as `units / 10^scale` with trailing fractional zeros stripped, so
/// equal amounts compare equal whatever precision they were written with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Money {
    units: u128,
    scale: u32,
}

/// Largest fractional precision kept exactly
const MAX_SCALE: u32 = 18;

impl Money {
    pub const ZERO: Money = Money { units: 0, scale: 0 };

    pub fn from_cents(cents: u64) -> Self {
        Self::normalized(u128::from(cents), 2)
    }

    fn normalized(mut units: u128, mut scale: u32) -> Self {
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        Self { units, scale }
    }

    /// Parse a cost string such as `$20/mo`, `45`, `$12.50 /mo`, `.5` or `0`.
    ///
    /// The currency symbol and period suffix are optional. Any non-negative
    /// decimal is accepted exactly; returns `None` for everything else.
    pub fn parse_monthly(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix("/mo").unwrap_or(trimmed).trim();

        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let frac = frac.trim_end_matches('0');
        let scale = u32::try_from(frac.len()).ok().filter(|s| *s <= MAX_SCALE)?;

        let digits = format!("{}{}", whole, frac);
        let units: u128 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
        Some(Self::normalized(units, scale))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        let scale = self.scale.max(other.scale);
        let lhs = self.units.checked_mul(10u128.checked_pow(scale - self.scale)?)?;
        let rhs = other.units.checked_mul(10u128.checked_pow(scale - other.scale)?)?;
        lhs.checked_add(rhs).map(|units| Self::normalized(units, scale))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "${}", self.units);
        }
        let divisor = 10u128.pow(self.scale);
        let whole = self.units / divisor;
        let frac = self.units % divisor;
        // Cents always show two digits; finer amounts show every digit
        let width = self.scale.max(2) as usize;
        let frac = frac * 10u128.pow(width as u32 - self.scale);
        write!(f, "${}.{:0width$}", whole, frac, width = width)
    }
}
