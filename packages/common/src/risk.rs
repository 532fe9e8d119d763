#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Early-warning classification of a student's standing in one subject.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum RiskLevel {
    #[serde(rename = "low")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "low"))]
    Low,
    #[serde(rename = "medium")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "medium"))]
    Medium,
    #[serde(rename = "high")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "high"))]
    High,
    /// Nothing has been recorded yet. Not the same as a grade of zero.
    #[serde(rename = "no-data")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "no-data"))]
    NoData,
}

impl RiskLevel {
    pub const ALL: &'static [RiskLevel] = &[Self::Low, Self::Medium, Self::High, Self::NoData];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::NoData => "no-data",
        }
    }

    /// Ordering used when a student's worst subject decides their overall level.
    /// `NoData` ranks below every real level.
    pub fn severity(&self) -> u8 {
        match self {
            Self::NoData => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::NoData
    }
}

impl FromStr for RiskLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "no-data" => Ok(Self::NoData),
            _ => Err(ParseEnumError::new("risk level", s, "low, medium, high, no-data")),
        }
    }
}

/// Urgency attached to a piece of advice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}
