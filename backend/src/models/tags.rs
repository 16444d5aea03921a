//! Context tags: the eligibility signals an event definition can require
//!
//! Tags are written in catalog data as strings. Parsing ignores case,
//! underscores, hyphens and spaces, so `money_low`, `MoneyLow` and
//! `money-low` are the same tag. The KYK status tag carries its expected
//! value after a colon or equals sign: `kyk_status:suspended`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A required context signal on an [`EventDefinition`](super::EventDefinition)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContextTag {
    // Calendar
    ExamWindow,
    InflationDay,
    KykPayday,
    FirstSemester,
    SecondSemester,

    // Numeric flags (at least a threshold)
    DebtPressure,
    WorkStrain,
    Burnout,
    KykRisk,
    IllegalFinePending,

    // Text flag equality
    KykStatus(String),

    // Stat bands
    MoneyLow,
    MoneyHigh,
    MentalLow,
    MentalHigh,
    EnergyLow,
    EnergyHigh,
    AcademicLow,
    AcademicHigh,
}

impl ContextTag {
    /// True for tags that can only be answered by a stat store
    pub fn needs_stats(&self) -> bool {
        matches!(
            self,
            ContextTag::MoneyLow
                | ContextTag::MoneyHigh
                | ContextTag::MentalLow
                | ContextTag::MentalHigh
                | ContextTag::EnergyLow
                | ContextTag::EnergyHigh
                | ContextTag::AcademicLow
                | ContextTag::AcademicHigh
        )
    }

    /// Canonical snake_case name (without the KYK status value)
    pub fn name(&self) -> &'static str {
        match self {
            ContextTag::ExamWindow => "exam_window",
            ContextTag::InflationDay => "inflation_day",
            ContextTag::KykPayday => "kyk_payday",
            ContextTag::FirstSemester => "first_semester",
            ContextTag::SecondSemester => "second_semester",
            ContextTag::DebtPressure => "debt_pressure",
            ContextTag::WorkStrain => "work_strain",
            ContextTag::Burnout => "burnout",
            ContextTag::KykRisk => "kyk_risk",
            ContextTag::IllegalFinePending => "illegal_fine_pending",
            ContextTag::KykStatus(_) => "kyk_status",
            ContextTag::MoneyLow => "money_low",
            ContextTag::MoneyHigh => "money_high",
            ContextTag::MentalLow => "mental_low",
            ContextTag::MentalHigh => "mental_high",
            ContextTag::EnergyLow => "energy_low",
            ContextTag::EnergyHigh => "energy_high",
            ContextTag::AcademicLow => "academic_low",
            ContextTag::AcademicHigh => "academic_high",
        }
    }
}

/// Tag string that matched no known tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown context tag '{0}'")]
pub struct UnknownTag(pub String);

impl FromStr for ContextTag {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        if let Some(split_at) = trimmed.find([':', '=']) {
            let (name, value) = trimmed.split_at(split_at);
            let value = value[1..].trim();
            if squash(name) == "kykstatus" && !value.is_empty() {
                return Ok(ContextTag::KykStatus(value.to_lowercase()));
            }
            return Err(UnknownTag(raw.to_string()));
        }

        let tag = match squash(trimmed).as_str() {
            "examwindow" | "exam" => ContextTag::ExamWindow,
            "inflationday" | "inflationshock" => ContextTag::InflationDay,
            "kykpayday" => ContextTag::KykPayday,
            "firstsemester" => ContextTag::FirstSemester,
            "secondsemester" => ContextTag::SecondSemester,
            "debtpressure" => ContextTag::DebtPressure,
            "workstrain" => ContextTag::WorkStrain,
            "burnout" => ContextTag::Burnout,
            "kykrisk" | "kykriskdays" => ContextTag::KykRisk,
            "illegalfinepending" => ContextTag::IllegalFinePending,
            "moneylow" => ContextTag::MoneyLow,
            "moneyhigh" => ContextTag::MoneyHigh,
            "mentallow" => ContextTag::MentalLow,
            "mentalhigh" => ContextTag::MentalHigh,
            "energylow" => ContextTag::EnergyLow,
            "energyhigh" => ContextTag::EnergyHigh,
            "academiclow" => ContextTag::AcademicLow,
            "academichigh" => ContextTag::AcademicHigh,
            _ => return Err(UnknownTag(raw.to_string())),
        };
        Ok(tag)
    }
}

impl TryFrom<String> for ContextTag {
    type Error = UnknownTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContextTag> for String {
    fn from(tag: ContextTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextTag::KykStatus(value) => write!(f, "kyk_status:{}", value),
            other => f.write_str(other.name()),
        }
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
