//! Fixed inspection prompt and the next-inspection date it embeds.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_INTERVAL_DAYS: u32 = 1;
pub const MAX_INTERVAL_DAYS: u32 = 30;
pub const DEFAULT_INTERVAL_DAYS: u32 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("inspection interval must be between 1 and 30 days, got {0}")]
    IntervalOutOfRange(i64),

    #[error("inspection interval is not a whole number: {0:?}")]
    NotANumber(String),
}

/// Days until the next recommended inspection, always within `1..=30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct InspectionInterval(u32);

impl InspectionInterval {
    pub fn new(days: i64) -> Result<Self, PromptError> {
        let range = i64::from(MIN_INTERVAL_DAYS)..=i64::from(MAX_INTERVAL_DAYS);
        if !range.contains(&days) {
            return Err(PromptError::IntervalOutOfRange(days));
        }
        // in range, so the narrowing cannot truncate
        Ok(Self(days as u32))
    }

    pub fn days(self) -> u32 {
        self.0
    }
}

impl Default for InspectionInterval {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_DAYS)
    }
}

impl fmt::Display for InspectionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.0)
    }
}

impl FromStr for InspectionInterval {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let days: i64 = trimmed
            .parse()
            .map_err(|_| PromptError::NotANumber(trimmed.to_string()))?;
        Self::new(days)
    }
}

impl TryFrom<i64> for InspectionInterval {
    type Error = PromptError;

    fn try_from(days: i64) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<InspectionInterval> for u32 {
    fn from(interval: InspectionInterval) -> Self {
        interval.0
    }
}

/// `today` plus the interval.
pub fn next_inspection(today: NaiveDate, interval: InspectionInterval) -> NaiveDate {
    today + Days::new(u64::from(interval.days()))
}

/// The instruction sent with every batch. Only the two dates vary.
pub fn build_prompt(today: NaiveDate, interval: InspectionInterval) -> String {
    let next = next_inspection(today, interval);
    format!(
        "You are an inspection assistant.\n\
         Analyze the uploaded images of a substation.\n\
         Detect the components (Insulators, Towers) and classify each as Damaged or Intact.\n\
         Then generate a structured inspection report in clean Markdown.\n\
         \n\
         Today's date: {today}\n\
         Next inspection date: {next}\n\
         \n\
         Format the report like this:\n\
         \n\
         ## Substation Inspection Summary\n\
         \n\
         **Date of Inspection:** YYYY-MM-DD  \n\
         **Substation Name/ID:** Auto-generated if not available  \n\
         \n\
         **Components Inspected:** Insulators, Towers  \n\
         \n\
         **Inspection Results:**\n\
         \n\
         | Component   | Quantity Detected | Intact | Damaged |\n\
         |-------------|------------------:|-------:|--------:|\n\
         | Towers      | X                 | Y      | Z       |\n\
         | Insulators  | X                 | Y      | Z       |\n\
         \n\
         **Summary of Findings:**  \n\
         (Write findings clearly here.)\n\
         \n\
         **Maintenance Recommendations:**  \n\
         (Give actionable advice.)\n\
         \n\
         **Next Inspection Date:** YYYY-MM-DD\n",
        today = today.format(DATE_FORMAT),
        next = next.format(DATE_FORMAT),
    )
}
