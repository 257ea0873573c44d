use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Planned,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub group_id: String,
    pub destination: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: TripStatus,
}

impl Trip {
    /// A new trip for `group_id`, its status derived from `today`.
    pub fn new(
        group_id: &str,
        destination: &str,
        country: Option<String>,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let mut trip = Self {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            destination: destination.trim().to_string(),
            country: country.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            start_date: Some(start.format("%Y-%m-%d").to_string()),
            end_date: Some(end.format("%Y-%m-%d").to_string()),
            status: TripStatus::Planned,
        };
        trip.status = trip.auto_status(today);
        trip
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_day)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_day)
    }

    /// Inclusive date range, or `None` when either end is missing or malformed.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start()?, self.end()?))
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end().is_some_and(|end| end < today)
    }

    /// Status derived from the end date rather than the stored flag.
    pub fn auto_status(&self, today: NaiveDate) -> TripStatus {
        if self.is_past(today) {
            TripStatus::Completed
        } else {
            TripStatus::Planned
        }
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.span()
            .is_some_and(|(start, end)| start <= day && day <= end)
    }

    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.start().map(|start| (start - today).num_days())
    }

    pub fn range_display(&self) -> String {
        match self.span() {
            Some((start, end)) if start == end => start.format("%b %-d").to_string(),
            Some((start, end)) => {
                format!("{} - {}", start.format("%b %-d"), end.format("%b %-d"))
            }
            None => "Dates TBD".to_string(),
        }
    }
}
