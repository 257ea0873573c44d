use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::parse_day;

/// Built-in event categories. Anything else is a custom category name.
pub const EVENT_KINDS: [&str; 5] = ["dinner", "anniversary", "reminder", "activity", "other"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reminder: bool,
}

fn default_kind() -> String {
    "activity".to_string()
}

impl Event {
    /// Calendar day the event lands on, normalized from the stored date.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_day)
    }

    pub fn clock(&self) -> Option<NaiveTime> {
        let time = self.time.as_deref()?.trim();
        NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .ok()
    }

    pub fn time_display(&self) -> String {
        if self.is_all_day {
            return "All day".to_string();
        }
        match self.clock() {
            Some(t) => t.format("%H:%M").to_string(),
            None => "--:--".to_string(),
        }
    }

    pub fn kind_label(&self) -> String {
        let mut chars = self.kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Other".to_string(),
        }
    }
}
