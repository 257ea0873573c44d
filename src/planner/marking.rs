//! Per-day render descriptors for the month grid.
//!
//! Markings are rebuilt from scratch whenever trips, events or the selected
//! date change. Trips are painted first (later trips overwrite earlier ones on
//! shared days), then events accumulate as dots, then the selection flag is
//! set without touching anything already computed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::{Event, Trip};

pub const PAST_TRIP_COLOR: &str = "#2a9d8f";
pub const FUTURE_TRIP_COLOR: &str = "#e07a5f";
pub const DEFAULT_EVENT_COLOR: &str = "#3d405b";

/// Most event dots a single cell shows.
pub const MAX_VISIBLE_DOTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkingPalette {
    pub past_trip: String,
    pub future_trip: String,
    pub default_event: String,
}

impl Default for MarkingPalette {
    fn default() -> Self {
        Self {
            past_trip: PAST_TRIP_COLOR.to_string(),
            future_trip: FUTURE_TRIP_COLOR.to_string(),
            default_event: DEFAULT_EVENT_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripPosition {
    Single,
    Start,
    Middle,
    End,
}

impl TripPosition {
    fn classify(day: NaiveDate, start: NaiveDate, end: NaiveDate) -> Self {
        if start == end {
            TripPosition::Single
        } else if day == start {
            TripPosition::Start
        } else if day == end {
            TripPosition::End
        } else {
            TripPosition::Middle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripMark {
    pub is_start: bool,
    pub is_end: bool,
    pub position: TripPosition,
    pub color: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDot {
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayMarking {
    pub trip: Option<TripMark>,
    pub events: Vec<EventDot>,
    pub selected: bool,
}

impl DayMarking {
    /// Dot colors as painted: a trip bar recolors its dots for contrast.
    pub fn dot_colors(&self, limit: usize) -> impl Iterator<Item = &str> + '_ {
        let bar = self
            .trip
            .as_ref()
            .filter(|t| t.active)
            .map(|t| t.color.as_str());
        self.events
            .iter()
            .take(limit)
            .map(move |dot| bar.unwrap_or(dot.color.as_str()))
    }

    pub fn hidden_dots(&self, limit: usize) -> usize {
        self.events.len().saturating_sub(limit)
    }
}

pub type Markings = BTreeMap<NaiveDate, DayMarking>;

pub fn compute_markings(
    trips: &[Trip],
    events: &[Event],
    selected: Option<NaiveDate>,
    today: NaiveDate,
    palette: &MarkingPalette,
) -> Markings {
    let mut marks = Markings::new();

    for trip in trips {
        let Some((start, end)) = trip.span() else {
            debug!(trip = %trip.id, "skipping trip without a usable date range");
            continue;
        };

        let color = if end < today {
            &palette.past_trip
        } else {
            &palette.future_trip
        };

        for day in start.iter_days().take_while(|d| *d <= end) {
            let position = TripPosition::classify(day, start, end);
            marks.entry(day).or_default().trip = Some(TripMark {
                is_start: day == start,
                is_end: day == end,
                position,
                color: color.clone(),
                active: true,
            });
        }
    }

    for event in events {
        let Some(day) = event.day() else {
            debug!(event = %event.id, "skipping event without a usable date");
            continue;
        };
        let color = event
            .color
            .clone()
            .unwrap_or_else(|| palette.default_event.clone());
        marks.entry(day).or_default().events.push(EventDot { color });
    }

    if let Some(day) = selected {
        marks.entry(day).or_default().selected = true;
    }

    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::TripStatus;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trip(id: &str, start: &str, end: &str) -> Trip {
        Trip {
            id: id.into(),
            group_id: "g".into(),
            destination: id.into(),
            country: None,
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            status: TripStatus::Planned,
        }
    }

    fn event(id: &str, date: &str, color: Option<&str>) -> Event {
        Event {
            id: id.into(),
            group_id: "g".into(),
            name: id.into(),
            date: Some(date.into()),
            time: None,
            is_all_day: false,
            color: color.map(str::to_string),
            kind: "activity".into(),
            notes: None,
            reminder: false,
        }
    }

    fn compute(trips: &[Trip], events: &[Event], selected: Option<&str>) -> Markings {
        compute_markings(
            trips,
            events,
            selected.map(day),
            day("2024-01-01"),
            &MarkingPalette::default(),
        )
    }

    #[test]
    fn same_inputs_give_same_markings() {
        let trips = vec![trip("a", "2024-06-01", "2024-06-04")];
        let events = vec![event("x", "2024-06-02", Some("#ff0000"))];
        assert_eq!(
            compute(&trips, &events, Some("2024-06-02")),
            compute(&trips, &events, Some("2024-06-02"))
        );
    }

    #[test]
    fn empty_input_has_no_entries() {
        assert!(compute(&[], &[], None).is_empty());
    }

    #[test]
    fn single_day_trip_is_both_ends() {
        let marks = compute(&[trip("a", "2024-06-01", "2024-06-01")], &[], None);
        assert_eq!(marks.len(), 1);
        let mark = marks[&day("2024-06-01")].trip.as_ref().unwrap();
        assert_eq!(mark.position, TripPosition::Single);
        assert!(mark.is_start && mark.is_end && mark.active);
    }

    #[test]
    fn multi_day_trip_positions() {
        let marks = compute(&[trip("a", "2024-06-01", "2024-06-03")], &[], None);
        assert_eq!(marks.len(), 3);
        let position = |d: &str| marks[&day(d)].trip.as_ref().unwrap().position;
        assert_eq!(position("2024-06-01"), TripPosition::Start);
        assert_eq!(position("2024-06-02"), TripPosition::Middle);
        assert_eq!(position("2024-06-03"), TripPosition::End);
    }

    #[test]
    fn later_trip_wins_overlapping_day() {
        // a is still running on the 11th, b ended on the 10th
        let a = trip("a", "2024-07-08", "2024-07-12");
        let b = trip("b", "2024-07-05", "2024-07-10");
        let today = day("2024-07-11");
        let palette = MarkingPalette::default();

        let marks = compute_markings(&[a.clone(), b.clone()], &[], None, today, &palette);
        let mark = marks[&day("2024-07-10")].trip.as_ref().unwrap();
        assert_eq!(mark.color, PAST_TRIP_COLOR);
        assert_eq!(mark.position, TripPosition::End);

        let marks = compute_markings(&[b, a], &[], None, today, &palette);
        let mark = marks[&day("2024-07-10")].trip.as_ref().unwrap();
        assert_eq!(mark.color, FUTURE_TRIP_COLOR);
        assert_eq!(mark.position, TripPosition::Middle);
    }

    #[test]
    fn events_accumulate_in_input_order() {
        let events = vec![
            event("1", "2024-08-05", Some("#111111")),
            event("2", "2024-08-05", Some("#222222")),
            event("3", "2024-08-05", Some("#333333")),
        ];
        let marks = compute(&[], &events, None);
        let colors: Vec<&str> = marks[&day("2024-08-05")]
            .events
            .iter()
            .map(|d| d.color.as_str())
            .collect();
        assert_eq!(colors, ["#111111", "#222222", "#333333"]);
    }

    #[test]
    fn event_without_color_uses_default() {
        let marks = compute(&[], &[event("1", "2024-08-05", None)], None);
        assert_eq!(marks[&day("2024-08-05")].events[0].color, DEFAULT_EVENT_COLOR);
    }

    #[test]
    fn selection_alone_creates_entry() {
        let marks = compute(&[], &[], Some("2024-09-09"));
        assert_eq!(
            marks[&day("2024-09-09")],
            DayMarking {
                trip: None,
                events: vec![],
                selected: true,
            }
        );
    }

    #[test]
    fn selection_keeps_existing_trip_and_events() {
        let marks = compute(
            &[trip("a", "2024-09-08", "2024-09-10")],
            &[event("1", "2024-09-09", None)],
            Some("2024-09-09"),
        );
        let mark = &marks[&day("2024-09-09")];
        assert!(mark.selected);
        assert!(mark.trip.is_some());
        assert_eq!(mark.events.len(), 1);
    }

    #[test]
    fn past_and_future_trip_colors() {
        let today = day("2024-05-10");
        let palette = MarkingPalette::default();
        let trips = vec![
            trip("past", "2024-05-01", "2024-05-09"),
            trip("today", "2024-05-10", "2024-05-10"),
        ];
        let marks = compute_markings(&trips, &[], None, today, &palette);
        assert_eq!(marks[&day("2024-05-09")].trip.as_ref().unwrap().color, PAST_TRIP_COLOR);
        assert_eq!(marks[&day("2024-05-10")].trip.as_ref().unwrap().color, FUTURE_TRIP_COLOR);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let mut broken = trip("broken", "2024-06-01", "2024-06-02");
        broken.end_date = None;
        let mut undated = event("undated", "2024-06-01", None);
        undated.date = Some("someday".into());
        let good = event("good", "2024-06-05", None);

        let marks = compute(&[broken], &[undated, good], None);
        assert_eq!(marks.keys().copied().collect::<Vec<_>>(), [day("2024-06-05")]);
    }

    #[test]
    fn inverted_range_marks_nothing() {
        assert!(compute(&[trip("a", "2024-06-05", "2024-06-01")], &[], None).is_empty());
    }

    #[test]
    fn dots_take_trip_color_and_cap() {
        let events: Vec<Event> = (0..6)
            .map(|i| event(&i.to_string(), "2024-06-02", Some("#abcdef")))
            .collect();
        let marks = compute(&[trip("a", "2024-06-01", "2024-06-03")], &events, None);
        let mark = &marks[&day("2024-06-02")];
        let dots: Vec<&str> = mark.dot_colors(MAX_VISIBLE_DOTS).collect();
        assert_eq!(dots, [FUTURE_TRIP_COLOR; 4]);
        assert_eq!(mark.hidden_dots(MAX_VISIBLE_DOTS), 2);

        let plain = compute(&[], &events[..1], None);
        let dots: Vec<&str> = plain[&day("2024-06-02")].dot_colors(MAX_VISIBLE_DOTS).collect();
        assert_eq!(dots, ["#abcdef"]);
    }
}
