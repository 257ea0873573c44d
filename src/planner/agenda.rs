use std::cmp::Ordering;

use chrono::NaiveDate;

use super::{Event, Trip, TripStatus};

/// How many upcoming trips and events the agenda lists.
pub const UPCOMING_LIMIT: usize = 3;

/// Planned trips that have not started yet, in source order.
pub fn upcoming_trips(trips: &[Trip], today: NaiveDate) -> Vec<&Trip> {
    trips
        .iter()
        .filter(|t| t.status == TripStatus::Planned)
        .filter(|t| t.start().is_some_and(|start| start > today))
        .take(UPCOMING_LIMIT)
        .collect()
}

pub fn upcoming_events(events: &[Event], today: NaiveDate) -> Vec<&Event> {
    events
        .iter()
        .filter(|e| e.day().is_some_and(|day| day >= today))
        .take(UPCOMING_LIMIT)
        .collect()
}

pub fn trips_on(trips: &[Trip], day: NaiveDate) -> Vec<&Trip> {
    trips.iter().filter(|t| t.covers(day)).collect()
}

/// Events on `day`: all-day first, then by clock time, untimed last.
pub fn events_on(events: &[Event], day: NaiveDate) -> Vec<&Event> {
    let mut found: Vec<&Event> = events.iter().filter(|e| e.day() == Some(day)).collect();
    found.sort_by(|a, b| day_order(a, b));
    found
}

fn day_order(a: &Event, b: &Event) -> Ordering {
    b.is_all_day
        .cmp(&a.is_all_day)
        .then_with(|| match (a.time.as_deref(), b.time.as_deref()) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
