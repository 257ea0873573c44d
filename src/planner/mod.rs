pub mod agenda;
pub mod event;
pub mod group;
pub mod marking;
pub mod mutation;
pub mod store;
pub mod trip;

use chrono::NaiveDate;

pub use event::Event;
pub use group::AppSession;
pub use marking::{compute_markings, DayMarking, MarkingPalette, Markings};
pub use mutation::Optimistic;
pub use store::Store;
pub use trip::{Trip, TripStatus};

/// Parse a stored date, ignoring anything after the `yyyy-MM-dd` prefix.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
