use chrono::{Duration, Local, Months, NaiveDate};
use color_eyre::eyre::{eyre, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::components::event_form::EventFormState;
use crate::planner::{
    agenda, compute_markings, AppSession, Event, MarkingPalette, Markings, Optimistic, Store,
    Trip,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel {
    Day,
    Agenda,
}

/// Which records feed the calendar and side panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    All,
    Trips,
    Events,
}

impl Filter {
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Trips,
            Filter::Trips => Filter::Events,
            Filter::Events => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Trips => "Trips",
            Filter::Events => "Events",
        }
    }

    pub fn shows_trips(self) -> bool {
        self != Filter::Events
    }

    pub fn shows_events(self) -> bool {
        self != Filter::Trips
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

pub struct App {
    pub running: bool,
    pub panel: Panel,
    pub filter: Filter,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub session: AppSession,
    pub group_name: String,
    pub trips: Vec<Trip>,
    pub events: Vec<Event>,
    pub markings: Markings,
    pub form_state: Option<EventFormState>,
    pub show_detail: bool,
    pub show_help: bool,
    pub day_scroll: usize,
    pub status_message: Option<String>,
    palette: MarkingPalette,
    store: Store,
}

impl App {
    pub fn new(store: Store, session: AppSession, palette: MarkingPalette) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            running: true,
            panel: Panel::Day,
            filter: Filter::All,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            session,
            group_name: String::new(),
            trips: Vec::new(),
            events: Vec::new(),
            markings: Markings::new(),
            form_state: None,
            show_detail: false,
            show_help: false,
            day_scroll: 0,
            status_message: None,
            palette,
            store,
        };
        app.refresh();
        app
    }

    /// Refetch the current group's records and rebuild markings.
    pub fn refresh(&mut self) {
        let group_id = &self.session.group_id;
        self.group_name = self
            .store
            .group(group_id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| "Unknown group".to_string());
        self.trips = self.store.trips_for_group(group_id);
        self.events = self.store.events_for_group(group_id);
        info!(
            group = %group_id,
            trips = self.trips.len(),
            events = self.events.len(),
            "loaded group records"
        );
        self.recompute();
    }

    pub fn recompute(&mut self) {
        let trips: &[Trip] = if self.filter.shows_trips() { &self.trips } else { &[] };
        let events: &[Event] = if self.filter.shows_events() { &self.events } else { &[] };
        self.markings = compute_markings(
            trips,
            events,
            Some(self.selected_date),
            self.today,
            &self.palette,
        );
    }

    pub fn palette(&self) -> &MarkingPalette {
        &self.palette
    }

    pub fn selected_trips(&self) -> Vec<&Trip> {
        if !self.filter.shows_trips() {
            return Vec::new();
        }
        agenda::trips_on(&self.trips, self.selected_date)
    }

    pub fn selected_events(&self) -> Vec<&Event> {
        if !self.filter.shows_events() {
            return Vec::new();
        }
        agenda::events_on(&self.events, self.selected_date)
    }

    pub fn upcoming_trips(&self) -> Vec<&Trip> {
        agenda::upcoming_trips(&self.trips, self.today)
    }

    pub fn upcoming_events(&self) -> Vec<&Event> {
        agenda::upcoming_events(&self.events, self.today)
    }

    /// The event that delete, reminder and detail actions operate on.
    pub fn focused_event(&self) -> Option<&Event> {
        self.selected_events().get(self.day_scroll).copied()
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.day_scroll = 0;
        self.recompute();
    }

    pub fn next_day(&mut self) {
        let next = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.select_date(next);
    }

    pub fn prev_day(&mut self) {
        let prev = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.select_date(prev);
    }

    pub fn next_week(&mut self) {
        let next = self
            .selected_date
            .checked_add_signed(Duration::weeks(1))
            .unwrap_or(self.selected_date);
        self.select_date(next);
    }

    pub fn prev_week(&mut self) {
        let prev = self
            .selected_date
            .checked_sub_signed(Duration::weeks(1))
            .unwrap_or(self.selected_date);
        self.select_date(prev);
    }

    pub fn next_month(&mut self) {
        let next = self
            .selected_date
            .checked_add_months(Months::new(1))
            .unwrap_or(self.selected_date);
        self.select_date(next);
    }

    pub fn prev_month(&mut self) {
        let prev = self
            .selected_date
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.selected_date);
        self.select_date(prev);
    }

    pub fn go_to_today(&mut self) {
        self.set_today(Local::now().date_naive());
        self.select_date(self.today);
    }

    /// Move "today" forward; trip colors depend on it, so markings are rebuilt.
    pub fn set_today(&mut self, today: NaiveDate) {
        if today != self.today {
            info!(%today, "date changed");
            self.today = today;
            self.recompute();
        }
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.day_scroll = 0;
        self.recompute();
        self.status_message = Some(format!("Showing {}", self.filter.label().to_lowercase()));
    }

    pub fn toggle_panel(&mut self) {
        self.panel = match self.panel {
            Panel::Day => Panel::Agenda,
            Panel::Agenda => Panel::Day,
        };
    }

    pub fn scroll_down(&mut self) {
        if self.day_scroll + 1 < self.selected_events().len() {
            self.day_scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.day_scroll = self.day_scroll.saturating_sub(1);
    }

    /// Switch to the user's next group, wrapping around.
    pub fn next_group(&mut self) {
        let groups: Vec<String> = self
            .store
            .groups_for_user(&self.session.user_id)
            .iter()
            .map(|g| g.id.clone())
            .collect();
        if groups.len() < 2 {
            self.status_message = Some("You only have one group".to_string());
            return;
        }
        let mut ordered = groups.clone();
        ordered.sort();
        let pos = ordered
            .iter()
            .position(|id| *id == self.session.group_id)
            .unwrap_or(0);
        let next = ordered[(pos + 1) % ordered.len()].clone();

        if let Err(err) = self.store.touch_group(&next, &self.session.user_id) {
            warn!(error = %err, "could not record group switch");
        }
        self.session.group_id = next;
        self.day_scroll = 0;
        self.refresh();
        self.status_message = Some(format!("Switched to {}", self.group_name));
    }

    pub fn delete_focused_event(&mut self) {
        let Some(event) = self.focused_event().cloned() else {
            self.status_message = Some("No event on this day".to_string());
            return;
        };

        let change = Optimistic::apply(&mut self.events, |events| {
            events.retain(|e| e.id != event.id);
        });
        let remote = self.store.delete_event(&event.id);
        match change.settle(&mut self.events, remote) {
            Ok(_) => {
                self.status_message = Some(format!("Deleted \"{}\"", event.name));
                self.day_scroll = self.day_scroll.saturating_sub(1);
            }
            Err(err) => self.status_message = Some(format!("Failed to delete event: {err}")),
        }
        self.recompute();
    }

    pub fn toggle_focused_reminder(&mut self) {
        let Some(event) = self.focused_event().cloned() else {
            self.status_message = Some("No event on this day".to_string());
            return;
        };
        let reminder = !event.reminder;

        let change = Optimistic::apply(&mut self.events, |events| {
            if let Some(e) = events.iter_mut().find(|e| e.id == event.id) {
                e.reminder = reminder;
            }
        });
        let remote = self.store.set_reminder(&event.id, reminder);
        self.status_message = Some(match change.settle(&mut self.events, remote) {
            Ok(()) if reminder => format!("Reminder set for \"{}\"", event.name),
            Ok(()) => format!("Reminder cleared for \"{}\"", event.name),
            Err(err) => format!("Failed to update reminder: {err}"),
        });
    }

    pub fn open_detail(&mut self) {
        if self.focused_event().is_some() {
            self.show_detail = true;
        }
    }

    pub fn open_event_form(&mut self) {
        self.form_state = Some(EventFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn close_event_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_mut(&mut self) -> Option<&mut EventFormState> {
        self.form_state.as_mut()
    }

    pub fn submit_event_form(&mut self) {
        let Some(form) = self.form_state.as_ref() else {
            return;
        };
        match self.build_event(form) {
            Ok(event) => {
                let name = event.name.clone();
                let day = event.day();
                match self.store.insert_event(event) {
                    Ok(()) => {
                        self.close_event_form();
                        self.refresh();
                        if let Some(day) = day {
                            self.select_date(day);
                        }
                        self.status_message = Some(format!("Added \"{name}\""));
                    }
                    Err(err) => self.status_message = Some(format!("Failed to save event: {err}")),
                }
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    fn build_event(&self, form: &EventFormState) -> Result<Event> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(eyre!("Please enter an event name"));
        }
        let date = form
            .parsed_date()
            .ok_or_else(|| eyre!("Date must look like 2024-06-01"))?;
        let time = if form.is_all_day {
            None
        } else {
            let time = form
                .parsed_time()
                .ok_or_else(|| eyre!("Time must look like 18:30"))?;
            Some(time.format("%H:%M").to_string())
        };

        Ok(Event {
            id: Uuid::new_v4().to_string(),
            group_id: self.session.group_id.clone(),
            name: name.to_string(),
            date: Some(date.format("%Y-%m-%d").to_string()),
            time,
            is_all_day: form.is_all_day,
            color: Some(form.color().to_string()),
            kind: form.kind().to_string(),
            notes: None,
            reminder: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SEED: &str = r##"{
        "groups": [
            {"id": "g1", "name": "Us", "join_code": "AB12CD34",
             "members": [{"user_id": "alice", "last_accessed": "2024-01-02T00:00:00Z"}]},
            {"id": "g2", "name": "Family", "join_code": "ZZ99YY88",
             "members": [{"user_id": "alice", "last_accessed": "2024-03-01T00:00:00Z"}]}
        ],
        "trips": [
            {"id": "t1", "group_id": "g1", "destination": "Porto",
             "start_date": "2024-05-01", "end_date": "2024-05-04"}
        ],
        "events": [
            {"id": "e1", "group_id": "g1", "name": "Dinner", "date": "2024-05-02", "time": "19:00"},
            {"id": "e2", "group_id": "g1", "name": "Museum", "date": "2024-05-02", "is_all_day": true}
        ]
    }"##;

    fn app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.json");
        std::fs::write(&path, SEED).unwrap();
        let store = Store::open(&path).unwrap();
        let session = AppSession {
            user_id: "alice".into(),
            group_id: "g1".into(),
        };
        let mut app = App::new(store, session, MarkingPalette::default());
        app.select_date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        (dir, app)
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn selected_day_lists_all_day_first() {
        let (_dir, app) = app();
        let names: Vec<&str> = app.selected_events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Museum", "Dinner"]);
        assert_eq!(app.selected_trips().len(), 1);
        assert!(app.markings[&may(2)].selected);
    }

    #[test]
    fn filter_drops_records_from_markings() {
        let (_dir, mut app) = app();
        app.cycle_filter();
        assert_eq!(app.filter, Filter::Trips);
        assert!(app.markings[&may(2)].events.is_empty());
        assert!(app.selected_events().is_empty());

        app.cycle_filter();
        assert_eq!(app.filter, Filter::Events);
        assert!(app.markings[&may(2)].trip.is_none());
        assert!(!app.markings.contains_key(&may(1)));
    }

    #[test]
    fn delete_keeps_local_list_in_step_with_store() {
        let (_dir, mut app) = app();
        app.delete_focused_event();
        assert_eq!(app.events.len(), 1);
        assert_eq!(app.events[0].id, "e1");
        assert_eq!(app.markings[&may(2)].events.len(), 1);
    }

    #[test]
    fn failed_delete_rolls_back() {
        let (_dir, mut app) = app();
        let mut ghost = app.events[0].clone();
        ghost.id = "ghost".into();
        ghost.is_all_day = true;
        ghost.time = None;
        ghost.name = "Aardvark".into();
        app.events.insert(0, ghost);

        // all-day, sorts before "Museum" by stable order
        assert_eq!(app.focused_event().unwrap().id, "ghost");
        app.delete_focused_event();
        assert_eq!(app.events.len(), 3);
        assert!(app.status_message.as_deref().unwrap().starts_with("Failed to delete"));
    }

    #[test]
    fn reminder_toggle_persists() {
        let (_dir, mut app) = app();
        app.toggle_focused_reminder();
        assert!(app.events.iter().find(|e| e.id == "e2").unwrap().reminder);
        app.refresh();
        assert!(app.events.iter().find(|e| e.id == "e2").unwrap().reminder);
    }

    #[test]
    fn form_submission_adds_event() {
        let (_dir, mut app) = app();
        app.open_event_form();
        let form = app.form_mut().unwrap();
        form.name = "Picnic".into();
        form.date = "2024-05-10".into();
        form.time = "12:30".into();
        app.submit_event_form();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.selected_date, may(10));
        let picnic = app.selected_events()[0];
        assert_eq!(picnic.time.as_deref(), Some("12:30"));
        assert_eq!(picnic.group_id, "g1");
    }

    #[test]
    fn invalid_form_stays_open() {
        let (_dir, mut app) = app();
        app.open_event_form();
        app.submit_event_form();
        assert_eq!(app.input_mode, InputMode::Form);
        assert_eq!(app.status_message.as_deref(), Some("Please enter an event name"));
    }

    #[test]
    fn switching_groups_reloads_records() {
        let (_dir, mut app) = app();
        app.next_group();
        assert_eq!(app.session.group_id, "g2");
        assert_eq!(app.group_name, "Family");
        assert!(app.trips.is_empty() && app.events.is_empty());
    }

    #[test]
    fn month_navigation_clamps_day() {
        let (_dir, mut app) = app();
        app.select_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        app.next_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        app.prev_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    }

    #[test]
    fn failed_delete_is_not_lost_on_refresh() {
        let (dir, mut app) = app();
        drop(dir);
        app.delete_focused_event();
        assert!(app.status_message.as_deref().unwrap().starts_with("Failed to delete"));
        app.refresh();
        assert_eq!(app.events.len(), 2);
        assert_eq!(app.selected_events().len(), 2);
    }

    #[test]
    fn week_navigation_stays_put_at_calendar_edge() {
        let (_dir, mut app) = app();
        app.next_week();
        assert_eq!(app.selected_date, may(9));
        app.prev_week();
        assert_eq!(app.selected_date, may(2));

        app.select_date(NaiveDate::MAX);
        app.next_week();
        assert_eq!(app.selected_date, NaiveDate::MAX);
        app.select_date(NaiveDate::MIN);
        app.prev_week();
        assert_eq!(app.selected_date, NaiveDate::MIN);
    }

    #[test]
    fn trip_turns_past_when_the_day_rolls_over() {
        let (_dir, mut app) = app();
        let future = app.palette().future_trip.clone();
        let past = app.palette().past_trip.clone();

        app.set_today(may(4));
        assert_eq!(app.markings[&may(2)].trip.as_ref().unwrap().color, future);
        app.set_today(may(5));
        assert_eq!(app.today, may(5));
        assert_eq!(app.markings[&may(2)].trip.as_ref().unwrap().color, past);
    }
}
