use std::cmp::Ordering;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::group::{is_valid_join_code, normalize_join_code, AppSession, Group, Membership};
use super::{Event, Trip};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Records {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    trips: Vec<Trip>,
    #[serde(default)]
    events: Vec<Event>,
}

/// Group, trip and event records kept in a single JSON document.
///
/// Every mutation is applied to a copy of the records and only replaces the
/// in-memory state once that copy is on disk.
pub struct Store {
    path: PathBuf,
    records: Records,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content)
                .wrap_err_with(|| format!("parsing {}", path.display()))?
        } else {
            info!(path = %path.display(), "no planner data yet, starting empty");
            Records::default()
        };

        debug!(
            groups = records.groups.len(),
            trips = records.trips.len(),
            events = records.events.len(),
            "opened planner store"
        );
        Ok(Self { path, records })
    }

    /// Groups the user belongs to, most recently accessed first.
    pub fn groups_for_user(&self, user_id: &str) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .records
            .groups
            .iter()
            .filter(|g| g.has_member(user_id))
            .collect();
        groups.sort_by_key(|g| std::cmp::Reverse(g.last_accessed_by(user_id)));
        groups
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.records.groups.iter().find(|g| g.id == group_id)
    }

    /// Pick the preferred group if the user is in it, else their most recent.
    pub fn resolve_session(&self, user_id: &str, preferred: Option<&str>) -> Option<AppSession> {
        let groups = self.groups_for_user(user_id);
        let group = preferred
            .and_then(|id| groups.iter().find(|g| g.id == id))
            .or_else(|| groups.first())?;
        Some(AppSession {
            user_id: user_id.to_string(),
            group_id: group.id.clone(),
        })
    }

    pub fn trips_for_group(&self, group_id: &str) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self
            .records
            .trips
            .iter()
            .filter(|t| t.group_id == group_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| by_date(a.start(), b.start()));
        trips
    }

    pub fn events_for_group(&self, group_id: &str) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .records
            .events
            .iter()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| by_date(a.day(), b.day()));
        events
    }

    pub fn insert_trip(&mut self, trip: Trip) -> Result<()> {
        if self.group(&trip.group_id).is_none() {
            bail!("No group with id {}", trip.group_id);
        }
        if trip.destination.trim().is_empty() {
            bail!("Please enter a destination");
        }
        let Some((start, end)) = trip.span() else {
            bail!("Please choose both a start and an end date");
        };
        if end < start {
            bail!("End date must be on or after the start date");
        }
        info!(trip = %trip.id, group = %trip.group_id, "inserting trip");
        self.commit(|records| {
            records.trips.push(trip);
            Ok(())
        })
    }

    pub fn delete_trip(&mut self, trip_id: &str) -> Result<Trip> {
        let removed = self.commit(|records| {
            let idx = records
                .trips
                .iter()
                .position(|t| t.id == trip_id)
                .ok_or_else(|| eyre!("No trip with id {trip_id}"))?;
            Ok(records.trips.remove(idx))
        })?;
        info!(trip = %trip_id, "deleted trip");
        Ok(removed)
    }

    pub fn insert_event(&mut self, event: Event) -> Result<()> {
        if self.group(&event.group_id).is_none() {
            bail!("No group with id {}", event.group_id);
        }
        info!(event = %event.id, group = %event.group_id, "inserting event");
        self.commit(|records| {
            records.events.push(event);
            Ok(())
        })
    }

    pub fn delete_event(&mut self, event_id: &str) -> Result<Event> {
        let removed = self.commit(|records| {
            let idx = records
                .events
                .iter()
                .position(|e| e.id == event_id)
                .ok_or_else(|| eyre!("No event with id {event_id}"))?;
            Ok(records.events.remove(idx))
        })?;
        info!(event = %event_id, "deleted event");
        Ok(removed)
    }

    pub fn set_reminder(&mut self, event_id: &str, reminder: bool) -> Result<()> {
        self.commit(|records| {
            let event = records
                .events
                .iter_mut()
                .find(|e| e.id == event_id)
                .ok_or_else(|| eyre!("No event with id {event_id}"))?;
            event.reminder = reminder;
            Ok(())
        })
    }

    pub fn create_group(&mut self, name: &str, user_id: &str) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Group name cannot be empty");
        }
        let group = Group::new(name, user_id, Utc::now());
        let created = self.commit(|records| {
            records.groups.push(group.clone());
            Ok(group)
        })?;
        info!(group = %created.id, "created group");
        Ok(created)
    }

    pub fn join_group(&mut self, code: &str, user_id: &str) -> Result<Group> {
        self.join_group_at(code, user_id, Utc::now())
    }

    fn join_group_at(&mut self, code: &str, user_id: &str, now: DateTime<Utc>) -> Result<Group> {
        let code = normalize_join_code(code);
        if !is_valid_join_code(&code) {
            bail!("Join code must be 8 characters (letters and numbers only)");
        }
        let joined = self.commit(|records| {
            let group = records
                .groups
                .iter_mut()
                .find(|g| g.matches_code(&code))
                .ok_or_else(|| eyre!("No group found for that join code"))?;
            if group.has_member(user_id) {
                bail!("You are already a member of {}", group.name);
            }
            group.members.push(Membership {
                user_id: user_id.to_string(),
                last_accessed: now,
            });
            Ok(group.clone())
        })?;
        info!(group = %joined.id, "joined group");
        Ok(joined)
    }

    /// Leave a group and switch to the most recently used remaining one,
    /// which is returned.
    pub fn leave_group(&mut self, group_id: &str, user_id: &str) -> Result<Group> {
        self.leave_group_at(group_id, user_id, Utc::now())
    }

    fn leave_group_at(
        &mut self,
        group_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Group> {
        let next_id = self
            .groups_for_user(user_id)
            .into_iter()
            .find(|g| g.id != group_id)
            .map(|g| g.id.clone());

        let next = self.commit(|records| {
            let group = records
                .groups
                .iter_mut()
                .find(|g| g.id == group_id && g.has_member(user_id))
                .ok_or_else(|| eyre!("You are not a member of that group"))?;
            let Some(next_id) = next_id else {
                bail!("You cannot leave your only group. Create or join another group first.");
            };
            group.members.retain(|m| m.user_id != user_id);

            let next = records
                .groups
                .iter_mut()
                .find(|g| g.id == next_id)
                .ok_or_else(|| eyre!("No group with id {next_id}"))?;
            if let Some(member) = next.members.iter_mut().find(|m| m.user_id == user_id) {
                member.last_accessed = now;
            }
            Ok(next.clone())
        })?;
        info!(group = %group_id, next = %next.id, "left group");
        Ok(next)
    }

    /// Record that the user just switched to this group.
    pub fn touch_group(&mut self, group_id: &str, user_id: &str) -> Result<()> {
        let now = Utc::now();
        self.commit(|records| {
            let member = records
                .groups
                .iter_mut()
                .filter(|g| g.id == group_id)
                .flat_map(|g| g.members.iter_mut())
                .find(|m| m.user_id == user_id)
                .ok_or_else(|| eyre!("You are not a member of that group"))?;
            member.last_accessed = now;
            Ok(())
        })
    }

    /// Apply `change` to a copy of the records, write the copy, then adopt it.
    fn commit<R>(&mut self, change: impl FnOnce(&mut Records) -> Result<R>) -> Result<R> {
        let mut next = self.records.clone();
        let out = change(&mut next)?;
        save_atomic(&self.path, &next)?;
        self.records = next;
        Ok(out)
    }
}

fn save_atomic(path: &Path, records: &Records) -> Result<()> {
    debug!(file = %path.display(), "saving planner records");

    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .wrap_err_with(|| format!("creating temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut temp, records)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| eyre!("failed to persist {}: {}", path.display(), err))?;
    Ok(())
}

// Records without a usable date go last.
fn by_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{Trip, TripStatus};
    use chrono::TimeZone;
    use tempfile::TempDir;

    const SEED: &str = r##"{
        "groups": [
            {"id": "g1", "name": "Us", "join_code": "AB12CD34",
             "members": [{"user_id": "alice", "last_accessed": "2024-01-02T00:00:00Z"}]},
            {"id": "g2", "name": "Family", "join_code": "ZZ99YY88",
             "members": [{"user_id": "alice", "last_accessed": "2024-03-01T00:00:00Z"},
                         {"user_id": "bob", "last_accessed": "2024-03-01T00:00:00Z"}]}
        ],
        "trips": [
            {"id": "t2", "group_id": "g1", "destination": "Kyoto",
             "start_date": "2024-09-01", "end_date": "2024-09-10", "status": "planned"},
            {"id": "t0", "group_id": "g1", "destination": "Nowhere"},
            {"id": "t1", "group_id": "g1", "destination": "Porto",
             "start_date": "2024-05-01", "end_date": "2024-05-04", "status": "completed"},
            {"id": "t3", "group_id": "g2", "destination": "Rome",
             "start_date": "2024-01-01", "end_date": "2024-01-04"}
        ],
        "events": [
            {"id": "e2", "group_id": "g1", "name": "Dinner", "date": "2024-06-02", "time": "19:00"},
            {"id": "e1", "group_id": "g1", "name": "Anniversary", "date": "2024-06-01",
             "is_all_day": true, "color": "#ff0000", "type": "anniversary"}
        ]
    }"##;

    fn seeded() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.json");
        fs::write(&path, SEED).unwrap();
        let store = Store::open(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("nothing.json")).unwrap();
        assert!(store.groups_for_user("alice").is_empty());
        assert!(store.resolve_session("alice", None).is_none());
    }

    #[test]
    fn trips_are_filtered_and_ordered_by_start() {
        let (_dir, store) = seeded();
        let trips = store.trips_for_group("g1");
        let ids: Vec<&str> = trips.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "t0"]);
        assert_eq!(trips[0].status, TripStatus::Completed);
        assert_eq!(store.trips_for_group("g2")[0].status, TripStatus::Planned);
    }

    #[test]
    fn events_are_ordered_by_date() {
        let (_dir, store) = seeded();
        let events = store.events_for_group("g1");
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
        assert!(store.events_for_group("g2").is_empty());
    }

    #[test]
    fn session_prefers_requested_group_then_most_recent() {
        let (_dir, store) = seeded();
        let recent = store.resolve_session("alice", None).unwrap();
        assert_eq!(recent.group_id, "g2");
        let chosen = store.resolve_session("alice", Some("g1")).unwrap();
        assert_eq!(chosen.group_id, "g1");
        let fallback = store.resolve_session("bob", Some("g1")).unwrap();
        assert_eq!(fallback.group_id, "g2");
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let (dir, mut store) = seeded();
        let mut event = store.events_for_group("g1")[0].clone();
        event.id = "e3".into();
        store.insert_event(event).unwrap();
        store.set_reminder("e2", true).unwrap();
        store.delete_event("e1").unwrap();

        let reopened = Store::open(dir.path().join("planner.json")).unwrap();
        let events = reopened.events_for_group("g1");
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e3", "e2"]);
        assert!(events[1].reminder);
    }

    #[test]
    fn deleting_unknown_event_fails() {
        let (_dir, mut store) = seeded();
        assert!(store.delete_event("missing").is_err());
        assert_eq!(store.events_for_group("g1").len(), 2);
    }

    #[test]
    fn join_by_code() {
        let (_dir, mut store) = seeded();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let group = store.join_group_at(" ab12 cd34\n", "bob", now).unwrap();
        assert_eq!(group.id, "g1");
        assert_eq!(store.resolve_session("bob", None).unwrap().group_id, "g1");

        let again = store.join_group("AB12CD34", "bob").unwrap_err();
        assert!(again.to_string().contains("already a member"));
        assert!(store.join_group("short", "carol").is_err());
        assert!(store.join_group("QQQQQQQQ", "carol").is_err());
    }

    #[test]
    fn cannot_leave_only_group() {
        let (_dir, mut store) = seeded();
        let err = store.leave_group("g2", "bob").unwrap_err();
        assert!(err.to_string().contains("only group"));

        store.leave_group("g2", "alice").unwrap();
        assert_eq!(store.groups_for_user("alice").len(), 1);
        assert!(store.leave_group("g1", "alice").is_err());
    }

    #[test]
    fn touching_a_group_makes_it_most_recent() {
        let (_dir, mut store) = seeded();
        store.touch_group("g1", "alice").unwrap();
        assert_eq!(store.resolve_session("alice", None).unwrap().group_id, "g1");
        assert!(store.touch_group("g1", "bob").is_err());
    }

    #[test]
    fn created_group_has_owner() {
        let (_dir, mut store) = seeded();
        let group = store.create_group("Road trip crew", "carol").unwrap();
        assert!(group.has_member("carol"));
        assert!(store.create_group("   ", "carol").is_err());
        assert_eq!(store.groups_for_user("carol").len(), 1);
    }

    #[test]
    fn undated_events_sort_last() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.json");
        fs::write(
            &path,
            r#"{"events": [
                {"id": "e0", "group_id": "g1", "name": "Someday"},
                {"id": "e9", "group_id": "g1", "name": "Garbled", "date": "soon"},
                {"id": "e1", "group_id": "g1", "name": "Dinner", "date": "2024-06-02"}
            ]}"#,
        )
        .unwrap();
        let store = Store::open(&path).unwrap();
        let events = store.events_for_group("g1");
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e0", "e9"]);
    }

    fn lisbon() -> Trip {
        Trip {
            id: "t9".into(),
            group_id: "g1".into(),
            destination: "Lisbon".into(),
            country: Some("Portugal".into()),
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-02-03".into()),
            status: TripStatus::Planned,
        }
    }

    #[test]
    fn trip_mutations_persist_across_reopen() {
        let (dir, mut store) = seeded();
        store.insert_trip(lisbon()).unwrap();
        let removed = store.delete_trip("t2").unwrap();
        assert_eq!(removed.destination, "Kyoto");
        assert!(store.delete_trip("t2").is_err());

        let reopened = Store::open(dir.path().join("planner.json")).unwrap();
        let trips = reopened.trips_for_group("g1");
        let ids: Vec<&str> = trips.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t9", "t1", "t0"]);
    }

    #[test]
    fn trips_need_a_group_and_an_ordered_range() {
        let (_dir, mut store) = seeded();

        let mut orphan = lisbon();
        orphan.group_id = "nope".into();
        assert!(store.insert_trip(orphan).is_err());

        let mut inverted = lisbon();
        inverted.end_date = Some("2024-01-30".into());
        let err = store.insert_trip(inverted).unwrap_err();
        assert!(err.to_string().contains("on or after"));

        let mut open_ended = lisbon();
        open_ended.end_date = None;
        assert!(store.insert_trip(open_ended).is_err());

        let mut nameless = lisbon();
        nameless.destination = "  ".into();
        assert!(store.insert_trip(nameless).is_err());

        assert_eq!(store.trips_for_group("g1").len(), 3);
    }

    #[test]
    fn leaving_switches_to_most_recent_remaining_group() {
        let (_dir, mut store) = seeded();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let crew = store.create_group("Crew", "alice").unwrap();
        assert_eq!(store.resolve_session("alice", None).unwrap().group_id, crew.id);

        let next = store.leave_group_at(&crew.id, "alice", now).unwrap();
        assert_eq!(next.id, "g2");

        let next = store.leave_group_at("g2", "alice", now).unwrap();
        assert_eq!(next.id, "g1");
        assert_eq!(next.last_accessed_by("alice"), Some(now));
        let session = store.resolve_session("alice", Some("g2")).unwrap();
        assert_eq!(session.group_id, "g1");
    }

    #[test]
    fn failed_save_keeps_records_unchanged() {
        let (dir, mut store) = seeded();
        let path = dir.path().join("planner.json");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.delete_event("e1").is_err());
        assert!(store.set_reminder("e2", true).is_err());
        assert!(store.insert_trip(lisbon()).is_err());
        assert!(store.leave_group("g2", "alice").is_err());

        let events = store.events_for_group("g1");
        assert_eq!(events.len(), 2);
        assert!(!events[1].reminder);
        assert_eq!(store.trips_for_group("g1").len(), 3);
        assert_eq!(store.groups_for_user("alice").len(), 2);

        // No temp files are left next to the data path.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn delete_is_kept_in_memory_only_after_it_is_written() {
        let (dir, mut store) = seeded();
        drop(dir);
        assert!(store.delete_event("e1").is_err());
        assert_eq!(store.events_for_group("g1").len(), 2);
    }

    #[test]
    fn saves_leave_only_the_data_file() {
        let (dir, mut store) = seeded();
        store.set_reminder("e2", true).unwrap();
        store.touch_group("g1", "alice").unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["planner.json"]);
    }
}
