use crate::reminder::{ReminderKind, SentStatus};
use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, TimeZone, Utc};

pub const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

/// The fields of a calendar event row the push scheduler reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    pub id: ID,
    pub title: String,
    /// Precise start. `None` for items without a time of day
    pub start_at: Option<DateTime<Utc>>,
    /// Calendar day an undated item belongs to. Only the UTC date is used
    pub intended_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: ID,
    pub reminder_kinds: Vec<ReminderKind>,
    /// `push_day_before` of the superseded flag scheme
    pub legacy_day_before: bool,
    /// `push_week_before` of the superseded flag scheme
    pub legacy_week_before: bool,
    pub sent_status: SentStatus,
}

impl Entity for PushEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

fn midnight_utc(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

/// `ceil((anchor - now) / 1 day)` on whole milliseconds
pub fn days_until(anchor: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_millis = (anchor - now).num_milliseconds();
    -((-diff_millis).div_euclid(MILLIS_PER_DAY))
}

impl PushEvent {
    pub fn new(user_id: ID, title: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            title: title.into(),
            start_at: None,
            intended_date: None,
            created_at: Some(Utc::now()),
            user_id,
            reminder_kinds: Vec::new(),
            legacy_day_before: false,
            legacy_week_before: false,
            sent_status: Default::default(),
        }
    }

    pub fn is_timed(&self) -> bool {
        self.start_at.is_some()
    }

    /// The instant reminders are measured against.
    ///
    /// Undated items are pinned to 00:00 UTC of their intended day (or the
    /// day they were created) so the due day never depends on the clock or
    /// timezone of whoever computes it.
    pub fn effective_anchor(&self) -> Option<DateTime<Utc>> {
        if let Some(start_at) = self.start_at {
            return Some(start_at);
        }
        self.intended_date
            .or(self.created_at)
            .and_then(midnight_utc)
    }

    /// Whether the user asked for `kind` in either reminder scheme
    pub fn wants(&self, kind: ReminderKind) -> bool {
        if self.reminder_kinds.contains(&kind) {
            return true;
        }
        match kind {
            ReminderKind::OneDay => self.legacy_day_before,
            ReminderKind::OneWeek => self.legacy_week_before,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC3339 timestamp")
    }

    #[test]
    fn days_until_rounds_up() {
        let now = at("2024-03-10T12:00:00Z");
        assert_eq!(days_until(now + Duration::hours(25), now), 2);
        assert_eq!(days_until(now + Duration::hours(23), now), 1);
        assert_eq!(days_until(now + Duration::hours(24), now), 1);
        assert_eq!(days_until(now, now), 0);
        assert_eq!(days_until(now - Duration::hours(1), now), 0);
        assert_eq!(days_until(now - Duration::hours(25), now), -1);
    }

    #[test]
    fn timed_event_anchors_on_start() {
        let mut event = PushEvent::new(ID::default(), "Dentist");
        let start = at("2024-03-11T15:30:00Z");
        event.start_at = Some(start);
        event.intended_date = Some(at("2024-05-01T00:00:00Z"));
        assert_eq!(event.effective_anchor(), Some(start));
    }

    #[test]
    fn intended_date_anchor_ignores_time_of_day() {
        let mut event = PushEvent::new(ID::default(), "Taxes");
        let expected = Some(at("2024-03-11T00:00:00Z"));
        for input in &[
            "2024-03-11T00:00:00Z",
            "2024-03-11T09:15:00Z",
            "2024-03-11T23:59:59.999Z",
            "2024-03-11T06:00:00+05:00",
        ] {
            event.intended_date = Some(at(input));
            assert_eq!(event.effective_anchor(), expected, "input {}", input);
        }
    }

    #[test]
    fn undated_event_falls_back_to_created_day() {
        let mut event = PushEvent::new(ID::default(), "Laundry");
        event.created_at = Some(at("2024-03-09T18:45:00Z"));
        assert_eq!(event.effective_anchor(), Some(at("2024-03-09T00:00:00Z")));

        event.created_at = None;
        assert_eq!(event.effective_anchor(), None);
    }

    #[test]
    fn wants_reads_both_schemes() {
        let mut event = PushEvent::new(ID::default(), "Trip");
        assert!(!event.wants(ReminderKind::OneDay));
        event.legacy_week_before = true;
        assert!(event.wants(ReminderKind::OneWeek));
        event.reminder_kinds = vec![ReminderKind::OneDay];
        assert!(event.wants(ReminderKind::OneDay));
        assert!(!event.wants(ReminderKind::OneHour));
    }
}
