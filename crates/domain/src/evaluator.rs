use crate::event::{days_until, PushEvent};
use crate::reminder::ReminderKind;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Decides whether the `kind` reminder of `event` should be pushed at `now`.
///
/// Never fails: an event whose anchor cannot be determined is simply not due.
pub fn is_due(event: &PushEvent, kind: ReminderKind, now: DateTime<Utc>) -> bool {
    if !kind.is_long_lead() {
        debug!(
            "Skipping short-lead reminder {} for event {}, handled on device",
            kind, event.id
        );
        return false;
    }

    let anchor = match event.effective_anchor() {
        Some(anchor) => anchor,
        None => return false,
    };
    let days = days_until(anchor, now);

    // Once an undated item's day has arrived its long-lead reminders are stale
    if !event.is_timed() && days <= 0 {
        return false;
    }

    let in_window = match kind {
        ReminderKind::OneDay => days == 1,
        ReminderKind::OneWeek => days == 7,
        _ => false,
    };

    in_window && !event.sent_status.is_sent(kind)
}

/// Every reminder kind of `event` that is due at `now`.
///
/// Kinds from `reminder_kinds` come first. A legacy flag only contributes
/// when `reminder_kinds` does not already list the same kind, so an event
/// carrying both never yields the kind twice.
pub fn due_kinds(event: &PushEvent, now: DateTime<Utc>) -> Vec<ReminderKind> {
    let mut kinds: Vec<ReminderKind> = Vec::new();

    for kind in &event.reminder_kinds {
        if !kinds.contains(kind) && is_due(event, *kind, now) {
            kinds.push(*kind);
        }
    }

    let legacy = [
        (ReminderKind::OneDay, event.legacy_day_before),
        (ReminderKind::OneWeek, event.legacy_week_before),
    ];
    for (kind, enabled) in legacy.iter() {
        if *enabled
            && !event.reminder_kinds.contains(kind)
            && !kinds.contains(kind)
            && is_due(event, *kind, now)
        {
            kinds.push(*kind);
        }
    }

    kinds
}
