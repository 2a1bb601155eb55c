// Per-day views over the trip timeline
use chrono::NaiveDate;

use super::duty::{DutyEvent, DutyStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct DailyLog {
    pub day: NaiveDate,
    /// Ordered events; the first always sits at hour 0.
    pub events: Vec<DutyEvent>,
}

/// Split a chronological timeline into one log per calendar day.
///
/// A day whose first event starts after midnight gets a synthetic off-duty
/// entry at hour 0 so its chart trace starts at the left edge.
pub fn group_by_day(events: &[DutyEvent]) -> Vec<DailyLog> {
    let mut logs: Vec<DailyLog> = Vec::new();

    for event in events {
        match logs.last_mut() {
            Some(log) if log.day == event.day => log.events.push(event.clone()),
            _ => logs.push(DailyLog {
                day: event.day,
                events: vec![event.clone()],
            }),
        }
    }

    for log in &mut logs {
        if log.events[0].hour > 0.0 {
            log.events
                .insert(0, DutyEvent::new(log.day, 0.0, DutyStatus::OffDuty, ""));
        }
    }

    logs
}
