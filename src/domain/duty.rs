// Duty statuses and the timeline events emitted by the simulator
use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Duty status; the discriminant is the chart row, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DutyStatus {
    OffDuty = 0,
    SleeperBerth = 1,
    Driving = 2,
    OnDutyNotDriving = 3,
}

impl DutyStatus {
    pub const ALL: [DutyStatus; 4] = [
        DutyStatus::OffDuty,
        DutyStatus::SleeperBerth,
        DutyStatus::Driving,
        DutyStatus::OnDutyNotDriving,
    ];

    pub fn row(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            DutyStatus::OffDuty => "Off Duty",
            DutyStatus::SleeperBerth => "Sleeper Berth",
            DutyStatus::Driving => "Driving",
            DutyStatus::OnDutyNotDriving => "On Duty (Not Driving)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DutyEvent {
    pub day: NaiveDate,
    /// Fractional hour of `day`, 0.0 inclusive to 24.0 exclusive.
    pub hour: f64,
    pub status: DutyStatus,
    pub label: String,
}

impl DutyEvent {
    pub fn new(day: NaiveDate, hour: f64, status: DutyStatus, label: impl Into<String>) -> Self {
        Self {
            day,
            hour,
            status,
            label: label.into(),
        }
    }

    /// Event stamped at a simulated local time.
    pub fn at(time: NaiveDateTime, status: DutyStatus, label: impl Into<String>) -> Self {
        let seconds = time.num_seconds_from_midnight() as f64
            + f64::from(time.nanosecond()) / 1_000_000_000.0;
        Self::new(time.date(), seconds / 3600.0, status, label)
    }
}
