// Hours-of-Service duty-cycle simulation
//
// One forward pass over the trip: each decision cycle resolves long rests,
// short breaks and the pickup before accruing any driving, then drives as far
// as the tightest limit allows.
use chrono::{Duration, NaiveDateTime};

use super::distance::{RouteCursor, RouteProfile};
use super::duty::{DutyEvent, DutyStatus};
use super::error::{PlanningError, PlanningResult};
use super::geometry::Coordinate;
use super::stops::{FUEL_INTERVAL_MI, Stop, StopKind};

/// Slack for floating-point limit comparisons, in hours.
const LIMIT_EPSILON_H: f64 = 1e-9;

/// Simplified driver limits, in hours and miles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HosRules {
    pub max_driving_h: f64,
    pub window_h: f64,
    pub cycle_limit_h: f64,
    pub break_after_driving_h: f64,
    pub break_h: f64,
    pub daily_rest_h: f64,
    pub cycle_reset_h: f64,
    pub dwell_h: f64,
    pub fueling_h: f64,
    pub fuel_interval_mi: f64,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            max_driving_h: 11.0,
            window_h: 14.0,
            cycle_limit_h: 70.0,
            break_after_driving_h: 8.0,
            break_h: 0.5,
            daily_rest_h: 10.0,
            cycle_reset_h: 34.0,
            dwell_h: 1.0,
            fueling_h: 0.5,
            fuel_interval_mi: FUEL_INTERVAL_MI,
        }
    }
}

/// Everything the simulator needs to know about one trip.
#[derive(Debug, Clone)]
pub struct TripPlanInput {
    pub leg1_miles: f64,
    pub total_miles: f64,
    pub total_hours: f64,
    pub cycle_hours_used: f64,
    pub start: NaiveDateTime,
    pub current_label: String,
    pub pickup_label: String,
    pub dropoff_label: String,
}

/// Simulator output: the duty-status timeline plus stops observed en route.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pub events: Vec<DutyEvent>,
    pub stops: Vec<Stop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegPhase {
    ToPickup,
    ToDropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestKind {
    /// 10-hour reset after hitting the daily driving or window limit.
    Daily,
    /// 34-hour restart after hitting the rolling cycle limit.
    CycleRestart,
}

/// Mutable state of one simulation; the event log is owned here and only
/// appended to.
#[derive(Debug)]
pub struct SimulatorState<'a> {
    rules: HosRules,
    input: &'a TripPlanInput,
    avg_mph: f64,
    clock_h: f64,
    miles: f64,
    window_start_h: f64,
    last_break_end_h: f64,
    drive_day_h: f64,
    drive_since_break_h: f64,
    on_duty_day_h: f64,
    cycle_h: f64,
    next_fuel_mi: f64,
    leg: LegPhase,
    position: Coordinate,
    cursor: RouteCursor<'a>,
    timeline: Timeline,
}

impl<'a> SimulatorState<'a> {
    /// Fails with `DegenerateRoute` when no positive, finite average speed
    /// can be derived from the trip totals.
    pub fn new(
        input: &'a TripPlanInput,
        profile: &'a RouteProfile,
        rules: HosRules,
    ) -> PlanningResult<Self> {
        let avg_mph = input.total_miles / input.total_hours;
        if input.total_hours <= 0.0 || !avg_mph.is_finite() || avg_mph <= 0.0 {
            return Err(PlanningError::DegenerateRoute {
                total_miles: input.total_miles,
                total_hours: input.total_hours,
            });
        }

        let mut cursor = profile.cursor();
        let position = cursor.advance_to(0.0);

        Ok(Self {
            rules,
            input,
            avg_mph,
            clock_h: 0.0,
            miles: 0.0,
            window_start_h: 0.0,
            last_break_end_h: 0.0,
            drive_day_h: 0.0,
            drive_since_break_h: 0.0,
            on_duty_day_h: 0.0,
            cycle_h: input.cycle_hours_used,
            next_fuel_mi: rules.fuel_interval_mi,
            leg: LegPhase::ToPickup,
            position,
            cursor,
            timeline: Timeline::default(),
        })
    }

    pub fn now(&self) -> NaiveDateTime {
        self.input.start + Duration::microseconds((self.clock_h * 3.6e9).round() as i64)
    }

    pub fn miles(&self) -> f64 {
        self.miles
    }

    pub fn cycle_hours(&self) -> f64 {
        self.cycle_h
    }

    pub fn drive_day_hours(&self) -> f64 {
        self.drive_day_h
    }

    #[cfg(test)]
    fn on_duty_day_hours(&self) -> f64 {
        self.on_duty_day_h
    }

    #[cfg(test)]
    fn last_break_end_hours(&self) -> f64 {
        self.last_break_end_h
    }

    pub fn leg(&self) -> LegPhase {
        self.leg
    }

    pub fn events(&self) -> &[DutyEvent] {
        &self.timeline.events
    }

    pub fn is_finished(&self) -> bool {
        self.miles >= self.input.total_miles
    }

    fn window_elapsed_h(&self) -> f64 {
        self.clock_h - self.window_start_h
    }

    fn emit(&mut self, status: DutyStatus, label: impl Into<String>) {
        let event = DutyEvent::at(self.now(), status, label);
        self.timeline.events.push(event);
    }

    fn record_stop(&mut self, kind: StopKind) {
        self.timeline.stops.push(Stop::new(self.position, kind));
    }

    fn advance_clock(&mut self, hours: f64) {
        self.clock_h += hours;
    }

    fn add_on_duty(&mut self, hours: f64) {
        self.on_duty_day_h += hours;
        self.cycle_h += hours;
    }

    pub fn start(&mut self) {
        let label = format!("Start at {}", self.input.current_label);
        self.emit(DutyStatus::OnDutyNotDriving, label);
    }

    /// Which long rest, if any, the current counters demand.
    pub fn long_rest_due(&self) -> Option<RestKind> {
        let r = &self.rules;
        if self.cycle_h >= r.cycle_limit_h - LIMIT_EPSILON_H {
            Some(RestKind::CycleRestart)
        } else if self.drive_day_h >= r.max_driving_h - LIMIT_EPSILON_H
            || self.window_elapsed_h() >= r.window_h - LIMIT_EPSILON_H
        {
            Some(RestKind::Daily)
        } else {
            None
        }
    }

    pub fn take_long_rest(&mut self, kind: RestKind) {
        let hours = match kind {
            RestKind::Daily => self.rules.daily_rest_h,
            RestKind::CycleRestart => self.rules.cycle_reset_h,
        };

        self.emit(DutyStatus::OffDuty, format!("Rest Stop ({}hrs)", hours));
        self.advance_clock(hours);

        self.window_start_h = self.clock_h;
        self.last_break_end_h = self.clock_h;
        self.drive_day_h = 0.0;
        self.drive_since_break_h = 0.0;
        self.on_duty_day_h = 0.0;
        if kind == RestKind::CycleRestart {
            // the restart only credits its own length back to the cycle
            self.cycle_h = (self.cycle_h - hours).max(0.0);
        }

        self.record_stop(StopKind::RestStop);
        self.emit(DutyStatus::OnDutyNotDriving, "End Rest");
    }

    pub fn break_due(&self) -> bool {
        self.drive_since_break_h >= self.rules.break_after_driving_h - LIMIT_EPSILON_H
    }

    pub fn take_break(&mut self) {
        self.emit(DutyStatus::OffDuty, "30min Break");
        self.advance_clock(self.rules.break_h);
        self.last_break_end_h = self.clock_h;
        self.drive_since_break_h = 0.0;
        self.record_stop(StopKind::Break);
        self.emit(DutyStatus::Driving, "End Break");
    }

    pub fn pickup_due(&self) -> bool {
        self.leg == LegPhase::ToPickup && self.miles >= self.input.leg1_miles
    }

    pub fn pick_up(&mut self) {
        let label = format!("Pickup at {}", self.input.pickup_label);
        self.emit(DutyStatus::OnDutyNotDriving, label);
        self.advance_clock(self.rules.dwell_h);
        self.add_on_duty(self.rules.dwell_h);
        self.leg = LegPhase::ToDropoff;
        self.emit(DutyStatus::Driving, "Start to Dropoff");
    }

    /// Odometer reading the next driving span may reach.
    ///
    /// Bounded by the break, daily-driving and window limits, the trip end,
    /// the next fuel threshold and, on the first leg, the pickup.
    pub fn drive_target(&self) -> f64 {
        let r = &self.rules;
        let by_break = r.break_after_driving_h - self.drive_since_break_h;
        let by_day = r.max_driving_h - self.drive_day_h;
        let by_window = r.window_h - self.window_elapsed_h();
        let hours = by_break.min(by_day).min(by_window);
        if hours < LIMIT_EPSILON_H {
            return self.miles;
        }

        let mut target = (self.miles + hours * self.avg_mph)
            .min(self.input.total_miles)
            .min(self.next_fuel_mi);
        if self.leg == LegPhase::ToPickup {
            target = target.min(self.input.leg1_miles.max(self.miles));
        }
        target.max(self.miles)
    }

    pub fn drive_to(&mut self, target: f64) {
        let distance = target - self.miles;
        if distance <= 0.0 {
            return;
        }
        let hours = distance / self.avg_mph;

        self.emit(DutyStatus::Driving, "Driving");
        self.advance_clock(hours);
        self.miles = target;
        self.drive_day_h += hours;
        self.drive_since_break_h += hours;
        self.add_on_duty(hours);
        self.position = self.cursor.advance_to(target);
    }

    /// Refuel once the odometer reaches the threshold, including on arrival.
    pub fn refuel_if_due(&mut self) -> bool {
        if self.miles < self.next_fuel_mi {
            return false;
        }
        self.emit(DutyStatus::OnDutyNotDriving, "Fueling");
        self.advance_clock(self.rules.fueling_h);
        self.add_on_duty(self.rules.fueling_h);
        self.record_stop(StopKind::Fueling { at_mile: None });
        self.emit(DutyStatus::Driving, "End Fueling");
        self.next_fuel_mi += self.rules.fuel_interval_mi;
        true
    }

    pub fn drop_off(&mut self) {
        if self.leg == LegPhase::ToPickup {
            self.pick_up();
        }
        let label = format!("Dropoff at {}", self.input.dropoff_label);
        self.emit(DutyStatus::OnDutyNotDriving, label);
        self.advance_clock(self.rules.dwell_h);
        self.add_on_duty(self.rules.dwell_h);
        self.emit(DutyStatus::OffDuty, "Off Duty");
    }

    /// One decision cycle. Returns `true` once the trip is complete.
    pub fn step(&mut self) -> bool {
        if let Some(kind) = self.long_rest_due() {
            self.take_long_rest(kind);
        }
        if self.break_due() {
            self.take_break();
        }
        if self.pickup_due() {
            self.pick_up();
        }

        let target = self.drive_target();
        self.drive_to(target);
        self.refuel_if_due();

        if self.is_finished() {
            self.drop_off();
            return true;
        }
        false
    }

    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }
}

/// Upper bound on decision cycles for a trip; generous enough that only a
/// stalled simulation can reach it.
fn iteration_budget(input: &TripPlanInput, rules: &HosRules) -> usize {
    let driving = input.total_hours.max(0.0).ceil() as usize;
    let restarts = (input.cycle_hours_used.max(0.0) / rules.cycle_reset_h).ceil() as usize;
    let fuels = (input.total_miles.max(0.0) / rules.fuel_interval_mi).ceil() as usize;
    1_000usize
        .saturating_add(driving.saturating_mul(16))
        .saturating_add(restarts.saturating_mul(4))
        .saturating_add(fuels.saturating_mul(4))
}

/// Run the duty cycle for a whole trip.
pub fn simulate(
    input: &TripPlanInput,
    profile: &RouteProfile,
    rules: HosRules,
) -> PlanningResult<Timeline> {
    let mut state = SimulatorState::new(input, profile, rules)?;
    state.start();

    let budget = iteration_budget(input, &rules);
    let mut iterations = 0usize;
    while !state.is_finished() {
        if iterations >= budget {
            tracing::error!(iterations, miles = state.miles(), "duty cycle stalled");
            return Err(PlanningError::DegenerateRoute {
                total_miles: input.total_miles,
                total_hours: input.total_hours,
            });
        }
        iterations += 1;
        if state.step() {
            break;
        }
    }

    tracing::debug!(
        iterations,
        events = state.events().len(),
        "duty cycle simulated"
    );
    Ok(state.into_timeline())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 15)
            .unwrap()
            .and_hms_opt(18, 45, 0)
            .unwrap()
    }

    fn input(leg1: f64, total_miles: f64, total_hours: f64, cycle: f64) -> TripPlanInput {
        TripPlanInput {
            leg1_miles: leg1,
            total_miles,
            total_hours,
            cycle_hours_used: cycle,
            start: start(),
            current_label: "Dallas, TX".to_string(),
            pickup_label: "Austin, TX".to_string(),
            dropoff_label: "Los Angeles, CA".to_string(),
        }
    }

    // ~3450 mi straight line so positions exist for every test trip.
    fn profile() -> RouteProfile {
        let coords = (0..=50).map(|d| Coordinate::new(d as f64, 0.0)).collect();
        RouteProfile::new(coords).unwrap()
    }

    fn labels(timeline: &Timeline) -> Vec<&str> {
        timeline.events.iter().map(|e| e.label.as_str()).collect()
    }

    fn absolute(e: &DutyEvent) -> f64 {
        let days = (e.day - start().date()).num_days() as f64;
        days * 24.0 + e.hour
    }

    fn count(timeline: &Timeline, label: &str) -> usize {
        timeline.events.iter().filter(|e| e.label == label).count()
    }

    #[test]
    fn test_zero_duration_is_degenerate() {
        let p = profile();
        let trip = input(100.0, 200.0, 0.0, 0.0);
        assert!(matches!(
            simulate(&trip, &p, HosRules::default()),
            Err(PlanningError::DegenerateRoute { .. })
        ));
        let trip = input(0.0, 0.0, 5.0, 0.0);
        assert!(simulate(&trip, &p, HosRules::default()).is_err());
    }

    #[test]
    fn test_short_trip_timeline() {
        let p = profile();
        let trip = input(100.0, 350.0, 7.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(
            labels(&timeline),
            vec![
                "Start at Dallas, TX",
                "Driving",
                "Pickup at Austin, TX",
                "Start to Dropoff",
                "Driving",
                "Dropoff at Los Angeles, CA",
                "Off Duty",
            ]
        );
        assert!(timeline.stops.is_empty());

        let first = &timeline.events[0];
        assert_eq!(first.status, DutyStatus::OnDutyNotDriving);
        assert!((first.hour - 18.75).abs() < 1e-9);
        // 2h to pickup + 1h dwell
        let resume = &timeline.events[3];
        assert!((resume.hour - 21.75).abs() < 1e-6);
    }

    #[test]
    fn test_ten_hour_trip_takes_one_break_and_no_rest() {
        let p = profile();
        let trip = input(200.0, 500.0, 10.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(count(&timeline, "30min Break"), 1);
        assert_eq!(count(&timeline, "Fueling"), 0);
        assert!(!labels(&timeline).iter().any(|l| l.starts_with("Rest Stop")));
        assert_eq!(timeline.events.last().unwrap().status, DutyStatus::OffDuty);
        assert_eq!(timeline.stops.len(), 1);
        assert_eq!(timeline.stops[0].kind, StopKind::Break);
    }

    #[test]
    fn test_one_fuel_stop_for_fifteen_hundred_miles() {
        let p = profile();
        let trip = input(300.0, 1500.0, 30.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(count(&timeline, "Fueling"), 1);
        assert_eq!(count(&timeline, "End Fueling"), 1);

        let fuel: Vec<&Stop> = timeline
            .stops
            .iter()
            .filter(|s| matches!(s.kind, StopKind::Fueling { .. }))
            .collect();
        assert_eq!(fuel.len(), 1);
        let expected = p.interpolate(1000.0);
        assert!((fuel[0].coordinate.lon - expected.lon).abs() < 1e-9);
    }

    #[test]
    fn test_fuel_events_match_whole_thousands() {
        let p = profile();
        for (miles, expected) in [(999.0, 0), (2500.0, 2), (3200.0, 3), (2000.0, 2)] {
            let trip = input(miles / 3.0, miles, miles / 55.0, 0.0);
            let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
            assert_eq!(count(&timeline, "Fueling"), expected, "{} mi", miles);
        }
    }

    #[test]
    fn test_refuels_on_arrival_at_whole_thousand() {
        let p = profile();
        let trip = input(700.0, 2000.0, 40.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(count(&timeline, "Fueling"), 2);

        let l = labels(&timeline);
        let last_fuel = l.iter().rposition(|s| *s == "Fueling").unwrap();
        let dropoff = l.iter().position(|s| s.starts_with("Dropoff at")).unwrap();
        assert_eq!(dropoff, last_fuel + 2);
        assert_eq!(l[last_fuel + 1], "End Fueling");
    }

    #[test]
    fn test_pickup_at_current_location_happens_first() {
        let p = profile();
        let trip = input(0.0, 120.0, 2.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(timeline.events[1].label, "Pickup at Austin, TX");
        assert_eq!(count(&timeline, "Pickup at Austin, TX"), 1);
    }

    #[test]
    fn test_dropoff_at_pickup_still_records_pickup() {
        let p = profile();
        let trip = input(120.0, 120.0, 2.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(count(&timeline, "Pickup at Austin, TX"), 1);
        let l = labels(&timeline);
        let pickup = l.iter().position(|s| s.starts_with("Pickup")).unwrap();
        let dropoff = l.iter().position(|s| s.starts_with("Dropoff")).unwrap();
        assert!(pickup < dropoff);
    }

    #[test]
    fn test_limits_hold_over_long_trips() {
        let p = profile();
        for (miles, hours, cycle) in [
            (2800.0, 45.0, 0.0),
            (1900.0, 31.0, 40.0),
            (3300.0, 60.0, 65.0),
            (640.0, 11.5, 0.0),
        ] {
            let trip = input(miles * 0.4, miles, hours, cycle);
            let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
            let events = &timeline.events;
            assert_eq!(events.last().unwrap().status, DutyStatus::OffDuty);
            assert_eq!(events.last().unwrap().label, "Off Duty");

            let mut window_start = 0.0;
            let mut drive_day = 0.0;
            let mut since_break = 0.0;
            let t0 = absolute(&events[0]);
            for pair in events.windows(2) {
                let (now, next) = (&pair[0], &pair[1]);
                let (t, t_next) = (absolute(now) - t0, absolute(next) - t0);
                assert!(t_next >= t - 1e-9, "timeline went backwards");
                if now.label.starts_with("Rest Stop") {
                    window_start = t_next;
                    drive_day = 0.0;
                    since_break = 0.0;
                } else if now.label == "30min Break" {
                    since_break = 0.0;
                } else if now.label == "Driving" {
                    drive_day += t_next - t;
                    since_break += t_next - t;
                    assert!(drive_day <= 11.0 + 1e-6, "daily driving {drive_day}");
                    assert!(since_break <= 8.0 + 1e-6, "since break {since_break}");
                    assert!(t_next - window_start <= 14.0 + 1e-6, "window");
                }
            }
        }
    }

    #[test]
    fn test_long_trip_inserts_daily_rest() {
        let p = profile();
        let trip = input(500.0, 1200.0, 22.0, 0.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert!(count(&timeline, "Rest Stop (10hrs)") >= 1);
        assert_eq!(count(&timeline, "Rest Stop (10hrs)"), count(&timeline, "End Rest"));
        assert!(timeline.stops.iter().any(|s| s.kind == StopKind::RestStop));
        // crosses at least one midnight
        assert!(timeline.events.last().unwrap().day > start().date());
    }

    #[test]
    fn test_cycle_limit_forces_restart() {
        let p = profile();
        let trip = input(300.0, 900.0, 16.0, 69.0);
        let timeline = simulate(&trip, &p, HosRules::default()).unwrap();
        assert!(count(&timeline, "Rest Stop (34hrs)") >= 1);
    }

    #[test]
    fn test_restart_subtracts_its_length_from_cycle() {
        let p = profile();
        let trip = input(300.0, 900.0, 16.0, 80.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(state.long_rest_due(), Some(RestKind::CycleRestart));
        state.take_long_rest(RestKind::CycleRestart);
        assert!((state.cycle_hours() - 46.0).abs() < 1e-9);
        assert_eq!(state.long_rest_due(), None);

        let trip = input(300.0, 900.0, 16.0, 70.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        state.take_long_rest(RestKind::CycleRestart);
        assert!((state.cycle_hours() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_rest_keeps_cycle_hours() {
        let p = profile();
        let trip = input(300.0, 900.0, 16.0, 30.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        state.take_long_rest(RestKind::Daily);
        assert!((state.cycle_hours() - 30.0).abs() < 1e-9);
        assert_eq!(state.drive_day_hours(), 0.0);
        assert!((state.last_break_end_hours() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_drive_target_respects_break_limit() {
        let p = profile();
        let trip = input(0.0, 1000.0, 20.0, 0.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        state.pick_up();
        // 8 h at 50 mph
        assert!((state.drive_target() - 400.0).abs() < 1e-9);
        state.drive_to(400.0);
        assert!(state.break_due());
        assert_eq!(state.drive_target(), 400.0);
        state.take_break();
        assert!(!state.break_due());
        // 3 h left of the 11-hour day
        assert!((state.drive_target() - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_drive_target_stops_at_pickup_and_fuel() {
        let p = profile();
        let trip = input(150.0, 2000.0, 40.0, 0.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        assert_eq!(state.drive_target(), 150.0);
        state.drive_to(150.0);
        assert!(state.pickup_due());
        state.pick_up();
        assert_eq!(state.leg(), LegPhase::ToDropoff);
        assert!((state.on_duty_day_hours() - 4.0).abs() < 1e-9);

        let trip = input(0.0, 2000.0, 20.0, 0.0);
        let mut state = SimulatorState::new(&trip, &p, HosRules::default()).unwrap();
        state.pick_up();
        state.drive_to(500.0);
        state.take_break();
        // 6 h of daily driving left at 100 mph, but the fuel stop comes first
        assert_eq!(state.drive_target(), 1000.0);
        state.drive_to(1000.0);
        assert!(state.refuel_if_due());
        assert!(!state.refuel_if_due());
    }
}
