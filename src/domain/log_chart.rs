// Daily log chart layout
//
// Pure layout over a minimal drawing capability; the pixel backend lives in
// infrastructure.
use super::daily_log::DailyLog;
use super::duty::{DutyEvent, DutyStatus};
use super::error::{PlanningError, PlanningResult};

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 600;
pub const GRID_LEFT: f64 = 50.0;
pub const GRID_RIGHT: f64 = 1150.0;
pub const GRID_TOP: f64 = 100.0;
pub const ROW_HEIGHT: f64 = 50.0;
pub const GRID_BOTTOM: f64 = GRID_TOP + 4.0 * ROW_HEIGHT;
pub const HOUR_WIDTH: f64 = (GRID_RIGHT - GRID_LEFT) / 24.0;

const GRID_LINE_WIDTH: u32 = 1;
const TRACE_WIDTH: u32 = 3;
const TICK_LENGTH: f64 = 5.0;
const LABEL_LINE_HEIGHT: f64 = 14.0;
const LABEL_STAGGER: usize = 6;

/// Something the chart can be drawn on. Coordinates are canvas pixels with
/// the origin at the top left.
pub trait LogCanvas {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: u32) -> PlanningResult<()>;
    fn text(&mut self, at: (f64, f64), text: &str) -> PlanningResult<()>;
}

pub fn hour_x(hour: f64) -> f64 {
    GRID_LEFT + hour * HOUR_WIDTH
}

pub fn row_center_y(status: DutyStatus) -> f64 {
    GRID_TOP + status.row() as f64 * ROW_HEIGHT + ROW_HEIGHT / 2.0
}

pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "Mid".to_string(),
        12 => "Noon".to_string(),
        h if h % 12 == 0 => "12".to_string(),
        h => (h % 12).to_string(),
    }
}

/// Hours spent in each status over the charted day, indexed by row.
pub fn status_totals(events: &[DutyEvent]) -> [f64; 4] {
    let mut totals = [0.0; 4];
    for (i, event) in events.iter().enumerate() {
        let end = events.get(i + 1).map_or(24.0, |next| next.hour);
        totals[event.status.row()] += (end - event.hour).max(0.0);
    }
    totals
}

/// Draw one day's log: header, the 4×24 grid, then the stepped status trace.
pub fn render_daily_log<C: LogCanvas>(canvas: &mut C, log: &DailyLog) -> PlanningResult<()> {
    if log.events.is_empty() {
        return Err(PlanningError::EmptyDayEvents { day: log.day });
    }

    canvas.text((GRID_LEFT, 20.0), "Driver's Daily Log")?;
    canvas.text(
        (GRID_LEFT, 40.0),
        &format!("Date: {}", log.day.format("%m/%d/%Y")),
    )?;

    draw_grid(canvas)?;
    draw_trace(canvas, &log.events)?;

    let totals = status_totals(&log.events);
    for status in DutyStatus::ALL {
        let y = GRID_TOP + status.row() as f64 * ROW_HEIGHT + 20.0;
        canvas.text((GRID_RIGHT + 5.0, y), &format!("{:.2}", totals[status.row()]))?;
    }
    Ok(())
}

fn draw_grid<C: LogCanvas>(canvas: &mut C) -> PlanningResult<()> {
    for r in 0..=4 {
        let y = GRID_TOP + r as f64 * ROW_HEIGHT;
        canvas.line((GRID_LEFT, y), (GRID_RIGHT, y), GRID_LINE_WIDTH)?;
    }
    for status in DutyStatus::ALL {
        let y = GRID_TOP + status.row() as f64 * ROW_HEIGHT + 10.0;
        canvas.text((10.0, y), status.label())?;
    }

    for h in 0..=24u32 {
        let x = hour_x(f64::from(h));
        canvas.line((x, GRID_TOP), (x, GRID_BOTTOM), GRID_LINE_WIDTH)?;
        canvas.text((x - 10.0, GRID_TOP - 20.0), &hour_label(h))?;
    }

    for h in 0..24u32 {
        for q in 1..4u32 {
            let x = hour_x(f64::from(h) + f64::from(q) / 4.0);
            canvas.line((x, GRID_TOP), (x, GRID_TOP + TICK_LENGTH), GRID_LINE_WIDTH)?;
            canvas.line((x, GRID_BOTTOM), (x, GRID_BOTTOM - TICK_LENGTH), GRID_LINE_WIDTH)?;
        }
    }
    Ok(())
}

fn draw_trace<C: LogCanvas>(canvas: &mut C, events: &[DutyEvent]) -> PlanningResult<()> {
    let first = &events[0];
    let mut prev_x = hour_x(first.hour);
    let mut prev_status = first.status;
    if !first.label.is_empty() {
        canvas.text((prev_x, GRID_BOTTOM + 10.0), &first.label)?;
    }

    for (i, event) in events.iter().enumerate().skip(1) {
        let x = hour_x(event.hour);
        let y = row_center_y(prev_status);
        let new_y = row_center_y(event.status);
        canvas.line((prev_x, y), (x, y), TRACE_WIDTH)?;
        canvas.line((x, y), (x, new_y), TRACE_WIDTH)?;

        // stagger labels so same-instant events stay readable
        let label_y = GRID_BOTTOM + 10.0 + (i % LABEL_STAGGER) as f64 * LABEL_LINE_HEIGHT;
        canvas.text((x, label_y), &event.label)?;

        prev_x = x;
        prev_status = event.status;
    }

    let y = row_center_y(prev_status);
    canvas.line((prev_x, y), (GRID_RIGHT, y), TRACE_WIDTH)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingCanvas {
        lines: Vec<((f64, f64), (f64, f64), u32)>,
        texts: Vec<((f64, f64), String)>,
    }

    impl LogCanvas for RecordingCanvas {
        fn line(&mut self, from: (f64, f64), to: (f64, f64), width: u32) -> PlanningResult<()> {
            self.lines.push((from, to, width));
            Ok(())
        }

        fn text(&mut self, at: (f64, f64), text: &str) -> PlanningResult<()> {
            self.texts.push((at, text.to_string()));
            Ok(())
        }
    }

    impl RecordingCanvas {
        fn trace(&self) -> Vec<((f64, f64), (f64, f64))> {
            self.lines
                .iter()
                .filter(|(_, _, w)| *w == TRACE_WIDTH)
                .map(|(a, b, _)| (*a, *b))
                .collect()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    fn log(events: Vec<DutyEvent>) -> DailyLog {
        DailyLog { day: day(), events }
    }

    #[test]
    fn test_empty_day_is_rejected() {
        let mut canvas = RecordingCanvas::default();
        assert_eq!(
            render_daily_log(&mut canvas, &log(Vec::new())),
            Err(PlanningError::EmptyDayEvents { day: day() })
        );
        assert!(canvas.lines.is_empty());
    }

    #[test]
    fn test_single_event_day_grid_geometry() {
        let mut canvas = RecordingCanvas::default();
        let events = vec![DutyEvent::new(day(), 0.0, DutyStatus::OffDuty, "")];
        render_daily_log(&mut canvas, &log(events)).unwrap();

        let grid: Vec<_> = canvas.lines.iter().filter(|(_, _, w)| *w == GRID_LINE_WIDTH).collect();
        // 5 row rules, 25 hour lines, 3 quarter ticks top and bottom per hour
        assert_eq!(grid.len(), 5 + 25 + 24 * 3 * 2);
        assert_eq!(grid[0].0, (50.0, 100.0));
        assert_eq!(grid[4].1, (1150.0, 300.0));

        let hour_lines: Vec<_> = grid
            .iter()
            .filter(|(a, b, _)| a.0 == b.0 && a.1 == GRID_TOP && b.1 == GRID_BOTTOM)
            .collect();
        assert_eq!(hour_lines.len(), 25);
        assert_eq!(hour_lines[12].0 .0, 600.0);

        assert_eq!(canvas.trace(), vec![((50.0, 125.0), (1150.0, 125.0))]);
        assert!(canvas.texts.iter().any(|(_, t)| t == "Date: 10/15/2025"));
        assert!(canvas.texts.iter().any(|(_, t)| t == "Noon"));
    }

    #[test]
    fn test_stepped_trace() {
        let mut canvas = RecordingCanvas::default();
        let events = vec![
            DutyEvent::new(day(), 0.0, DutyStatus::OffDuty, ""),
            DutyEvent::new(day(), 6.0, DutyStatus::Driving, "Driving"),
            DutyEvent::new(day(), 12.0, DutyStatus::OnDutyNotDriving, "Pickup"),
        ];
        render_daily_log(&mut canvas, &log(events)).unwrap();

        let x6 = 50.0 + 6.0 * HOUR_WIDTH;
        assert_eq!(
            canvas.trace(),
            vec![
                ((50.0, 125.0), (x6, 125.0)),
                ((x6, 125.0), (x6, 225.0)),
                ((x6, 225.0), (600.0, 225.0)),
                ((600.0, 225.0), (600.0, 275.0)),
                ((600.0, 275.0), (1150.0, 275.0)),
            ]
        );
        let labels: Vec<_> = canvas
            .texts
            .iter()
            .filter(|((_, y), _)| *y > GRID_BOTTOM)
            .map(|((x, _), t)| (*x, t.as_str()))
            .collect();
        assert_eq!(labels, vec![(x6, "Driving"), (600.0, "Pickup")]);
    }

    #[test]
    fn test_hour_labels() {
        let labels: Vec<String> = [0, 1, 11, 12, 13, 23, 24].into_iter().map(hour_label).collect();
        assert_eq!(labels, vec!["Mid", "1", "11", "Noon", "1", "11", "12"]);
    }

    #[test]
    fn test_status_totals_cover_whole_day() {
        let events = vec![
            DutyEvent::new(day(), 0.0, DutyStatus::OffDuty, ""),
            DutyEvent::new(day(), 6.0, DutyStatus::Driving, ""),
            DutyEvent::new(day(), 14.5, DutyStatus::OnDutyNotDriving, ""),
            DutyEvent::new(day(), 15.0, DutyStatus::SleeperBerth, ""),
        ];
        let totals = status_totals(&events);
        assert_eq!(totals, [6.0, 9.0, 8.5, 0.5]);
        assert!((totals.iter().sum::<f64>() - 24.0).abs() < 1e-12);
    }
}
