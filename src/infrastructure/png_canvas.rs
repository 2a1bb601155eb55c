// PNG rendering of daily log charts on a plotters bitmap backend
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::daily_log::DailyLog;
use crate::domain::error::{PlanningError, PlanningResult};
use crate::domain::log_chart::{CANVAS_HEIGHT, CANVAS_WIDTH, LogCanvas, render_daily_log};
use crate::infrastructure::glyphs::text_pixels;

fn render_error(err: impl std::fmt::Display) -> PlanningError {
    PlanningError::Render(err.to_string())
}

fn to_pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// `LogCanvas` over an RGB pixel buffer.
pub struct BitmapCanvas<'a> {
    area: DrawingArea<BitMapBackend<'a>, Shift>,
}

impl<'a> BitmapCanvas<'a> {
    /// `pixels` must hold `width * height * 3` bytes.
    pub fn new(pixels: &'a mut [u8], size: (u32, u32)) -> PlanningResult<Self> {
        let area = BitMapBackend::with_buffer(pixels, size).into_drawing_area();
        area.fill(&WHITE).map_err(render_error)?;
        Ok(Self { area })
    }

    pub fn finish(self) -> PlanningResult<()> {
        self.area.present().map_err(render_error)
    }
}

impl LogCanvas for BitmapCanvas<'_> {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: u32) -> PlanningResult<()> {
        let style = BLACK.stroke_width(width);
        self.area
            .draw(&PathElement::new(vec![to_pixel(from), to_pixel(to)], style))
            .map_err(render_error)
    }

    fn text(&mut self, at: (f64, f64), text: &str) -> PlanningResult<()> {
        let (x, y) = to_pixel(at);
        for (dx, dy) in text_pixels(text) {
            self.area
                .draw_pixel((x + dx, y + dy), &BLACK)
                .map_err(render_error)?;
        }
        Ok(())
    }
}

/// Render one day's chart and encode it as PNG.
pub fn render_png(log: &DailyLog) -> PlanningResult<Vec<u8>> {
    let (width, height) = (CANVAS_WIDTH, CANVAS_HEIGHT);
    let mut pixels = vec![0u8; (width * height * 3) as usize];

    {
        let mut canvas = BitmapCanvas::new(&mut pixels, (width, height))?;
        render_daily_log(&mut canvas, log)?;
        canvas.finish()?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, ColorType::Rgb8)
        .map_err(render_error)?;
    Ok(png)
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duty::{DutyEvent, DutyStatus};
    use crate::domain::log_chart::{GRID_BOTTOM, GRID_LEFT, GRID_TOP, row_center_y};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    #[test]
    fn test_single_event_png_has_fixed_canvas() {
        let log = DailyLog {
            day: day(),
            events: vec![DutyEvent::new(day(), 0.0, DutyStatus::OffDuty, "")],
        };
        let png = render_png(&log).unwrap();
        assert!(png.starts_with(b"\x89PNG"));

        let img = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (1200, 600));

        // grid corner and the off-duty trace are dark, the margin is white
        let dark = |x: u32, y: u32| img.get_pixel(x, y).0[0] < 128;
        assert!(dark(GRID_LEFT as u32, GRID_TOP as u32));
        assert!(dark(600, GRID_BOTTOM as u32));
        assert!(dark(900, row_center_y(DutyStatus::OffDuty) as u32));
        assert!(!dark(900, row_center_y(DutyStatus::Driving) as u32));
        assert!(!dark(1190, 590));
    }

    #[test]
    fn test_multi_event_png() {
        let log = DailyLog {
            day: day(),
            events: vec![
                DutyEvent::new(day(), 0.0, DutyStatus::OffDuty, "Start"),
                DutyEvent::new(day(), 4.0, DutyStatus::Driving, "Driving"),
                DutyEvent::new(day(), 6.0, DutyStatus::OffDuty, "Stop"),
            ],
        };
        let png = render_png(&log).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 600));
    }

    #[test]
    fn test_empty_log_is_an_error() {
        let log = DailyLog {
            day: day(),
            events: Vec::new(),
        };
        assert_eq!(
            render_png(&log),
            Err(PlanningError::EmptyDayEvents { day: day() })
        );
    }

    #[test]
    fn test_data_url_prefix() {
        let url = png_data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }
}
