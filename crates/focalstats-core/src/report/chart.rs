use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use chrono::NaiveDate;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;

// 10x6 inches at 160 dpi
const WIDTH: u32 = 1600;
const HEIGHT: u32 = 960;

const MARGIN_LEFT: i32 = 120;
const MARGIN_RIGHT: i32 = 40;
const MARGIN_TOP: i32 = 100;
const MARGIN_BOTTOM: i32 = 130;

const TITLE_SCALE: f32 = 34.0;
const LABEL_SCALE: f32 = 26.0;
const TICK_SCALE: f32 = 20.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([31, 119, 180]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

/// Fonts tried when none is given on the command line.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

pub fn load_font(path: &Path) -> anyhow::Result<FontArc> {
    let bytes = std::fs::read(path)?;
    Ok(FontArc::try_from_vec(bytes)?)
}

/// First loadable font from the usual system locations.
pub fn find_system_font() -> Option<(PathBuf, FontArc)> {
    SYSTEM_FONTS.iter().map(PathBuf::from).find_map(|path| {
        let font = load_font(&path).ok()?;
        Some((path, font))
    })
}

pub fn chart_title(date: NaiveDate) -> String {
    format!("Focal-length usage (full-frame eq.) - {}", date.format("%Y-%m-%d"))
}

/// Tick spacing of 1, 2 or 5 times a power of ten giving at most ~8 ticks.
fn tick_step(max: u64) -> u64 {
    let mut magnitude = 1;
    loop {
        for step in [1, 2, 5] {
            if max / (step * magnitude) <= 8 {
                return step * magnitude;
            }
        }
        magnitude *= 10;
    }
}

/// Horizontal placement of bars: value `v` is centered at `x(v)`.
struct XAxis {
    low: f32,
    px_per_mm: f32,
}

impl XAxis {
    fn new(min: u32, max: u32, width: f32) -> Self {
        let low = min as f32 - 1.0;
        let span = (max as f32 + 1.0) - low;
        Self {
            low,
            px_per_mm: width / span,
        }
    }

    fn x(&self, mm: u32) -> f32 {
        MARGIN_LEFT as f32 + (mm as f32 - self.low) * self.px_per_mm
    }
}

/// Render the 35mm-equivalent histogram as a bar chart.
///
/// Without a font the bars and axes are still drawn, just unlabeled.
pub fn render_chart(
    histogram: &BTreeMap<u32, u64>,
    date: NaiveDate,
    font: Option<&FontArc>,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let (Some((&min_mm, _)), Some((&max_mm, _))) =
        (histogram.first_key_value(), histogram.last_key_value())
    else {
        return img;
    };

    let plot_w = (WIDTH as i32 - MARGIN_LEFT - MARGIN_RIGHT) as f32;
    let plot_h = (HEIGHT as i32 - MARGIN_TOP - MARGIN_BOTTOM) as f32;
    let baseline = (HEIGHT as i32 - MARGIN_BOTTOM) as f32;

    let max_count = histogram.values().copied().max().unwrap_or(1).max(1);
    let step = tick_step(max_count);
    let y_top = (max_count.div_ceil(step) * step).max(1) as f32;
    let y = |count: u64| baseline - count as f32 / y_top * plot_h;

    let axis = XAxis::new(min_mm, max_mm, plot_w);
    let bar_w = axis.px_per_mm.max(1.0);

    // Horizontal grid and y ticks
    let mut tick = 0;
    while tick as f32 <= y_top {
        let ty = y(tick);
        draw_line_segment_mut(
            &mut img,
            (MARGIN_LEFT as f32, ty),
            (MARGIN_LEFT as f32 + plot_w, ty),
            GRID,
        );
        draw_line_segment_mut(&mut img, (MARGIN_LEFT as f32 - 8.0, ty), (MARGIN_LEFT as f32, ty), INK);
        if let Some(font) = font {
            let label = tick.to_string();
            let (w, h) = text_size(TICK_SCALE, font, &label);
            draw_text_mut(
                &mut img,
                INK,
                MARGIN_LEFT - 14 - w as i32,
                ty as i32 - h as i32 / 2,
                TICK_SCALE,
                font,
                &label,
            );
        }
        tick += step;
    }

    // Bars
    for (&mm, &count) in histogram {
        let left = axis.x(mm) - bar_w / 2.0;
        let top = y(count);
        let height = (baseline - top).round().max(1.0) as u32;
        let rect = Rect::at(left.round() as i32, top.round() as i32)
            .of_size(bar_w.round().max(1.0) as u32, height);
        draw_filled_rect_mut(&mut img, rect, BAR);
        draw_hollow_rect_mut(&mut img, rect, INK);
    }

    // Axes
    draw_line_segment_mut(
        &mut img,
        (MARGIN_LEFT as f32, MARGIN_TOP as f32),
        (MARGIN_LEFT as f32, baseline),
        INK,
    );
    draw_line_segment_mut(
        &mut img,
        (MARGIN_LEFT as f32, baseline),
        (MARGIN_LEFT as f32 + plot_w, baseline),
        INK,
    );

    let Some(font) = font else {
        return img;
    };

    // X ticks at every observed value, skipping labels that would overlap
    let mut last_label_end = i32::MIN;
    for &mm in histogram.keys() {
        let cx = axis.x(mm);
        draw_line_segment_mut(&mut img, (cx, baseline), (cx, baseline + 8.0), INK);
        let label = mm.to_string();
        let (w, _) = text_size(TICK_SCALE, font, &label);
        let lx = cx as i32 - w as i32 / 2;
        if lx > last_label_end + 4 {
            draw_text_mut(&mut img, INK, lx, baseline as i32 + 14, TICK_SCALE, font, &label);
            last_label_end = lx + w as i32;
        }
    }

    let title = chart_title(date);
    let (w, _) = text_size(TITLE_SCALE, font, &title);
    draw_text_mut(&mut img, INK, (WIDTH as i32 - w as i32) / 2, 30, TITLE_SCALE, font, &title);

    let x_label = "Focal length (mm, FF eq.)";
    let (w, _) = text_size(LABEL_SCALE, font, x_label);
    draw_text_mut(
        &mut img,
        INK,
        MARGIN_LEFT + (plot_w as i32 - w as i32) / 2,
        HEIGHT as i32 - 60,
        LABEL_SCALE,
        font,
        x_label,
    );
    draw_text_mut(&mut img, INK, 20, MARGIN_TOP - 40, LABEL_SCALE, font, "Frames");

    img
}

/// Render and save as PNG.
pub fn write_chart(
    path: &Path,
    histogram: &BTreeMap<u32, u64>,
    date: NaiveDate,
    font: Option<&FontArc>,
) -> image::ImageResult<()> {
    render_chart(histogram, date, font).save_with_format(path, image::ImageFormat::Png)
}
