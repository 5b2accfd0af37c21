//! SVG rendering of the CAPM regression.
//!
//! Draws the monthly (market return, stock return) scatter with the fitted
//! line `R_a = beta * R_m + alpha` overlaid, as a self-contained SVG
//! document. The figure dimensions follow the usual Matplotlib aspect
//! ratio for regression plots.

use std::fs;
use std::path::Path;
use thiserror::Error;

const WIDTH: i32 = 720;
const HEIGHT: i32 = 480;
const PADDING: f64 = 48.0;

const POINT_COLOR: &str = "#348dc1";
const LINE_COLOR: &str = "#c44e52";
const AXIS_COLOR: &str = "#8c8c8c";
const GRID_COLOR: &str = "#e0e0e0";

/// Errors that can occur while rendering or writing a plot.
#[derive(Debug, Error)]
pub enum PlotError {
    /// No finite points to plot
    #[error("No finite data points to plot")]
    EmptyData,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn svg_header(width: i32, height: i32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#444}}</style>"#,
        w = width,
        h = height
    )
}

const fn svg_footer() -> &'static str {
    "</svg>"
}

fn format_return(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Evenly spaced tick values covering `[min_v, max_v]`.
fn tick_values(min_v: f64, max_v: f64, count: usize) -> Vec<f64> {
    let step = (max_v - min_v) / (count - 1) as f64;
    (0..count).map(|i| min_v + step * i as f64).collect()
}

struct PlotArea {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl PlotArea {
    fn from_points(points: &[(f64, f64)], alpha: f64, beta: f64) -> Self {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        // The fitted line endpoints must stay inside the frame too.
        for x in [x_min, x_max] {
            let y = beta * x + alpha;
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        // Pad 8% so points do not sit on the frame; degenerate ranges get
        // a small absolute margin instead.
        let x_pad = ((x_max - x_min) * 0.08).max(1e-4);
        let y_pad = ((y_max - y_min) * 0.08).max(1e-4);

        Self {
            x_min: x_min - x_pad,
            x_max: x_max + x_pad,
            y_min: y_min - y_pad,
            y_max: y_max + y_pad,
        }
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let inner_w = f64::from(WIDTH) - 2.0 * PADDING;
        let inner_h = f64::from(HEIGHT) - 2.0 * PADDING;
        let px = PADDING + (x - self.x_min) / (self.x_max - self.x_min) * inner_w;
        let py = f64::from(HEIGHT) - PADDING - (y - self.y_min) / (self.y_max - self.y_min) * inner_h;
        (px, py)
    }
}

fn draw_axes(svg: &mut String, area: &PlotArea) {
    let left = PADDING;
    let right = f64::from(WIDTH) - PADDING;
    let top = PADDING;
    let bottom = f64::from(HEIGHT) - PADDING;

    svg.push_str(&format!(
        r#"<rect x="{left}" y="{top}" width="{w}" height="{h}" fill="none" stroke="{color}" stroke-width="1"/>"#,
        left = left,
        top = top,
        w = right - left,
        h = bottom - top,
        color = AXIS_COLOR
    ));

    for tick in tick_values(area.x_min, area.x_max, 6) {
        let (px, _) = area.to_px(tick, area.y_min);
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="{color}" stroke-width="0.5"/>"#,
            x = px,
            top = top,
            bottom = bottom,
            color = GRID_COLOR
        ));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle">{label}</text>"#,
            x = px,
            y = bottom + 16.0,
            label = format_return(tick)
        ));
    }

    for tick in tick_values(area.y_min, area.y_max, 6) {
        let (_, py) = area.to_px(area.x_min, tick);
        svg.push_str(&format!(
            r#"<line x1="{left}" y1="{y}" x2="{right}" y2="{y}" stroke="{color}" stroke-width="0.5"/>"#,
            left = left,
            right = right,
            y = py,
            color = GRID_COLOR
        ));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="end">{label}</text>"#,
            x = left - 6.0,
            y = py + 3.5,
            label = format_return(tick)
        ));
    }

    // Axis titles.
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="13">Market returns R_m</text>"#,
        x = f64::from(WIDTH) / 2.0,
        y = f64::from(HEIGHT) - 10.0
    ));
    svg.push_str(&format!(
        r#"<text x="14" y="{y}" text-anchor="middle" font-size="13" transform="rotate(-90 14 {y})">Stock returns R_a</text>"#,
        y = f64::from(HEIGHT) / 2.0
    ));
}

fn draw_legend(svg: &mut String) {
    let x = PADDING + 12.0;
    let y = PADDING + 16.0;

    svg.push_str(&format!(
        r#"<circle cx="{cx}" cy="{cy}" r="3.5" fill="{color}"/>"#,
        cx = x,
        cy = y - 3.5,
        color = POINT_COLOR
    ));
    svg.push_str(&format!(
        r#"<text x="{tx}" y="{ty}">Monthly returns</text>"#,
        tx = x + 10.0,
        ty = y
    ));
    svg.push_str(&format!(
        r#"<line x1="{x1}" y1="{ly}" x2="{x2}" y2="{ly}" stroke="{color}" stroke-width="2"/>"#,
        x1 = x - 4.0,
        x2 = x + 6.0,
        ly = y + 12.5,
        color = LINE_COLOR
    ));
    svg.push_str(&format!(
        r#"<text x="{tx}" y="{ty}">CAPM line</text>"#,
        tx = x + 10.0,
        ty = y + 16.0
    ));
}

/// Render the regression figure as an SVG document.
///
/// `points` are `(market_return, stock_return)` pairs; non-finite entries
/// are dropped before rendering.
pub fn render_regression(
    points: &[(f64, f64)],
    alpha: f64,
    beta: f64,
) -> Result<String, PlotError> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if points.is_empty() {
        return Err(PlotError::EmptyData);
    }

    let area = PlotArea::from_points(&points, alpha, beta);
    let mut svg = String::new();
    svg.push_str(&svg_header(WIDTH, HEIGHT));

    draw_axes(&mut svg, &area);

    // Fitted line across the full x-range, under the scatter.
    let (x1, y1) = area.to_px(area.x_min, beta * area.x_min + alpha);
    let (x2, y2) = area.to_px(area.x_max, beta * area.x_max + alpha);
    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="2"/>"#,
        x1 = x1,
        y1 = y1,
        x2 = x2,
        y2 = y2,
        color = LINE_COLOR
    ));

    for &(x, y) in &points {
        let (px, py) = area.to_px(x, y);
        svg.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="3.5" fill="{color}" fill-opacity="0.75"/>"#,
            cx = px,
            cy = py,
            color = POINT_COLOR
        ));
    }

    // Title and the fitted-formula annotation.
    svg.push_str(&format!(
        r#"<text x="{x}" y="22" text-anchor="middle" font-size="16">Capital Asset Pricing Model</text>"#,
        x = f64::from(WIDTH) / 2.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" text-anchor="end">R_a = {beta:.4} * R_m + {alpha:.4}</text>"#,
        x = f64::from(WIDTH) - PADDING - 8.0,
        y = PADDING + 16.0,
        beta = beta,
        alpha = alpha
    ));

    draw_legend(&mut svg);
    svg.push_str(svg_footer());

    Ok(svg)
}

/// Render the regression figure and write it to `path`.
pub fn save_regression<P: AsRef<Path>>(
    path: P,
    points: &[(f64, f64)],
    alpha: f64,
    beta: f64,
) -> Result<(), PlotError> {
    let svg = render_regression(points, alpha, beta)?;
    fs::write(path, svg)?;
    Ok(())
}
