use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::DateTime;
use plotters::prelude::*;

use super::timeline::{CategorySeries, Marker, TimelineReport, Visibility};

const WIDTH: u32 = 1400;
const ROW_H: u32 = 18;

/// Render the visible series as a static PNG snapshot.
///
/// Legend-only series are left out since a bitmap cannot toggle them.
pub fn render(report: &TimelineReport, output_path: &Path) -> Result<()> {
    draw(report, output_path)
        .map_err(|e| anyhow!("Failed to render {}: {}", output_path.display(), e))
}

fn draw(report: &TimelineReport, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let visible: Vec<&CategorySeries> = report
        .series
        .iter()
        .filter(|s| s.visibility == Visibility::Visible)
        .collect();

    let mut libraries: Vec<&str> = Vec::new();
    for point in visible.iter().flat_map(|s| &s.points) {
        if !libraries.contains(&point.library.as_str()) {
            libraries.push(&point.library);
        }
    }
    if libraries.is_empty() {
        return Err("no visible series to draw".into());
    }

    let times = visible
        .iter()
        .flat_map(|s| &s.points)
        .map(|p| p.at.timestamp() as f64);
    let min = times.clone().fold(f64::INFINITY, f64::min);
    let max = times.fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.05).max(86_400.0);

    let rows = libraries.len();
    let height = (rows as u32 * ROW_H + 160).clamp(400, 4000);
    let y_of = |library: &str| {
        let idx = libraries.iter().position(|l| *l == library).unwrap_or(0);
        (rows - 1 - idx) as f64
    };

    let root = BitMapBackend::new(output_path, (WIDTH, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&report.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(160)
        .build_cartesian_2d((min - pad)..(max + pad), -0.5f64..(rows as f64 - 0.5))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Libraries")
        .x_label_formatter(&|x| format_month(*x))
        .y_labels(rows)
        .y_label_formatter(&|y| library_label(&libraries, *y))
        .draw()?;

    for series in visible {
        let color = parse_hex(&series.color).unwrap_or(BLUE);

        chart
            .draw_series(
                marker_points(series, Marker::FirstSeen, &y_of)
                    .map(|xy| Circle::new(xy, 4, color.filled())),
            )?
            .label(series.category.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        chart.draw_series(
            marker_points(series, Marker::LastModified, &y_of)
                .map(|xy| Cross::new(xy, 4, color.stroke_width(2))),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn marker_points<'a>(
    series: &'a CategorySeries,
    marker: Marker,
    y_of: &'a impl Fn(&str) -> f64,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    series
        .points
        .iter()
        .filter(move |p| p.marker == marker)
        .map(move |p| (p.at.timestamp() as f64, y_of(&p.library)))
}

fn format_month(seconds: f64) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Axis label for a row position; rows are stacked top to bottom in `libraries` order.
fn library_label(libraries: &[&str], y: f64) -> String {
    let row = y.round();
    if (y - row).abs() > 0.01 || row < 0.0 || row as usize >= libraries.len() {
        return String::new();
    }
    libraries[libraries.len() - 1 - row as usize].to_string()
}

fn parse_hex(color: &str) -> Option<RGBColor> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c = parse_hex("#636EFA").unwrap();
        assert_eq!((c.0, c.1, c.2), (0x63, 0x6E, 0xFA));
        assert!(parse_hex("636EFA").is_none());
        assert!(parse_hex("#12345").is_none());
        assert!(parse_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_library_label_rows() {
        let libs = ["pandas", "numpy", "flask"];
        assert_eq!(library_label(&libs, 2.0), "pandas");
        assert_eq!(library_label(&libs, 0.0), "flask");
        assert_eq!(library_label(&libs, 0.5), "");
        assert_eq!(library_label(&libs, 3.0), "");
    }

    #[test]
    fn test_nothing_visible_is_error() {
        let report = TimelineReport {
            title: "t".into(),
            series: Vec::new(),
            filename: "report.html".into(),
        };
        let dir = tempfile::TempDir::new().unwrap();
        assert!(render(&report, &dir.path().join("out.png")).is_err());
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month(1_700_000_000.0), "2023-11");
    }
}
