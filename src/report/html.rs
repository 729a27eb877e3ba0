use std::path::Path;

use anyhow::{Context, Result};
use plotly::common::{Marker as PointStyle, MarkerSymbol, Mode, Title, Visible};
use plotly::layout::{Axis, AxisType, Layout, Legend};
use plotly::{Plot, Scatter};

use super::timeline::{CategorySeries, Marker, TimelineReport, Visibility};

const GRID_COLOR: &str = "#EBF0F8";

/// Write the report as a standalone interactive HTML page.
pub fn render(report: &TimelineReport, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, to_html(report))
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    Ok(())
}

/// Build the page with plotly.js inlined, so it renders without network access.
pub fn to_html(report: &TimelineReport) -> String {
    figure(report).to_html()
}

/// One legend group per category: a circle trace for first-seen dates and a
/// cross trace for last-modified dates.
fn figure(report: &TimelineReport) -> Plot {
    let mut plot = Plot::new();
    for series in &report.series {
        plot.add_trace(trace(series, Marker::FirstSeen));
        plot.add_trace(trace(series, Marker::LastModified));
    }

    plot.set_layout(
        Layout::new()
            .title(Title::from(report.title.as_str()))
            .x_axis(
                Axis::new()
                    .title(Title::from("Date"))
                    .type_(AxisType::Date)
                    .grid_color(GRID_COLOR),
            )
            .y_axis(
                Axis::new()
                    .title(Title::from("Libraries"))
                    .type_(AxisType::Category)
                    .grid_color(GRID_COLOR),
            )
            .legend(Legend::new().title(Title::from("Categories")))
            .paper_background_color("white")
            .plot_background_color("white"),
    );
    plot
}

fn trace(series: &CategorySeries, marker: Marker) -> Box<Scatter<String, String>> {
    let (x, y): (Vec<String>, Vec<String>) = series
        .points
        .iter()
        .filter(|p| p.marker == marker)
        .map(|p| (p.at.format("%Y-%m-%d %H:%M:%S").to_string(), p.library.clone()))
        .unzip();
    let visible = match series.visibility {
        Visibility::Visible => Visible::True,
        Visibility::LegendOnly => Visible::LegendOnly,
    };
    let symbol = match marker {
        Marker::FirstSeen => MarkerSymbol::Circle,
        Marker::LastModified => MarkerSymbol::X,
    };

    Scatter::new(x, y)
        .mode(Mode::Markers)
        .name(series.category.as_str())
        .legend_group(series.category.as_str())
        .show_legend(marker == Marker::FirstSeen)
        .visible(visible)
        .marker(PointStyle::new().color(series.color.clone()).symbol(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::timeline::TimelinePoint;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn report() -> TimelineReport {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let series = |category: &str, visibility| CategorySeries {
            category: category.to_string(),
            color: "#636EFA".to_string(),
            visibility,
            points: vec![
                TimelinePoint {
                    library: "pydantic".into(),
                    at,
                    marker: Marker::FirstSeen,
                },
                TimelinePoint {
                    library: "pydantic".into(),
                    at,
                    marker: Marker::LastModified,
                },
            ],
        };
        TimelineReport {
            title: "Libraries over time".into(),
            series: vec![
                series("Web", Visibility::Visible),
                series("Data", Visibility::LegendOnly),
            ],
            filename: "report_W.html".into(),
        }
    }

    #[test]
    fn test_figure_traces() {
        let fig: Value = serde_json::from_str(&figure(&report()).to_json()).unwrap();
        let traces = fig["data"].as_array().unwrap();
        assert_eq!(traces.len(), 4);

        assert_eq!(traces[0]["name"], "Web");
        assert_eq!(traces[0]["legendgroup"], "Web");
        assert_eq!(traces[0]["visible"], true);
        assert_eq!(traces[0]["marker"]["symbol"], "circle");
        assert_eq!(traces[0]["x"], json!(["2024-02-29 12:00:00"]));
        assert_eq!(traces[1]["marker"]["symbol"], "x");
        assert_eq!(traces[1]["showlegend"], false);
        assert_eq!(traces[2]["visible"], "legendonly");
        assert_eq!(traces[3]["legendgroup"], "Data");

        assert_eq!(fig["layout"]["legend"]["title"]["text"], "Categories");
        assert_eq!(fig["layout"]["xaxis"]["type"], "date");
    }

    #[test]
    fn test_html_embeds_plotly() {
        let html = to_html(&report());
        assert!(html.contains("Plotly.newPlot"));
        assert!(!html.contains("<script src="));
    }
}
