use chrono::{DateTime, Utc};

use crate::category::{CategoryStore, EnabledCategories};
use crate::config::DEFAULT_PALETTE;
use crate::models::LibraryUsageRecord;

/// Which date a point marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    FirstSeen,
    LastModified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Listed in the legend, drawn only once the viewer toggles it on.
    LegendOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub library: String,
    pub at: DateTime<Utc>,
    pub marker: Marker,
}

/// One legend entry: every point of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub color: String,
    pub visibility: Visibility,
    pub points: Vec<TimelinePoint>,
}

/// Fully specified chart, ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineReport {
    pub title: String,
    /// Series in legend order.
    pub series: Vec<CategorySeries>,
    /// Artifact file name derived from the enabled categories.
    pub filename: String,
}

impl TimelineReport {
    /// Libraries in the order they first appear across all series.
    pub fn libraries(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.library.as_str())
            .filter(|l| seen.insert(*l))
            .collect()
    }
}

/// Join usage rows with their categories and build one series per category.
///
/// Rows are ordered by last-modified date, newest first. Colours follow the
/// order in which categories first appear in that ordering; the legend puts
/// enabled categories first.
pub fn build_report(
    records: &[LibraryUsageRecord],
    store: &CategoryStore,
    enabled: &EnabledCategories,
    palette: &[String],
    title: &str,
) -> TimelineReport {
    let mut rows: Vec<(&LibraryUsageRecord, &str)> = records
        .iter()
        .map(|r| (r, store.lookup(&r.library)))
        .collect();
    rows.sort_by(|a, b| b.0.last_modified.cmp(&a.0.last_modified));

    let mut categories: Vec<&str> = Vec::new();
    for &(_, category) in &rows {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let mut series: Vec<CategorySeries> = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let members: Vec<&LibraryUsageRecord> = rows
                .iter()
                .filter(|(_, c)| c == category)
                .map(|(r, _)| *r)
                .collect();

            let starts = members.iter().filter_map(|r| {
                r.first_seen.map(|at| TimelinePoint {
                    library: r.library.clone(),
                    at,
                    marker: Marker::FirstSeen,
                })
            });
            let ends = members.iter().map(|r| TimelinePoint {
                library: r.library.clone(),
                at: r.last_modified,
                marker: Marker::LastModified,
            });

            CategorySeries {
                category: category.to_string(),
                color: palette_color(palette, i).to_string(),
                visibility: if enabled.contains(category) {
                    Visibility::Visible
                } else {
                    Visibility::LegendOnly
                },
                points: starts.chain(ends).collect(),
            }
        })
        .collect();

    let order = legend_order(&categories, enabled);
    series.sort_by_key(|s| order.iter().position(|c| *c == s.category));

    TimelineReport {
        title: title.to_string(),
        series,
        filename: report_filename(enabled.names()),
    }
}

/// Enabled categories first, then the rest; alphabetical within each tier.
pub fn legend_order(categories: &[&str], enabled: &EnabledCategories) -> Vec<String> {
    let mut order: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    order.sort_by(|a, b| {
        let tier = |c: &str| if enabled.contains(c) { 0 } else { 1 };
        tier(a.as_str()).cmp(&tier(b.as_str())).then_with(|| a.cmp(b))
    });
    order.dedup();
    order
}

/// Colour at `index`, wrapping around the palette.
pub fn palette_color(palette: &[String], index: usize) -> &str {
    if palette.is_empty() {
        DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
    } else {
        &palette[index % palette.len()]
    }
}

/// `report_<abbr>-<abbr>….html`, using the shortest prefix length that keeps
/// every enabled category's abbreviation distinct.
pub fn report_filename(enabled: &[String]) -> String {
    let longest = enabled.iter().map(|c| c.chars().count()).max().unwrap_or(1);
    let mut abbreviations: Vec<String> = enabled.to_vec();

    for len in 1..=longest {
        let prefixes: Vec<String> = enabled
            .iter()
            .map(|c| c.chars().take(len).collect())
            .collect();
        let distinct: std::collections::HashSet<&String> = prefixes.iter().collect();
        if distinct.len() == prefixes.len() {
            abbreviations = prefixes;
            break;
        }
    }

    let parts: Vec<String> = abbreviations.iter().map(|a| sanitize(a)).collect();
    format!("report_{}.html", parts.join("-"))
}

fn sanitize(abbreviation: &str) -> String {
    abbreviation
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
