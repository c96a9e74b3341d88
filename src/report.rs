//! Plain-text and JSON renderings of derived views.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use crate::app::{DerivedViews, PlotTrace, TableRow};
use crate::processing::statistics::{AggregateLastValueStats, DescriptiveStats};

/// Shown in place of an undefined statistic.
pub const UNDEFINED: &str = "n/a";

const STAT_HEADERS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

pub fn format_stat(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => UNDEFINED.to_string(),
    }
}

fn stat_cells(stats: &DescriptiveStats, precision: usize) -> Vec<String> {
    let mut cells = vec![stats.count.to_string()];
    cells.extend(
        [stats.mean, stats.std, stats.min, stats.q25, stats.median, stats.q75, stats.max]
            .into_iter()
            .map(|v| format_stat(v, precision)),
    );
    cells
}

/// Lay out rows under a header with every column padded to its widest cell.
/// The first column is left-aligned, the rest right-aligned.
fn render_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render_row = |row: &[String]| {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&render_row(&header));
    out.push('\n');
    let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule));
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

fn stats_header(first: &str) -> Vec<String> {
    std::iter::once(first)
        .chain(STAT_HEADERS)
        .map(str::to_string)
        .collect()
}

pub fn render_table_rows(rows: &[TableRow], precision: usize) -> String {
    if rows.is_empty() {
        return "(no series in table)\n".to_string();
    }
    let body = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.display_name.clone()];
            cells.extend(stat_cells(&row.stats, precision));
            cells
        })
        .collect();
    render_grid(stats_header("series"), body)
}

pub fn render_aggregate(aggregate: &AggregateLastValueStats, precision: usize) -> String {
    let label = format!("last values ({} series)", aggregate.series.len());
    let mut cells = vec![label];
    cells.extend(stat_cells(&aggregate.stats, precision));
    render_grid(stats_header("aggregate"), vec![cells])
}

/// One line per trace: name, point count and the plotted x range.
pub fn render_traces(traces: &[PlotTrace], precision: usize) -> String {
    if traces.is_empty() {
        return "(no series plotted)\n".to_string();
    }
    let body = traces
        .iter()
        .map(|trace| {
            let first = trace.samples.first();
            let last = trace.samples.last();
            vec![
                trace.display_name.clone(),
                trace.samples.len().to_string(),
                format_stat(first.map(|s| s.x), precision),
                format_stat(last.map(|s| s.x), precision),
                format_stat(last.map(|s| s.y), precision),
            ]
        })
        .collect();
    let header = ["trace", "points", "x from", "x to", "last y"]
        .into_iter()
        .map(str::to_string)
        .collect();
    render_grid(header, body)
}

/// Full text rendering of a set of views.
pub fn render_views(views: &DerivedViews, precision: usize) -> String {
    format!(
        "Plotted traces\n{}\nStatistics\n{}\nAggregate of last values\n{}",
        render_traces(&views.plot_traces, precision),
        render_table_rows(&views.table_rows, precision),
        render_aggregate(&views.aggregate_last_value_stats, precision),
    )
}

/// Table statistics keyed by series name. Undefined values become `null`.
pub fn statistics_json(views: &DerivedViews) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = views
        .table_rows
        .iter()
        .map(|row| {
            let stats = serde_json::to_value(row.stats).unwrap_or(serde_json::Value::Null);
            (row.series.clone(), stats)
        })
        .collect();
    serde_json::Value::Object(map)
}

/// Write `statistics.json` into `dir`, creating it if needed.
pub fn write_statistics_json(views: &DerivedViews, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("statistics.json");
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, &statistics_json(views))?;
    tracing::info!("Saved statistics to {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AggregationController;
    use crate::state::series_store::Sample;

    fn views() -> DerivedViews {
        let mut controller = AggregationController::new();
        controller.add_series(
            "run1.csv",
            vec![Sample::new(1.0, 2.0), Sample::new(2.0, 4.0)],
        );
        controller.add_series("empty.csv", Vec::new());
        controller.set_display_name("run1.csv", "Baseline").unwrap();
        controller.recompute_derived_views(100)
    }

    #[test]
    fn undefined_renders_as_placeholder() {
        assert_eq!(format_stat(None, 3), "n/a");
        assert_eq!(format_stat(Some(1.23456), 2), "1.23");
    }

    #[test]
    fn table_lists_display_names_and_placeholders() {
        let text = render_table_rows(&views().table_rows, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("series"));
        assert!(lines[2].starts_with("Baseline"));
        assert!(lines[2].contains("3.00"));
        assert!(lines[3].starts_with("empty.csv"));
        assert_eq!(lines[3].matches(UNDEFINED).count(), 7);
    }

    #[test]
    fn aggregate_counts_contributing_series() {
        let text = render_aggregate(&views().aggregate_last_value_stats, 1);
        assert!(text.contains("last values (1 series)"));
        assert!(text.contains("4.0"));
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(render_table_rows(&[], 3), "(no series in table)\n");
        assert_eq!(render_traces(&[], 3), "(no series plotted)\n");
    }

    #[test]
    fn statistics_json_uses_null_for_undefined() {
        let json = statistics_json(&views());
        assert_eq!(json["run1.csv"]["count"], 2);
        assert_eq!(json["run1.csv"]["mean"], 3.0);
        assert_eq!(json["empty.csv"]["count"], 0);
        assert!(json["empty.csv"]["75%"].is_null());
    }

    #[test]
    fn writes_statistics_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_statistics_json(&views(), &dir.path().join("out")).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, statistics_json(&views()));
    }
}
