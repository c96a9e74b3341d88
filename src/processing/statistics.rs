use serde::{Deserialize, Serialize};
use crate::state::selection::SelectionState;
use crate::state::series_store::SeriesStore;

/// Count, mean, sample standard deviation, min, quartiles and max.
///
/// Every field except `count` is `None` when it is undefined for the input:
/// all of them for an empty input, and `std` for fewer than two values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl DescriptiveStats {
    /// The "no data" result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `max - min`, if defined.
    pub fn peak_to_peak(&self) -> Option<f64> {
        Some(self.max? - self.min?)
    }
}

/// Summary over the last y value of each series counted in the aggregate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateLastValueStats {
    /// Names of the series whose last value contributed, in store order.
    pub series: Vec<String>,
    #[serde(flatten)]
    pub stats: DescriptiveStats,
}

/// Quantile `q` of already sorted values, interpolating linearly between
/// the two nearest order statistics.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Compute descriptive statistics for a sequence of values.
pub fn describe(values: &[f64]) -> DescriptiveStats {
    if values.is_empty() {
        return DescriptiveStats::empty();
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let std = if count >= 2 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    DescriptiveStats {
        count,
        mean: Some(mean),
        std,
        min: Some(sorted[0]),
        q25: Some(quantile_sorted(&sorted, 0.25)),
        median: Some(quantile_sorted(&sorted, 0.5)),
        q75: Some(quantile_sorted(&sorted, 0.75)),
        max: Some(sorted[count - 1]),
    }
}

/// Describe the final y value of every series not excluded from the
/// aggregate. Empty series contribute nothing.
pub fn describe_aggregate_of_last_values(
    store: &SeriesStore,
    selection: &SelectionState,
) -> AggregateLastValueStats {
    let mut series = Vec::new();
    let mut last_values = Vec::new();
    for s in store.iter() {
        if !selection.is_included(&s.name) {
            continue;
        }
        if let Some(y) = s.last_y() {
            series.push(s.name.clone());
            last_values.push(y);
        }
    }

    AggregateLastValueStats {
        series,
        stats: describe(&last_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::series_store::Sample;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn empty_input_is_undefined() {
        let stats = describe(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.is_empty());
        assert_eq!(stats, DescriptiveStats::empty());
        assert_eq!(stats.peak_to_peak(), None);
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = describe(&[4.5]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, Some(4.5));
        assert_eq!(stats.std, None);
        assert_eq!(stats.min, Some(4.5));
        assert_eq!(stats.median, Some(4.5));
        assert_eq!(stats.max, Some(4.5));
    }

    #[test]
    fn sample_standard_deviation() {
        let stats = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!(close(stats.mean, 5.0));
        assert!(close(stats.std, 2.138_089_935_299_395));
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = describe(&[4.0, 1.0, 3.0, 2.0]);
        assert!(close(stats.min, 1.0));
        assert!(close(stats.q25, 1.75));
        assert!(close(stats.median, 2.5));
        assert!(close(stats.q75, 3.25));
        assert!(close(stats.max, 4.0));
        assert!(close(stats.peak_to_peak(), 3.0));
    }

    #[test]
    fn odd_count_median_is_middle_value() {
        let stats = describe(&[10.0, 30.0, 20.0]);
        assert!(close(stats.median, 20.0));
        assert!(close(stats.q25, 15.0));
        assert!(close(stats.q75, 25.0));
    }

    #[test]
    fn aggregate_skips_excluded_and_empty_series() {
        let mut store = SeriesStore::new();
        let mut selection = SelectionState::new();
        for (name, last) in [("c", 30.0), ("a", 10.0), ("b", 20.0)] {
            store.add_series(name, vec![Sample::new(0.0, -1.0), Sample::new(1.0, last)]);
            selection.ensure_entry(name);
        }
        store.add_series("empty", Vec::new());
        selection.ensure_entry("empty");
        selection.set_excluded_from_aggregate("c", true).unwrap();

        let aggregate = describe_aggregate_of_last_values(&store, &selection);
        assert_eq!(aggregate.series, vec!["a", "b"]);
        assert_eq!(aggregate.stats, describe(&[10.0, 20.0]));
    }

    #[test]
    fn aggregate_without_qualifying_series_is_empty() {
        let mut store = SeriesStore::new();
        let mut selection = SelectionState::new();
        store.add_series("a", vec![Sample::new(0.0, 1.0)]);
        selection.ensure_entry("a");
        selection.set_excluded_from_aggregate("a", true).unwrap();

        let aggregate = describe_aggregate_of_last_values(&store, &selection);
        assert!(aggregate.series.is_empty());
        assert!(aggregate.stats.is_empty());
    }

    #[test]
    fn serializes_with_percent_keys() {
        let json = serde_json::to_value(describe(&[1.0])).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["50%"], 1.0);
        assert!(json["std"].is_null());
    }
}
