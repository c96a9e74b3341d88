use serde::{Deserialize, Serialize};
use crate::error::CoreError;

/// One x/y sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A named, ordered sequence of samples in source row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn point_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn x_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn y_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// The final y value, `None` for an empty series.
    pub fn last_y(&self) -> Option<f64> {
        self.samples.last().map(|s| s.y)
    }

    /// The last `min(n, len)` samples in original order.
    pub fn tail(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }
}

/// Owns every ingested series, keyed by name and kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: Vec<Series>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series, replacing any existing series with the same name.
    ///
    /// A replaced series keeps its position in the listing order. Returns
    /// `true` when an existing series was replaced.
    pub fn add_series(&mut self, name: &str, samples: Vec<Sample>) -> bool {
        let series = Series::new(name, samples);
        match self.position(name) {
            Some(pos) => {
                self.series[pos] = series;
                true
            }
            None => {
                self.series.push(series);
                false
            }
        }
    }

    /// Remove a series by name. Absent names are ignored.
    pub fn remove_series(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(pos) => {
                self.series.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn list_series_names(&self) -> Vec<String> {
        self.series.iter().map(|s| s.name.clone()).collect()
    }

    pub fn get_series(&self, name: &str) -> Result<&Series, CoreError> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    pub fn tail_samples(&self, name: &str, n: usize) -> Result<Vec<Sample>, CoreError> {
        Ok(self.get_series(name)?.tail(n).to_vec())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.series.iter().position(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<Sample> {
        (1..=n).map(|i| Sample::new(i as f64, i as f64)).collect()
    }

    #[test]
    fn names_follow_insertion_order() {
        let mut store = SeriesStore::new();
        store.add_series("b.csv", ramp(2));
        store.add_series("a.csv", ramp(3));
        store.add_series("c.csv", Vec::new());
        assert_eq!(store.list_series_names(), vec!["b.csv", "a.csv", "c.csv"]);
    }

    #[test]
    fn re_adding_replaces_in_place() {
        let mut store = SeriesStore::new();
        store.add_series("a", ramp(5));
        store.add_series("b", ramp(1));
        assert!(store.add_series("a", vec![Sample::new(9.0, 9.0)]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.list_series_names(), vec!["a", "b"]);
        assert_eq!(store.get_series("a").unwrap().samples, vec![Sample::new(9.0, 9.0)]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = SeriesStore::new();
        store.add_series("a", ramp(1));
        assert!(store.remove_series("a"));
        assert!(!store.remove_series("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn get_missing_series_fails() {
        let store = SeriesStore::new();
        assert_eq!(
            store.get_series("nope"),
            Err(CoreError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn tail_returns_last_samples_in_order() {
        let mut store = SeriesStore::new();
        store.add_series("s", ramp(5));

        let tail = store.tail_samples("s", 3).unwrap();
        assert_eq!(
            tail,
            vec![Sample::new(3.0, 3.0), Sample::new(4.0, 4.0), Sample::new(5.0, 5.0)]
        );
        assert!(store.tail_samples("s", 0).unwrap().is_empty());
        assert_eq!(store.tail_samples("s", 50).unwrap().len(), 5);
    }

    #[test]
    fn last_y_of_empty_series_is_none() {
        let series = Series::new("empty", Vec::new());
        assert_eq!(series.last_y(), None);
        assert!(series.tail(3).is_empty());
    }
}
