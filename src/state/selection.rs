use serde::{Deserialize, Serialize};
use crate::error::CoreError;

/// Per-series presentation and aggregation flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub name: String,
    pub visible_in_graph: bool,
    pub visible_in_table: bool,
    pub excluded_from_aggregate: bool,
    /// Display-name override, stored exactly as entered.
    pub display_name: String,
}

impl SelectionEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visible_in_graph: true,
            visible_in_table: true,
            excluded_from_aggregate: false,
            display_name: name.to_string(),
        }
    }

    /// The name to present: the override unless it is blank.
    pub fn effective_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Selection entries keyed by series name, in creation order.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    entries: Vec<SelectionEntry>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `name`, creating it with defaults if needed.
    pub fn ensure_entry(&mut self, name: &str) -> &SelectionEntry {
        let pos = match self.position(name) {
            Some(pos) => pos,
            None => {
                self.entries.push(SelectionEntry::new(name));
                self.entries.len() - 1
            }
        };
        &self.entries[pos]
    }

    /// Replace any existing entry for `name` with a fresh default one.
    pub fn reset_entry(&mut self, name: &str) {
        match self.position(name) {
            Some(pos) => self.entries[pos] = SelectionEntry::new(name),
            None => self.entries.push(SelectionEntry::new(name)),
        }
    }

    pub fn remove_entry(&mut self, name: &str) {
        self.entries.retain(|e| e.name != name);
    }

    pub fn get(&self, name: &str) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn set_graph_visible(&mut self, name: &str, visible: bool) -> Result<(), CoreError> {
        self.entry_mut(name)?.visible_in_graph = visible;
        Ok(())
    }

    pub fn set_table_visible(&mut self, name: &str, visible: bool) -> Result<(), CoreError> {
        self.entry_mut(name)?.visible_in_table = visible;
        Ok(())
    }

    pub fn set_excluded_from_aggregate(
        &mut self,
        name: &str,
        excluded: bool,
    ) -> Result<(), CoreError> {
        self.entry_mut(name)?.excluded_from_aggregate = excluded;
        Ok(())
    }

    pub fn set_display_name(&mut self, name: &str, display_name: &str) -> Result<(), CoreError> {
        self.entry_mut(name)?.display_name = display_name.to_string();
        Ok(())
    }

    /// Whether a series counts toward the aggregate. Unknown names use the
    /// defaults and are included.
    pub fn is_included(&self, name: &str) -> bool {
        self.get(name).map_or(true, |e| !e.excluded_from_aggregate)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut SelectionEntry, CoreError> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_entry_is_idempotent() {
        let mut selection = SelectionState::new();
        selection.ensure_entry("a");
        selection.set_graph_visible("a", false).unwrap();

        let entry = selection.ensure_entry("a");
        assert!(!entry.visible_in_graph);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn defaults_show_everything() {
        let entry = SelectionEntry::new("run1.csv");
        assert!(entry.visible_in_graph);
        assert!(entry.visible_in_table);
        assert!(!entry.excluded_from_aggregate);
        assert_eq!(entry.effective_name(), "run1.csv");
    }

    #[test]
    fn setters_require_an_entry() {
        let mut selection = SelectionState::new();
        let missing = Err(CoreError::NotFound("missing".to_string()));
        assert_eq!(selection.set_graph_visible("missing", true), missing);
        assert_eq!(selection.set_table_visible("missing", true), missing);
        assert_eq!(selection.set_excluded_from_aggregate("missing", true), missing);
        assert_eq!(selection.set_display_name("missing", "x"), missing);
        assert!(selection.is_empty());
    }

    #[test]
    fn blank_display_name_falls_back_at_read_time() {
        let mut selection = SelectionState::new();
        selection.ensure_entry("run1.csv");
        selection.set_display_name("run1.csv", "   ").unwrap();

        let entry = selection.get("run1.csv").unwrap();
        assert_eq!(entry.display_name, "   ");
        assert_eq!(entry.effective_name(), "run1.csv");

        selection.set_display_name("run1.csv", "Baseline").unwrap();
        assert_eq!(selection.get("run1.csv").unwrap().effective_name(), "Baseline");
    }

    #[test]
    fn reset_entry_restores_defaults() {
        let mut selection = SelectionState::new();
        selection.ensure_entry("a");
        selection.set_excluded_from_aggregate("a", true).unwrap();
        selection.reset_entry("a");
        assert_eq!(selection.get("a"), Some(&SelectionEntry::new("a")));
    }

    #[test]
    fn remove_entry_is_idempotent() {
        let mut selection = SelectionState::new();
        selection.ensure_entry("a");
        selection.remove_entry("a");
        selection.remove_entry("a");
        assert!(selection.get("a").is_none());
        assert!(selection.is_included("a"));
    }
}
