use serde::{Deserialize, Serialize};
use crate::error::CoreError;
use crate::processing::statistics::{self, AggregateLastValueStats, DescriptiveStats};
use crate::state::command::SessionCommand;
use crate::state::selection::SelectionState;
use crate::state::series_store::{Sample, SeriesStore};

/// A series as it should be drawn: the tail of its samples under its
/// effective display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotTrace {
    pub series: String,
    pub display_name: String,
    pub samples: Vec<Sample>,
}

impl PlotTrace {
    pub fn x(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }
}

/// A series as it should appear in the statistics table. The statistics
/// cover the full series, not the plotted tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub series: String,
    pub display_name: String,
    pub stats: DescriptiveStats,
}

/// Everything a presentation layer reads, projected from current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedViews {
    /// Controller revision these views were computed at.
    pub revision: u64,
    pub plot_traces: Vec<PlotTrace>,
    pub table_rows: Vec<TableRow>,
    pub aggregate_last_value_stats: AggregateLastValueStats,
}

/// What applying a command changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// `remove` of a name that was not present.
    Unchanged,
}

/// Owns the series store and the selection state for one dashboard session
/// and keeps them in one-to-one correspondence.
#[derive(Debug, Default)]
pub struct AggregationController {
    store: SeriesStore,
    selection: SelectionState,
    /// Incremented after every successful mutation.
    revision: u64,
}

impl AggregationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a series, replacing any series of the same name along with its
    /// selection entry.
    pub fn add_series(&mut self, name: &str, samples: Vec<Sample>) {
        let count = samples.len();
        let replaced = self.store.add_series(name, samples);
        self.selection.reset_entry(name);
        self.revision += 1;
        if replaced {
            tracing::info!("Replaced series {name} ({count} samples)");
        } else {
            tracing::info!("Added series {name} ({count} samples)");
        }
    }

    /// Remove a series and its selection entry. Returns `false` if absent.
    pub fn remove_series(&mut self, name: &str) -> bool {
        let removed = self.store.remove_series(name);
        self.selection.remove_entry(name);
        if removed {
            self.revision += 1;
            tracing::info!("Removed series {name}");
        }
        removed
    }

    pub fn set_graph_visible(&mut self, name: &str, visible: bool) -> Result<(), CoreError> {
        self.selection.set_graph_visible(name, visible)?;
        self.touch();
        Ok(())
    }

    pub fn set_table_visible(&mut self, name: &str, visible: bool) -> Result<(), CoreError> {
        self.selection.set_table_visible(name, visible)?;
        self.touch();
        Ok(())
    }

    pub fn set_excluded_from_aggregate(
        &mut self,
        name: &str,
        excluded: bool,
    ) -> Result<(), CoreError> {
        self.selection.set_excluded_from_aggregate(name, excluded)?;
        self.touch();
        Ok(())
    }

    pub fn set_display_name(&mut self, name: &str, display_name: &str) -> Result<(), CoreError> {
        self.selection.set_display_name(name, display_name)?;
        self.touch();
        Ok(())
    }

    /// Execute one session command.
    pub fn apply(&mut self, command: &SessionCommand) -> Result<CommandOutcome, CoreError> {
        tracing::debug!("Applying command: {command}");
        match command {
            SessionCommand::SetGraphVisible { series, visible } => {
                self.set_graph_visible(series, *visible)?
            }
            SessionCommand::SetTableVisible { series, visible } => {
                self.set_table_visible(series, *visible)?
            }
            SessionCommand::SetExcluded { series, excluded } => {
                self.set_excluded_from_aggregate(series, *excluded)?
            }
            SessionCommand::Rename { series, display_name } => {
                self.set_display_name(series, display_name)?
            }
            SessionCommand::Remove { series } => {
                if !self.remove_series(series) {
                    return Ok(CommandOutcome::Unchanged);
                }
            }
        }
        Ok(CommandOutcome::Applied)
    }

    /// Project the current state into plot traces, table rows and the
    /// last-value aggregate.
    ///
    /// A series without a selection entry gets a default one on the way.
    /// That never changes the output, so the revision is left alone.
    pub fn recompute_derived_views(&mut self, max_tail_samples: usize) -> DerivedViews {
        let mut plot_traces = Vec::new();
        let mut table_rows = Vec::new();
        for series in self.store.iter() {
            let entry = self.selection.ensure_entry(&series.name);
            let display_name = entry.effective_name().to_string();

            if entry.visible_in_graph {
                plot_traces.push(PlotTrace {
                    series: series.name.clone(),
                    display_name: display_name.clone(),
                    samples: series.tail(max_tail_samples).to_vec(),
                });
            }
            if entry.visible_in_table {
                table_rows.push(TableRow {
                    series: series.name.clone(),
                    display_name,
                    stats: statistics::describe(&series.y_values()),
                });
            }
        }

        DerivedViews {
            revision: self.revision,
            plot_traces,
            table_rows,
            aggregate_last_value_stats: statistics::describe_aggregate_of_last_values(
                &self.store,
                &self.selection,
            ),
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
