use std::io::{BufRead, Write};
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crate::app::{AggregationController, CommandOutcome};
use crate::config::DashboardConfig;
use crate::data::loader;
use crate::report;
use crate::state::command::SessionCommand;

#[derive(Debug, Parser, Clone)]
#[command(name = "convdash", version, about = "Descriptive statistics and plot-ready views for x/y series files")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print per-series statistics and the aggregate of last values
    Describe(SourceArgs),
    /// Apply selection flags and print the derived views
    Views(ViewsArgs),
    /// Write statistics.json for the loaded series
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// Output directory
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Read selection commands from stdin and reprint views after each one
    Session(SourceArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// CSV, Excel or zip files, or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Trailing samples plotted per series
    #[arg(long)]
    pub tail: Option<usize>,

    /// Decimal places for statistics
    #[arg(long)]
    pub precision: Option<usize>,

    /// Force the field delimiter (';' or ',')
    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Debug, Args, Clone)]
pub struct ViewsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Hide a series from the plotted traces
    #[arg(long, value_name = "SERIES")]
    pub hide_graph: Vec<String>,

    /// Hide a series from the statistics table
    #[arg(long, value_name = "SERIES")]
    pub hide_table: Vec<String>,

    /// Leave a series out of the aggregate of last values
    #[arg(long, value_name = "SERIES")]
    pub exclude: Vec<String>,

    /// Display-name override, as SERIES=NAME
    #[arg(long, value_name = "SERIES=NAME")]
    pub rename: Vec<String>,

    /// Print the views as JSON
    #[arg(long)]
    pub json: bool,
}

impl SourceArgs {
    /// Config file (if any) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        if let Some(tail) = self.tail {
            config.tail_samples = tail;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = Some(delimiter);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build a controller from the sources. Rejected files are reported on
    /// stderr; it is an error only when nothing loads at all.
    pub fn load(&self, config: &DashboardConfig) -> Result<AggregationController> {
        let report = loader::load_paths(&self.paths, config.delimiter_byte());
        for (source, err) in &report.failures {
            eprintln!("warning: skipped {source}: {err}");
        }
        if report.series.is_empty() {
            bail!("no series could be loaded");
        }

        let mut controller = AggregationController::new();
        for series in report.series {
            controller.add_series(&series.name, series.samples);
        }
        Ok(controller)
    }
}

fn parse_rename(spec: &str) -> Result<SessionCommand> {
    let (series, display_name) = spec
        .split_once('=')
        .with_context(|| format!("--rename expects SERIES=NAME, got '{spec}'"))?;
    Ok(SessionCommand::Rename {
        series: series.to_string(),
        display_name: display_name.to_string(),
    })
}

impl ViewsArgs {
    /// The selection flags as session commands, in a fixed order.
    pub fn commands(&self) -> Result<Vec<SessionCommand>> {
        let mut commands = Vec::new();
        commands.extend(self.hide_graph.iter().map(|s| SessionCommand::SetGraphVisible {
            series: s.clone(),
            visible: false,
        }));
        commands.extend(self.hide_table.iter().map(|s| SessionCommand::SetTableVisible {
            series: s.clone(),
            visible: false,
        }));
        commands.extend(self.exclude.iter().map(|s| SessionCommand::SetExcluded {
            series: s.clone(),
            excluded: true,
        }));
        for spec in &self.rename {
            commands.push(parse_rename(spec)?);
        }
        Ok(commands)
    }
}

const SESSION_HELP: &str = "\
commands:
  graph <series> on|off      show or hide in the plotted traces
  table <series> on|off      show or hide in the statistics table
  exclude <series> on|off    leave out of (or restore to) the aggregate
  rename <series> [name]     set the display name; empty clears it
  remove <series>            drop the series
  load <path>                ingest another file, archive or directory
  show                       print the current views
  help                       print this text
  quit                       end the session
series names containing spaces go in double quotes: graph \"run 1.csv\" off
";

/// Drive a controller from line-oriented commands.
///
/// Views are reprinted after every successful change. Bad commands are
/// reported on `output` and the session carries on.
pub fn run_session<R: BufRead, W: Write>(
    controller: &mut AggregationController,
    config: &DashboardConfig,
    input: R,
    output: &mut W,
) -> Result<()> {
    let print_views = |controller: &mut AggregationController, output: &mut W| -> Result<()> {
        let views = controller.recompute_derived_views(config.tail_samples);
        write!(output, "{}", report::render_views(&views, config.precision))?;
        Ok(())
    };

    print_views(controller, output)?;
    for line in input.lines() {
        let line = line.context("reading session input")?;
        let trimmed = line.trim();
        match trimmed {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                write!(output, "{SESSION_HELP}")?;
                continue;
            }
            "show" => {
                print_views(controller, output)?;
                continue;
            }
            _ => {}
        }

        if let Some(path) = trimmed.strip_prefix("load ") {
            let report = loader::load_paths(&[PathBuf::from(path.trim())], config.delimiter_byte());
            for (source, err) in &report.failures {
                writeln!(output, "error: skipped {source}: {err}")?;
            }
            if report.series.is_empty() {
                continue;
            }
            for series in report.series {
                controller.add_series(&series.name, series.samples);
            }
            print_views(controller, output)?;
            continue;
        }

        let command = match trimmed.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "error: {e} (type 'help' for commands)")?;
                continue;
            }
        };
        match controller.apply(&command) {
            Ok(CommandOutcome::Applied) => print_views(controller, output)?,
            Ok(CommandOutcome::Unchanged) => writeln!(output, "nothing to do")?,
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }
    Ok(())
}

pub fn run(args: Cli) -> Result<()> {
    match args.command {
        Command::Describe(source) => {
            let config = source.resolve_config()?;
            let mut controller = source.load(&config)?;
            let views = controller.recompute_derived_views(config.tail_samples);
            print!("{}", report::render_table_rows(&views.table_rows, config.precision));
            println!();
            print!(
                "{}",
                report::render_aggregate(&views.aggregate_last_value_stats, config.precision)
            );
        }
        Command::Views(views_args) => {
            let config = views_args.source.resolve_config()?;
            let mut controller = views_args.source.load(&config)?;
            for command in views_args.commands()? {
                controller
                    .apply(&command)
                    .with_context(|| format!("applying '{command}'"))?;
            }
            let views = controller.recompute_derived_views(config.tail_samples);
            if views_args.json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print!("{}", report::render_views(&views, config.precision));
            }
        }
        Command::Export { source, out } => {
            let config = source.resolve_config()?;
            let mut controller = source.load(&config)?;
            let views = controller.recompute_derived_views(config.tail_samples);
            let path = report::write_statistics_json(&views, &out)
                .with_context(|| format!("writing statistics to {}", out.display()))?;
            println!("statistics saved to {}", path.display());
        }
        Command::Session(source) => {
            let config = source.resolve_config()?;
            let mut controller = source.load(&config)?;
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            run_session(&mut controller, &config, stdin.lock(), &mut stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::series_store::Sample;

    fn controller() -> AggregationController {
        let mut controller = AggregationController::new();
        controller.add_series("a.csv", vec![Sample::new(1.0, 10.0)]);
        controller.add_series("b.csv", vec![Sample::new(1.0, 20.0)]);
        controller
    }

    fn session(input: &str) -> (AggregationController, String) {
        let mut controller = controller();
        let mut output = Vec::new();
        run_session(
            &mut controller,
            &DashboardConfig::default(),
            input.as_bytes(),
            &mut output,
        )
        .unwrap();
        (controller, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parses_views_flags() {
        let cli = Cli::try_parse_from([
            "convdash", "views", "runs/", "--hide-graph", "a.csv", "--exclude", "b.csv",
            "--rename", "a.csv=Fast", "--tail", "5",
        ])
        .unwrap();
        let Command::Views(args) = cli.command else {
            panic!("expected views subcommand");
        };
        assert_eq!(args.source.tail, Some(5));
        let commands = args.commands().unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2].to_string(), "rename a.csv Fast");
    }

    #[test]
    fn rename_flag_needs_equals() {
        assert!(parse_rename("a.csv").is_err());
    }

    #[test]
    fn command_line_overrides_config() {
        let cli = Cli::try_parse_from(["convdash", "describe", "x.csv", "--precision", "1"]).unwrap();
        let Command::Describe(source) = cli.command else {
            panic!("expected describe subcommand");
        };
        let config = source.resolve_config().unwrap();
        assert_eq!(config.precision, 1);
        assert_eq!(config.tail_samples, 100);
    }

    #[test]
    fn session_applies_commands_in_order() {
        let (controller, output) = session("exclude b.csv on\nrename a.csv Alpha\nquit\ngraph a.csv off\n");
        let entry = controller.selection().get("a.csv").unwrap();
        assert_eq!(entry.effective_name(), "Alpha");
        assert!(entry.visible_in_graph);
        assert!(controller.selection().get("b.csv").unwrap().excluded_from_aggregate);
        assert!(output.contains("last values (1 series)"));
    }

    #[test]
    fn session_accepts_quoted_series_names() {
        let mut controller = controller();
        controller.add_series("run 1.csv", vec![Sample::new(1.0, 30.0)]);
        let mut output = Vec::new();
        run_session(
            &mut controller,
            &DashboardConfig::default(),
            "graph \"run 1.csv\" off\nexclude \"run 1.csv\" on\n".as_bytes(),
            &mut output,
        )
        .unwrap();
        let entry = controller.selection().get("run 1.csv").unwrap();
        assert!(!entry.visible_in_graph);
        assert!(entry.excluded_from_aggregate);
        assert!(!String::from_utf8(output).unwrap().contains("error:"));
    }

    #[test]
    fn session_reports_errors_and_continues() {
        let (controller, output) = session("graph missing.csv off\nfrobnicate\nremove a.csv\n");
        assert!(output.contains("error: no series named 'missing.csv'"));
        assert!(output.contains("error: unknown command 'frobnicate'"));
        assert!(!controller.store().contains("a.csv"));
    }
}
