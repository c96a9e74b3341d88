use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use crate::data::parser;
use crate::error::LoadError;
use crate::state::series_store::Sample;

/// Extensions picked up when a directory is scanned.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["csv", "zip", "xls", "xlsx", "ods"];

/// A validated series ready to be handed to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub name: String,
    pub samples: Vec<Sample>,
}

/// Outcome of loading a batch of sources. One bad file never prevents the
/// others from loading.
///
/// Series names are unique within a report: a later source producing a name
/// already taken is recorded as a failure.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub series: Vec<LoadedSeries>,
    /// (source name, error) for every source that was rejected.
    pub failures: Vec<(String, LoadError)>,
    /// Series name -> source it was loaded from.
    origins: HashMap<String, String>,
}

impl LoadReport {
    fn record(&mut self, source: String, result: Result<LoadedSeries, LoadError>) {
        let result = result.and_then(|series| match self.origins.get(&series.name) {
            Some(first_source) => Err(LoadError::DuplicateName {
                name: series.name,
                first_source: first_source.clone(),
            }),
            None => Ok(series),
        });
        match result {
            Ok(series) => {
                tracing::debug!("Loaded {} ({} samples)", series.name, series.samples.len());
                self.origins.insert(series.name.clone(), source);
                self.series.push(series);
            }
            Err(e) => {
                tracing::warn!("Skipping {source}: {e}");
                self.failures.push((source, e));
            }
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_number(cell: &str, column: &'static str, row: usize) -> Result<f64, LoadError> {
    let trimmed = cell.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LoadError::NonNumeric {
            column,
            row,
            value: trimmed.to_string(),
        }),
    }
}

/// Turn rows (with their 1-based source row numbers) into a series. The
/// header row is located first; blank rows after it are skipped.
fn rows_to_series(name: &str, rows: Vec<(usize, Vec<String>)>) -> Result<LoadedSeries, LoadError> {
    let (line_numbers, cells): (Vec<usize>, Vec<Vec<String>>) = rows.into_iter().unzip();
    let (header_idx, columns) = parser::find_header_row(&cells)?;

    let mut samples = Vec::with_capacity(cells.len().saturating_sub(header_idx + 1));
    for (row, line) in cells.iter().zip(&line_numbers).skip(header_idx + 1) {
        if parser::is_blank_row(row) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let x = parse_number(cell(columns.x), "x", *line)?;
        let y = parse_number(cell(columns.y), "y", *line)?;
        samples.push(Sample::new(x, y));
    }

    Ok(LoadedSeries {
        name: name.to_string(),
        samples,
    })
}

/// Parse delimited text into a series. `delimiter` overrides detection.
pub fn parse_series_text(
    name: &str,
    text: &str,
    delimiter: Option<u8>,
) -> Result<LoadedSeries, LoadError> {
    let delimiter = delimiter.unwrap_or_else(|| parser::detect_delimiter(text));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(rows.len() + 1, |p| p.line() as usize);
        rows.push((line, record.iter().map(|s| s.to_string()).collect()));
    }

    if rows.is_empty() {
        return Err(LoadError::NoData);
    }
    rows_to_series(name, rows)
}

fn load_csv(path: &Path, delimiter: Option<u8>) -> Result<LoadedSeries, LoadError> {
    let content = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_series_text(&file_name_of(path), &parser::decode_text(content), delimiter)
}

fn load_excel(path: &Path) -> Result<LoadedSeries, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Excel(format!("cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| LoadError::Excel("no sheets found".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Excel(format!("cannot read sheet '{sheet_name}': {e}")))?;

    // Row numbers are reported relative to the sheet, not the used range
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let rows: Vec<(usize, Vec<String>)> = range
        .rows()
        .enumerate()
        .map(|(i, row)| {
            let cells = row
                .iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect();
            (first_row + i + 1, cells)
        })
        .collect();

    if rows.is_empty() {
        return Err(LoadError::NoData);
    }
    rows_to_series(&file_name_of(path), rows)
}

/// Load every `.csv` member of a zip archive. The outer result fails only
/// when the archive itself cannot be read; each member has its own result.
pub fn load_archive(
    path: &Path,
    delimiter: Option<u8>,
) -> Result<Vec<(String, Result<LoadedSeries, LoadError>)>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut members = Vec::new();
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let member_path = PathBuf::from(member.name());
        if member.is_dir() || extension_of(&member_path) != "csv" {
            continue;
        }
        let source = format!("{}/{}", file_name_of(path), member.name());
        let name = file_name_of(&member_path);

        let mut content = Vec::new();
        let result = match member.read_to_end(&mut content) {
            Ok(_) => parse_series_text(&name, &parser::decode_text(content), delimiter),
            Err(e) => Err(LoadError::Io {
                path: source.clone(),
                source: e,
            }),
        };
        members.push((source, result));
    }
    Ok(members)
}

/// Load one source file into one or more series. For an archive, the first
/// rejected member fails the whole file.
pub fn load_file(path: &Path, delimiter: Option<u8>) -> Result<Vec<LoadedSeries>, LoadError> {
    match extension_of(path).as_str() {
        "csv" => Ok(vec![load_csv(path, delimiter)?]),
        "xls" | "xlsx" | "ods" => Ok(vec![load_excel(path)?]),
        "zip" => {
            let mut report = LoadReport::default();
            for (source, result) in load_archive(path, delimiter)? {
                report.record(source, result);
            }
            match report.failures.into_iter().next() {
                Some((_, e)) => Err(e),
                None => Ok(report.series),
            }
        }
        ext => Err(LoadError::UnsupportedFormat(ext.to_string())),
    }
}

fn load_into(report: &mut LoadReport, path: &Path, delimiter: Option<u8>) {
    let source = path.display().to_string();
    if extension_of(path) == "zip" {
        match load_archive(path, delimiter) {
            Ok(members) => {
                for (member, result) in members {
                    report.record(member, result);
                }
            }
            Err(e) => report.record(source, Err(e)),
        }
        return;
    }
    match load_file(path, delimiter) {
        Ok(series) => {
            for s in series {
                report.record(source.clone(), Ok(s));
            }
        }
        Err(e) => report.record(source, Err(e)),
    }
}

/// Directory entries with a supported extension, sorted by file name.
fn directory_sources(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && SUPPORTED_EXTENSIONS.contains(&extension_of(&path).as_str()) {
            paths.push(path);
        }
    }
    paths.sort_by_key(|p| file_name_of(p));
    Ok(paths)
}

/// Load files, archives and directories of them into a single report.
pub fn load_paths(paths: &[PathBuf], delimiter: Option<u8>) -> LoadReport {
    let mut report = LoadReport::default();
    for path in paths {
        if path.is_dir() {
            match directory_sources(path) {
                Ok(sources) => {
                    for source in sources {
                        load_into(&mut report, &source, delimiter);
                    }
                }
                Err(e) => report.record(path.display().to_string(), Err(e)),
            }
        } else {
            load_into(&mut report, path, delimiter);
        }
    }
    tracing::info!(
        "Loaded {} series ({} sources rejected)",
        report.series.len(),
        report.failures.len()
    );
    report
}
