//! CSV ingestion and numeric cleaning
//!
//! Loads the project-record table once into column-major storage. Numeric
//! cells are `Option<f64>`: missing values stay missing here and are
//! excluded per metric at analysis time, never by dropping whole rows.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::config::AnalysisConfig;

/// Errors surfaced while loading or reading the table
///
/// Every variant is fatal for the binary: an analysis over a table that
/// failed to load has nothing useful to report.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("expected column '{0}' is missing from the input")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    BadNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("row {row}, column '{column}': cannot parse '{value}' as a boolean")]
    BadBool {
        column: String,
        row: usize,
        value: String,
    },

    #[error("grouping column '{column}' has a missing value at row {row}")]
    MissingGroup { column: String, row: usize },

    #[error("input has no data rows")]
    Empty,
}

/// Clean one numeric cell
///
/// Returns `Ok(None)` for a missing value. `strip_thousands` removes `,`
/// separators before parsing, so `"1,234.50"` yields `1234.5`.
pub fn clean_number(
    raw: &str,
    strip_thousands: bool,
) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    let cleaned: String;
    let text = if strip_thousands && trimmed.contains(',') {
        cleaned = trimmed.replace(',', "");
        &cleaned
    } else {
        trimmed
    };

    text.parse::<f64>().map(Some)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// The in-memory record table, read-only after loading
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Boolean grouping attribute, one entry per row
    groups: Vec<bool>,
    /// Numeric columns; cells are `None` where the input was missing
    columns: HashMap<String, Vec<Option<f64>>>,
    n_rows: usize,
}

impl Dataset {
    /// Load and clean the CSV at `path`
    ///
    /// Parses the grouping column plus every column the configuration can
    /// touch: the active metrics, the thousands-separated columns, and the
    /// regression pair columns. Columns outside that set are ignored, so a
    /// run without `--include-generated` accepts a file that lacks the
    /// generated-only columns entirely.
    pub fn load(
        path: &Path,
        config: &AnalysisConfig,
        include_generated: bool,
    ) -> Result<Self, DatasetError> {
        let mut wanted: Vec<String> = config.active_metrics(include_generated);
        for column in &config.thousands_separated_columns {
            if !wanted.contains(column) {
                wanted.push(column.clone());
            }
        }
        for pair in &config.regression_pairs {
            for column in [&pair.x, &pair.y] {
                if column != &config.grouping_column && !wanted.contains(column) {
                    wanted.push(column.clone());
                }
            }
        }

        let mut reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| DatasetError::Io {
                path: path.display().to_string(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let group_idx = headers
            .iter()
            .position(|h| h == &config.grouping_column)
            .ok_or_else(|| DatasetError::MissingColumn(config.grouping_column.clone()))?;

        let mut indices = Vec::with_capacity(wanted.len());
        for column in &wanted {
            let idx = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DatasetError::MissingColumn(column.clone()))?;
            indices.push((column.clone(), idx));
        }

        let mut groups = Vec::new();
        let mut columns: HashMap<String, Vec<Option<f64>>> = wanted
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| DatasetError::Io {
                path: path.display().to_string(),
                source,
            })?;

            let raw_group = record.get(group_idx).unwrap_or("");
            if raw_group.trim().is_empty() {
                return Err(DatasetError::MissingGroup {
                    column: config.grouping_column.clone(),
                    row: row_idx + 1,
                });
            }
            let group = parse_bool(raw_group).ok_or_else(|| DatasetError::BadBool {
                column: config.grouping_column.clone(),
                row: row_idx + 1,
                value: raw_group.to_string(),
            })?;
            groups.push(group);

            for (name, idx) in &indices {
                let raw = record.get(*idx).unwrap_or("");
                let strip = config.thousands_separated_columns.contains(name);
                let cell = clean_number(raw, strip).map_err(|_| DatasetError::BadNumber {
                    column: name.clone(),
                    row: row_idx + 1,
                    value: raw.to_string(),
                })?;
                if let Some(col) = columns.get_mut(name) {
                    col.push(cell);
                }
            }
        }

        if groups.is_empty() {
            return Err(DatasetError::Empty);
        }

        let n_rows = groups.len();
        tracing::debug!(rows = n_rows, columns = columns.len(), "dataset loaded");

        Ok(Self {
            groups,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn groups(&self) -> &[bool] {
        &self.groups
    }

    /// Raw cells of one column, missing values included
    pub fn column(&self, name: &str) -> Result<&[Option<f64>], DatasetError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// Non-missing observations of one column, in row order
    pub fn observations(&self, name: &str) -> Result<Vec<f64>, DatasetError> {
        Ok(self.column(name)?.iter().filter_map(|c| *c).collect())
    }

    /// Non-missing observations split by the grouping attribute
    ///
    /// Returns `(in_group, out_of_group)`. Exclusion is per metric: a row
    /// missing this column still participates in every other column.
    pub fn partitioned(&self, name: &str) -> Result<(Vec<f64>, Vec<f64>), DatasetError> {
        let column = self.column(name)?;
        let mut in_group = Vec::new();
        let mut out_group = Vec::new();
        for (cell, &group) in column.iter().zip(&self.groups) {
            if let Some(value) = cell {
                if group {
                    in_group.push(*value);
                } else {
                    out_group.push(*value);
                }
            }
        }
        Ok((in_group, out_group))
    }

    /// Paired observations for a regression, rows with either side missing
    /// excluded
    ///
    /// `group_as` names the grouping column; when `y` matches it the boolean
    /// is encoded as 1.0/0.0.
    pub fn paired(
        &self,
        x: &str,
        y: &str,
        group_as: &str,
    ) -> Result<(Vec<f64>, Vec<f64>), DatasetError> {
        let xs = self.column(x)?;

        let mut out_x = Vec::new();
        let mut out_y = Vec::new();

        if y == group_as {
            for (cell, &group) in xs.iter().zip(&self.groups) {
                if let Some(value) = cell {
                    out_x.push(*value);
                    out_y.push(if group { 1.0 } else { 0.0 });
                }
            }
        } else {
            let ys = self.column(y)?;
            for (xc, yc) in xs.iter().zip(ys) {
                if let (Some(xv), Some(yv)) = (xc, yc) {
                    out_x.push(*xv);
                    out_y.push(*yv);
                }
            }
        }

        Ok((out_x, out_y))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            metrics: vec!["budget".to_string(), "team_size".to_string()],
            generated_metrics: vec![],
            thousands_separated_columns: vec!["budget".to_string()],
            regression_pairs: vec![],
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_clean_number_strips_thousands() {
        assert_eq!(clean_number("1,234.50", true), Ok(Some(1234.5)));
    }

    #[test]
    fn test_clean_number_plain_value_unaffected() {
        assert_eq!(clean_number("42.25", true), Ok(Some(42.25)));
        assert_eq!(clean_number("42.25", false), Ok(Some(42.25)));
    }

    #[test]
    fn test_clean_number_missing() {
        assert_eq!(clean_number("", false), Ok(None));
        assert_eq!(clean_number("  ", false), Ok(None));
        assert_eq!(clean_number("NA", false), Ok(None));
        assert_eq!(clean_number("nan", false), Ok(None));
    }

    #[test]
    fn test_clean_number_malformed() {
        assert!(clean_number("abc", false).is_err());
        // Separators are only stripped for flagged columns
        assert!(clean_number("1,234.50", false).is_err());
    }

    #[test]
    fn test_load_partitions_by_group() {
        let file = write_csv("pcg,budget,team_size\nTrue,\"1,000\",5\nFalse,2000,8\nTrue,3000,6\n");
        let dataset = Dataset::load(file.path(), &small_config(), false).unwrap();

        assert_eq!(dataset.n_rows(), 3);
        let (pcg, non_pcg) = dataset.partitioned("budget").unwrap();
        assert_eq!(pcg, vec![1000.0, 3000.0]);
        assert_eq!(non_pcg, vec![2000.0]);
    }

    #[test]
    fn test_load_missing_values_stay_per_metric() {
        let file = write_csv("pcg,budget,team_size\nTrue,,5\nFalse,2000,8\n");
        let dataset = Dataset::load(file.path(), &small_config(), false).unwrap();

        // budget misses one row, team_size keeps both
        assert_eq!(dataset.observations("budget").unwrap(), vec![2000.0]);
        assert_eq!(dataset.observations("team_size").unwrap(), vec![5.0, 8.0]);
    }

    #[test]
    fn test_load_missing_column_is_fatal() {
        let file = write_csv("pcg,budget\nTrue,1000\n");
        let err = Dataset::load(file.path(), &small_config(), false).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(c) if c == "team_size"));
    }

    #[test]
    fn test_load_bad_bool_is_fatal() {
        let file = write_csv("pcg,budget,team_size\nmaybe,1000,5\n");
        let err = Dataset::load(file.path(), &small_config(), false).unwrap_err();
        assert!(matches!(err, DatasetError::BadBool { .. }));
    }

    #[test]
    fn test_load_bad_number_is_fatal() {
        let file = write_csv("pcg,budget,team_size\nTrue,lots,5\n");
        let err = Dataset::load(file.path(), &small_config(), false).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::BadNumber { column, row: 1, .. } if column == "budget"
        ));
    }

    #[test]
    fn test_load_empty_is_fatal() {
        let file = write_csv("pcg,budget,team_size\n");
        let err = Dataset::load(file.path(), &small_config(), false).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_paired_encodes_group_numerically() {
        let file = write_csv("pcg,budget,team_size\nTrue,1000,5\nFalse,2000,8\n");
        let dataset = Dataset::load(file.path(), &small_config(), false).unwrap();

        let (xs, ys) = dataset.paired("team_size", "pcg", "pcg").unwrap();
        assert_eq!(xs, vec![5.0, 8.0]);
        assert_eq!(ys, vec![1.0, 0.0]);
    }

    #[test]
    fn test_paired_excludes_rows_missing_either_side() {
        let file = write_csv("pcg,budget,team_size\nTrue,1000,\nFalse,2000,8\nTrue,,6\n");
        let dataset = Dataset::load(file.path(), &small_config(), false).unwrap();

        let (xs, ys) = dataset.paired("team_size", "budget", "pcg").unwrap();
        assert_eq!(xs, vec![8.0]);
        assert_eq!(ys, vec![2000.0]);
    }
}
