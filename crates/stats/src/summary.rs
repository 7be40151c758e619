use crate::error::{StatsError, StatsResult};
use crate::math;
use serde::Serialize;
use sheetsync_sheet::{CellValue, Sheet};
use std::fmt;

/// `describe`-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    /// Number of non-missing values.
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Compute over the non-missing values of a column.
    pub fn from_values(values: &[f64]) -> Self {
        Describe {
            count: values.len(),
            mean: math::mean(values),
            std: math::std_dev(values),
            min: math::min(values),
            q1: math::quantile(values, 0.25),
            median: math::median(values),
            q3: math::quantile(values, 0.75),
            max: math::max(values),
        }
    }
}

/// Summary of a single numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub describe: Describe,
    pub sum: f64,
}

impl ColumnSummary {
    pub fn mean(&self) -> Option<f64> {
        self.describe.mean
    }

    pub fn median(&self) -> Option<f64> {
        self.describe.median
    }

    /// Non-missing value count.
    pub fn count(&self) -> usize {
        self.describe.count
    }
}

/// Pairwise correlation between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Correlation between two named columns; `None` if either name is
    /// unknown or the coefficient is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Everything the bulk loader reports about a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub columns: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
}

impl Summary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Summarise the numeric columns of a sheet whose columns are named.
///
/// With `columns` given, each must exist and hold only numbers or missing
/// cells. Without it, every column whose non-missing cells are all numbers
/// (and which has at least one) is included.
pub fn summarize(sheet: &Sheet, columns: Option<&[String]>) -> StatsResult<Summary> {
    let header = sheet.column_names().ok_or(StatsError::NoHeader)?;

    let selected: Vec<(String, Vec<Option<f64>>)> = match columns {
        Some(names) => names
            .iter()
            .map(|name| numeric_column(sheet, name).map(|values| (name.clone(), values)))
            .collect::<StatsResult<_>>()?,
        None => header
            .iter()
            .filter_map(|name| {
                numeric_column(sheet, name)
                    .ok()
                    .filter(|values| values.iter().any(Option::is_some))
                    .map(|values| (name.clone(), values))
            })
            .collect(),
    };

    let column_summaries = selected
        .iter()
        .map(|(name, values)| {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            ColumnSummary {
                name: name.clone(),
                describe: Describe::from_values(&present),
                sum: math::sum(&present),
            }
        })
        .collect();

    let matrix = selected
        .iter()
        .map(|(_, xs)| {
            selected
                .iter()
                .map(|(_, ys)| math::pearson(xs, ys))
                .collect()
        })
        .collect();

    Ok(Summary {
        columns: column_summaries,
        correlation: CorrelationMatrix {
            columns: selected.into_iter().map(|(name, _)| name).collect(),
            values: matrix,
        },
    })
}

/// Extract a named column as numbers, `None` marking missing cells.
pub fn numeric_column(sheet: &Sheet, name: &str) -> StatsResult<Vec<Option<f64>>> {
    let index = sheet
        .column_index_by_name(name)
        .map_err(|_| StatsError::MissingColumn(name.to_string()))?;

    sheet
        .data_rows()
        .enumerate()
        .map(|(i, row)| match row.get(index).unwrap_or(&CellValue::Null) {
            CellValue::Null => Ok(None),
            cell => cell.as_float().map(Some).ok_or_else(|| StatsError::NonNumeric {
                column: name.to_string(),
                row: i + 2,
                value: cell.as_str(),
            }),
        })
        .collect()
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.6}"))
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.describe;
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {:<8}{:>16}", "count", d.count)?;
        for (label, value) in [
            ("mean", d.mean),
            ("std", d.std),
            ("min", d.min),
            ("25%", d.q1),
            ("50%", d.median),
            ("75%", d.q3),
            ("max", d.max),
        ] {
            writeln!(f, "  {:<8}{:>16}", label, fmt_stat(value))?;
        }
        write!(f, "  {:<8}{:>16}", "sum", format!("{:.6}", self.sum))
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "")?;
        for name in &self.columns {
            write!(f, "{name:>12}")?;
        }
        for (name, row) in self.columns.iter().zip(&self.values) {
            writeln!(f)?;
            write!(f, "{name:<12}")?;
            for value in row {
                let cell = value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.6}"));
                write!(f, "{cell:>12}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Sheet {
        Sheet::from_csv_str(
            "DATETIME,TEMP,HUMIDITY,LABEL\n\
             2018-08-06 16:49:42,10,40,a\n\
             2018-08-06 16:49:43,20,50,b\n\
             2018-08-06 16:49:44,30,60,c",
        )
        .unwrap()
    }

    #[test]
    fn test_known_three_row_table() {
        let summary = summarize(&readings(), None).unwrap();

        let temp = summary.column("TEMP").unwrap();
        assert!((temp.mean().unwrap() - 20.0).abs() < 1e-9);
        assert!((temp.sum - 60.0).abs() < 1e-9);
        assert_eq!(temp.count(), 3);
        assert!((temp.median().unwrap() - 20.0).abs() < 1e-9);
        assert!((temp.describe.std.unwrap() - 10.0).abs() < 1e-9);

        let corr = summary.correlation.get("TEMP", "HUMIDITY").unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_auto_detect_skips_text_and_timestamps() {
        let summary = summarize(&readings(), None).unwrap();
        assert_eq!(summary.correlation.columns(), &["TEMP", "HUMIDITY"]);
        assert!(summary.column("DATETIME").is_none());
        assert!(summary.column("LABEL").is_none());
    }

    #[test]
    fn test_explicit_text_column_is_rejected() {
        let columns = vec!["TEMP".to_string(), "LABEL".to_string()];
        let err = summarize(&readings(), Some(&columns)).unwrap_err();
        assert!(matches!(
            err,
            StatsError::NonNumeric { column, row: 2, value }
                if column == "LABEL" && value == "a"
        ));
    }

    #[test]
    fn test_explicit_missing_column() {
        let columns = vec!["PRESSURE".to_string()];
        let err = summarize(&readings(), Some(&columns)).unwrap_err();
        assert!(matches!(err, StatsError::MissingColumn(name) if name == "PRESSURE"));
    }

    #[test]
    fn test_missing_cells_are_excluded() {
        let sheet = Sheet::from_csv_str("TEMP,HUMIDITY\n10,40\n,50\n30,").unwrap();
        let summary = summarize(&sheet, None).unwrap();

        let temp = summary.column("TEMP").unwrap();
        assert_eq!(temp.count(), 2);
        assert!((temp.mean().unwrap() - 20.0).abs() < 1e-9);
        // only row 1 is complete for both columns
        assert_eq!(summary.correlation.get("TEMP", "HUMIDITY"), None);
    }

    #[test]
    fn test_unnamed_sheet() {
        let sheet = Sheet::from_data(vec![vec![1, 2]]);
        assert!(matches!(summarize(&sheet, None), Err(StatsError::NoHeader)));
    }

    #[test]
    fn test_display_sections() {
        let summary = summarize(&readings(), None).unwrap();
        let text = summary.column("TEMP").unwrap().to_string();
        assert!(text.starts_with("TEMP\n"));
        assert!(text.contains("mean"));
        assert!(text.contains("20.000000"));

        let matrix = summary.correlation.to_string();
        assert!(matrix.contains("HUMIDITY"));
        assert!(matrix.contains("1.000000"));
    }
}
