use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

impl Sheet {
    /// Load a sheet from a CSV file whose first row is the header.
    ///
    /// The sheet is named after the file stem.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut sheet = Self::from_csv_reader(BufReader::new(file))?;
        if let Some(stem) = path.as_ref().file_stem().and_then(|s| s.to_str()) {
            sheet.set_name(stem);
        }
        Ok(sheet)
    }

    /// Load a sheet from CSV text whose first row is the header
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// Load a sheet from a reader.
    ///
    /// Header cells are kept exactly as written; data cells are
    /// type-inferred. Rows of unequal width are rejected by the CSV reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false) // header row is named below
            .from_reader(reader);

        let mut data: Vec<Vec<CellValue>> = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let is_header = data.is_empty();
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if is_header {
                        CellValue::String(field.to_string())
                    } else {
                        CellValue::parse(field)
                    }
                })
                .collect();
            data.push(row);
        }

        if data.is_empty() {
            return Err(SheetError::Empty("CSV input has no header row".to_string()));
        }

        let mut sheet = Sheet::with_name("Sheet1");
        *sheet.data_mut() = data;
        sheet.name_columns_by_row(0)?;

        Ok(sheet)
    }
}
