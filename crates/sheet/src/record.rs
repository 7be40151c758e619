use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// One row of data keyed by column label.
///
/// A record has no column order of its own; it must be projected onto the
/// destination's header with [`Record::project`] before it is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, CellValue>,
}

impl Record {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value
    pub fn insert<K: Into<String>, V: Into<CellValue>>(&mut self, key: K, value: V) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style [`Record::insert`]
    #[must_use]
    pub fn with<K: Into<String>, V: Into<CellValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Order the record's values by `columns`.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::ColumnNotFound` for the first column the record
    /// has no value for. Keys not in `columns` are ignored.
    pub fn project(&self, columns: &[String]) -> Result<Vec<CellValue>> {
        columns
            .iter()
            .map(|column| {
                self.fields
                    .get(column)
                    .cloned()
                    .ok_or_else(|| SheetError::ColumnNotFound {
                        name: column.clone(),
                    })
            })
            .collect()
    }

    /// Keys present in the record but absent from `columns`
    #[must_use]
    pub fn extra_keys(&self, columns: &[String]) -> Vec<String> {
        let mut extra: Vec<String> = self
            .fields
            .keys()
            .filter(|k| !columns.contains(k))
            .cloned()
            .collect();
        extra.sort();
        extra
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_project_follows_column_order() {
        let record = Record::new()
            .with("PRESSURE", 1021.2)
            .with("TEMP", 28.6)
            .with("HUMIDITY", 34.6);

        let row = record
            .project(&columns(&["TEMP", "HUMIDITY", "PRESSURE"]))
            .unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Float(28.6),
                CellValue::Float(34.6),
                CellValue::Float(1021.2)
            ]
        );

        let reversed = record
            .project(&columns(&["PRESSURE", "HUMIDITY", "TEMP"]))
            .unwrap();
        assert_eq!(reversed[0], CellValue::Float(1021.2));
        assert_eq!(reversed[2], CellValue::Float(28.6));
    }

    #[test]
    fn test_project_missing_column() {
        let record = Record::new().with("TEMP", 28.6);
        let err = record
            .project(&columns(&["TEMP", "HUMIDITY"]))
            .unwrap_err();
        assert!(matches!(err, SheetError::ColumnNotFound { name } if name == "HUMIDITY"));
    }

    #[test]
    fn test_extra_keys() {
        let record: Record = [("TEMP", 1.0), ("NOISE", 2.0), ("ALT", 3.0)]
            .into_iter()
            .collect();
        assert_eq!(
            record.extra_keys(&columns(&["TEMP"])),
            vec!["ALT".to_string(), "NOISE".to_string()]
        );
        assert_eq!(record.len(), 3);
    }
}
