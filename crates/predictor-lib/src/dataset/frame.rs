//! Column-oriented in-memory table

use crate::error::{PredictorError, Result};
use std::fmt;

/// Storage type of a column, inferred when the data is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Int | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Int => write!(f, "int64"),
            ColumnKind::Float => write!(f, "float64"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

/// Values of a single column. Missing floats are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Int(_) => ColumnKind::Int,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    /// Numeric value at `row`, `None` for text columns
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Int(v) => v.get(row).map(|x| *x as f64),
            ColumnData::Float(v) => v.get(row).copied(),
            ColumnData::Text(_) => None,
        }
    }

    /// All values as `f64`, `None` for text columns
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Text(_) => None,
        }
    }

    /// Value at `row` rendered as a category label
    pub fn label(&self, row: usize) -> String {
        match self {
            ColumnData::Int(v) => v[row].to_string(),
            ColumnData::Float(v) => format_float(v[row]),
            ColumnData::Text(v) => v[row].clone(),
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Float(v) => ColumnData::Float(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => {
                ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// Render a float the way it is written back to CSV; missing values are empty cells
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }
}

/// Ordered set of equally long, uniquely named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame, checking that names are unique and lengths agree
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if col.data.len() != n_rows {
                return Err(PredictorError::InvalidInput(format!(
                    "column `{}` has {} rows, expected {}",
                    col.name,
                    col.data.len(),
                    n_rows
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(PredictorError::InvalidInput(format!(
                    "duplicate column `{}`",
                    col.name
                )));
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column by name, or `MissingColumn`
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| PredictorError::MissingColumn(name.to_string()))
    }

    /// Copy of the frame without the named columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Frame {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Frame {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Copy of the frame holding only the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
            .collect();
        Frame {
            columns,
            n_rows: indices.len(),
        }
    }

    /// Append a column, replacing an existing column with the same name in place
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.data.len() != self.n_rows {
            return Err(PredictorError::InvalidInput(format!(
                "column `{}` has {} rows, frame has {}",
                column.name,
                column.data.len(),
                self.n_rows
            )));
        }
        if self.columns.is_empty() {
            self.n_rows = column.data.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::new(vec![
            Column::new("Sex", ColumnData::Text(vec!["M".into(), "F".into(), "I".into()])),
            Column::new("Height", ColumnData::Float(vec![0.1, 0.2, 0.3])),
            Column::new("Rings", ColumnData::Int(vec![7, 9, 11])),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Frame::new(vec![
            Column::new("a", ColumnData::Int(vec![1, 2])),
            Column::new("b", ColumnData::Int(vec![1])),
        ]);
        assert!(matches!(result, Err(PredictorError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Frame::new(vec![
            Column::new("a", ColumnData::Int(vec![1])),
            Column::new("a", ColumnData::Int(vec![2])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_columns_ignores_unknown() {
        let frame = sample().drop_columns(&["Rings", "Age"]);
        assert_eq!(frame.column_names(), vec!["Sex", "Height"]);
        assert_eq!(frame.n_rows(), 3);
    }

    #[test]
    fn test_take_rows_keeps_alignment() {
        let frame = sample().take_rows(&[2, 0]);
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.column("Sex").unwrap().data.label(0), "I");
        assert_eq!(frame.column("Rings").unwrap().data.get_f64(1), Some(7.0));
    }

    #[test]
    fn test_set_column_replaces_existing() {
        let mut frame = sample();
        frame
            .set_column(Column::new("Height", ColumnData::Float(vec![1.0, 2.0, 3.0])))
            .unwrap();
        assert_eq!(frame.n_cols(), 3);
        assert_eq!(frame.column("Height").unwrap().data.get_f64(2), Some(3.0));
    }

    #[test]
    fn test_set_column_rejects_wrong_length() {
        let mut frame = sample();
        let result = frame.set_column(Column::new("x", ColumnData::Int(vec![1])));
        assert!(result.is_err());
    }

    #[test]
    fn test_require_missing_column() {
        let frame = sample();
        assert!(matches!(
            frame.require("Age"),
            Err(PredictorError::MissingColumn(name)) if name == "Age"
        ));
    }
}
