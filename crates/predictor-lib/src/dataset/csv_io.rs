//! CSV loading with column type inference, and CSV export

use super::frame::{format_float, Column, ColumnData, Frame};
use crate::error::Result;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::debug;

/// Load a headed CSV file into a frame
pub fn read_csv(path: impl AsRef<Path>) -> Result<Frame> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let frame = read_csv_from_reader(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "Loaded CSV"
    );
    Ok(frame)
}

/// Parse headed CSV from any reader
///
/// Each column becomes `Int` when every cell is a present integer, `Float`
/// when every present cell is a number (blank cells become `NaN`), and
/// `Text` otherwise.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Frame> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (i, field) in record.iter().enumerate() {
            cells[i].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, infer_column(values)))
        .collect();

    Frame::new(columns)
}

fn infer_column(values: Vec<String>) -> ColumnData {
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnData::Int(values.iter().filter_map(|v| v.parse().ok()).collect());
    }

    let numeric = values
        .iter()
        .all(|v| v.is_empty() || v.parse::<f64>().is_ok());
    if numeric {
        return ColumnData::Float(
            values
                .iter()
                .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        );
    }

    ColumnData::Text(values)
}

/// Write a frame as headed CSV
pub fn write_csv(frame: &Frame, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv_to_writer(frame, file)
}

pub fn write_csv_to_writer<W: Write>(frame: &Frame, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(frame.column_names())?;

    for row in 0..frame.n_rows() {
        let record: Vec<String> = frame
            .columns()
            .iter()
            .map(|c| match &c.data {
                ColumnData::Int(v) => v[row].to_string(),
                ColumnData::Float(v) => format_float(v[row]),
                ColumnData::Text(v) => v[row].clone(),
            })
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;

    const SAMPLE: &str = "\
Sex,Length,Height,Rings
M,0.455,0.095,15
F,0.53,0.135,9
I,0.33,0.08,7
";

    #[test]
    fn test_infers_column_kinds() {
        let frame = read_csv_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.column("Sex").unwrap().kind(), ColumnKind::Text);
        assert_eq!(frame.column("Length").unwrap().kind(), ColumnKind::Float);
        assert_eq!(frame.column("Rings").unwrap().kind(), ColumnKind::Int);
    }

    #[test]
    fn test_blank_integer_cells_promote_to_float() {
        let data = "Sex,Rings\nM,15\nF,\n";
        let frame = read_csv_from_reader(data.as_bytes()).unwrap();
        let rings = &frame.column("Rings").unwrap().data;
        assert_eq!(rings.kind(), ColumnKind::Float);
        assert_eq!(rings.get_f64(0), Some(15.0));
        assert!(rings.get_f64(1).unwrap().is_nan());
    }

    #[test]
    fn test_header_only_gives_empty_frame() {
        let frame = read_csv_from_reader("Sex,Length\n".as_bytes()).unwrap();
        assert_eq!(frame.n_rows(), 0);
        assert_eq!(frame.n_cols(), 2);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(read_csv_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read_preserves_values() {
        let frame = read_csv_from_reader(SAMPLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv_to_writer(&frame, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Sex,Length,Height,Rings\n"));
        assert!(text.contains("M,0.455,0.095,15"));
    }
}
