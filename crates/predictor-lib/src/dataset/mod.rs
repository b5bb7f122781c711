//! Tabular data: frames, CSV I/O and partitioning

mod csv_io;
mod frame;
mod split;

pub use csv_io::{read_csv, read_csv_from_reader, write_csv, write_csv_to_writer};
pub use frame::{Column, ColumnData, ColumnKind, Frame};
pub use split::{train_test_split, TrainValidSplit};
