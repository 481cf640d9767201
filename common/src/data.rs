//! Delimited text import and export of numeric matrices.
//! Rows are examples, columns are units or dimensions.
//! Lines starting with `#` are comments.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use nalgebra::DMatrix;

use crate::DataError;

/// Read a comma separated matrix from a file
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>, DataError> {
    let file = File::open(path.as_ref())?;
    debug!("reading matrix from {}", path.as_ref().display());
    read_matrix_from_reader(file)
}

/// Read a comma separated matrix from any reader.
/// Every row must have as many fields as the first one.
pub fn read_matrix_from_reader<R: Read>(reader: R) -> Result<DMatrix<f64>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0;
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let expected = *cols.get_or_insert(record.len());
        if record.len() != expected {
            return Err(DataError::RaggedRow {
                line,
                expected,
                actual: record.len(),
            });
        }
        for (column, field) in record.iter().enumerate() {
            let v = field.parse::<f64>().map_err(|_| DataError::Parse {
                line,
                column,
                value: field.to_string(),
            })?;
            values.push(v);
        }
        rows += 1;
    }

    match cols {
        Some(cols) if rows > 0 && cols > 0 => Ok(DMatrix::from_row_slice(rows, cols, &values)),
        _ => Err(DataError::Empty),
    }
}

/// Write a matrix as comma separated text to a file, preceded by comment lines
pub fn write_matrix<P: AsRef<Path>>(
    path: P,
    matrix: &DMatrix<f64>,
    comments: &[&str],
) -> Result<(), DataError> {
    let file = File::create(path.as_ref())?;
    debug!("writing {}x{} matrix to {}", matrix.nrows(), matrix.ncols(), path.as_ref().display());
    write_matrix_to_writer(file, matrix, comments)
}

/// Write a matrix as comma separated text, preceded by comment lines
pub fn write_matrix_to_writer<W: Write>(
    mut writer: W,
    matrix: &DMatrix<f64>,
    comments: &[&str],
) -> Result<(), DataError> {
    for c in comments {
        writeln!(writer, "# {}", c)?;
    }
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for row in matrix.row_iter() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;

    Ok(())
}
