//! CSV input/output for the location list and the weather report.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::info;

use crate::{
    error::StorageError,
    model::LocationRecord,
    report::{REPORT_COLUMNS, ReportRow},
};

/// Read locations from a headerless `name,area` CSV file, in file order.
///
/// Every row must have exactly two fields and a non-empty name; the first
/// offending row aborts the read.
pub fn read_locations(path: impl AsRef<Path>) -> Result<Vec<LocationRecord>, StorageError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| StorageError::file_access(path, e))?;

    let locations = read_from(path, BufReader::new(file))?;

    info!(path = %path.display(), rows = locations.len(), "Read locations");
    Ok(locations)
}

/// Write the report with its header row, replacing the file's contents.
///
/// The file is truncated up front, so a failed write leaves it in an
/// undefined state.
pub fn write_report(rows: &[ReportRow], path: impl AsRef<Path>) -> Result<(), StorageError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| StorageError::file_access(path, e))?;

    write_to(rows, BufWriter::new(file)).map_err(|e| write_error(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "Wrote report");
    Ok(())
}

fn read_from<R: Read>(path: &Path, reader: R) -> Result<Vec<LocationRecord>, StorageError> {
    let mut rdr = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

    let mut locations = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| read_error(path, e))?;
        let line = record.position().map_or(0, |pos| pos.line());

        if record.len() != 2 {
            return Err(StorageError::parse(
                line,
                format!("expected 2 fields (name, area), found {}", record.len()),
            ));
        }
        if record[0].is_empty() {
            return Err(StorageError::parse(line, "location name must not be empty"));
        }

        locations.push(LocationRecord::new(&record[0], &record[1]));
    }

    Ok(locations)
}

fn write_to<W: Write>(rows: &[ReportRow], out: W) -> csv::Result<()> {
    // Header is written by hand so that an empty report still carries it.
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(out);

    wtr.write_record(REPORT_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn read_error(path: &Path, err: csv::Error) -> StorageError {
    let line = err.position().map_or(0, |pos| pos.line());
    let message = err.to_string();

    match err.into_kind() {
        csv::ErrorKind::Io(source) => StorageError::file_access(path, source),
        _ => StorageError::parse(line, message),
    }
}

fn write_error(path: &Path, err: csv::Error) -> StorageError {
    let message = err.to_string();

    match err.into_kind() {
        csv::ErrorKind::Io(source) => StorageError::file_access(path, source),
        _ => StorageError::Serialization { message },
    }
}
