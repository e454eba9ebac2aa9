//! CSV import and export of factorial datasets.
//!
//! The header holds the factor names followed by the response name; every
//! record holds one level per factor and the response last. No index column.

use super::dataset::Dataset;
use crate::core::errors::SimError;
use log::info;
use std::io;
use std::path::Path;

/// Write a dataset as CSV
pub fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    write_records(&mut wtr, dataset)
}

/// Write a dataset to a CSV file, replacing any existing file
pub fn write_dataset_file(path: impl AsRef<Path>, dataset: &Dataset) -> Result<(), SimError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    write_records(&mut wtr, dataset)?;
    info!("exported {} rows to '{}'", dataset.len(), path.display());
    Ok(())
}

fn write_records<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    dataset: &Dataset,
) -> Result<(), SimError> {
    let header = dataset
        .factor_names()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(dataset.response_name()));
    wtr.write_record(header)?;

    for row in dataset.rows() {
        let record = row
            .levels
            .iter()
            .chain(std::iter::once(&row.response))
            .map(|value| value.to_string());
        wtr.write_record(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a dataset from CSV; the last column is the response
pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset, SimError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(SimError::Parse(format!(
            "expected at least one factor column and a response column, found {} columns",
            headers.len()
        )));
    }
    let factor_count = headers.len() - 1;
    let factor_names = headers
        .iter()
        .take(factor_count)
        .map(|name| name.trim().to_string())
        .collect();
    let response_name = headers.get(factor_count).unwrap_or_default().trim();
    let mut dataset = Dataset::new(factor_names, response_name);

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let mut values = record
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|err| {
                    SimError::Parse(format!("row {}: '{}' is not a number ({})", row, field, err))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let response = values.pop().ok_or_else(|| {
            SimError::Parse(format!("row {} is empty", row))
        })?;
        dataset.push_row(values, response)?;
    }

    Ok(dataset)
}

/// Read a dataset from a CSV file
pub fn read_dataset_file(path: impl AsRef<Path>) -> Result<Dataset, SimError> {
    let path = path.as_ref();
    let dataset = read_dataset(std::fs::File::open(path)?)?;
    info!("loaded {} rows from '{}'", dataset.len(), path.display());
    Ok(dataset)
}
