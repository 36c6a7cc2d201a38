use std::fmt;
use std::io::Read;
use std::path::Path;

use super::domain::{AttributeValue, RawAttributes};

#[derive(Debug)]
pub enum ClientImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ClientImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientImportError::Io(err) => write!(f, "failed to read client export: {err}"),
            ClientImportError::Csv(err) => write!(f, "invalid client CSV data: {err}"),
        }
    }
}

impl std::error::Error for ClientImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientImportError::Io(err) => Some(err),
            ClientImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ClientImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ClientImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn read_clients_csv_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<RawAttributes>, ClientImportError> {
    let file = std::fs::File::open(path)?;
    read_clients_csv(file)
}

/// Reads one client per CSV row keyed by the header line. Empty cells are
/// missing, cells that parse as numbers become numbers, everything else stays
/// text for categorical resolution.
pub fn read_clients_csv<R: Read>(reader: R) -> Result<Vec<RawAttributes>, ClientImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut clients = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let client = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name, cell_value(cell)))
            .collect::<RawAttributes>();
        clients.push(client);
    }

    Ok(clients)
}

fn cell_value(cell: &str) -> AttributeValue {
    if cell.is_empty() {
        return AttributeValue::Null;
    }
    match cell.parse::<f64>() {
        Ok(number) if number.is_finite() => AttributeValue::Number(number),
        _ => AttributeValue::Text(cell.to_string()),
    }
}
