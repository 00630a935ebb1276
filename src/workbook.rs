//! Spreadsheet input: first sheet of an `.xlsx` workbook, first row as headers.

use std::{
    io::{Cursor, Read, Seek},
    path::Path,
};

use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use log::debug;

use crate::{
    data::{RawCell, RawTable, cell_text},
    error::IngestError,
};

pub const SUPPORTED_EXTENSION: &str = ".xlsx";

/// Rejects anything that is not named like an `.xlsx` workbook.
pub fn ensure_supported(file_name: &str) -> Result<(), IngestError> {
    if file_name.ends_with(SUPPORTED_EXTENSION) {
        Ok(())
    } else {
        Err(IngestError::UnsupportedFileType(file_name.to_string()))
    }
}

pub fn read_path(path: &Path) -> Result<RawTable, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|err: XlsxError| {
        IngestError::Processing(format!("ouverture du classeur {}: {err}", path.display()))
    })?;
    first_sheet(&mut workbook)
}

pub fn read_bytes(bytes: Vec<u8>) -> Result<RawTable, IngestError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|err| IngestError::Processing(format!("classeur illisible: {err}")))?;
    first_sheet(&mut workbook)
}

pub fn read_from<R: Read>(mut reader: R) -> Result<RawTable, IngestError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!("Read {} byte(s) of workbook data", bytes.len());
    read_bytes(bytes)
}

fn first_sheet<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> Result<RawTable, IngestError> {
    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::Processing(
            "le classeur ne contient aucune feuille".to_string(),
        ));
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|err| IngestError::Processing(format!("lecture de la feuille '{name}': {err}")))?;
    debug!("Reading sheet '{name}' ({:?})", range.get_size());
    Ok(range_to_table(&range))
}

pub fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return RawTable::default();
    };
    let headers = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell_text(&convert_cell(cell)).trim().to_string();
            if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect();
    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    RawTable { headers, rows }
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(text) => RawCell::Text(text.clone()),
        Data::Float(value) => RawCell::Float(*value),
        Data::Int(value) => RawCell::Int(*value),
        Data::Bool(value) => RawCell::Bool(*value),
        // Serial date number, as a numeric reader would see it.
        Data::DateTime(value) => RawCell::Float(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => RawCell::Text(text.clone()),
        Data::Error(_) => RawCell::Empty,
    }
}
