//! Flat, renamed projection of the working subset and its CSV serialization.

use std::{collections::BTreeMap, io::Write};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::{
    cli::ExportArgs,
    data::Record,
    error::IngestError,
    io_utils,
    schema::Field,
    session::Session,
};

pub const DEFAULT_EXPORT_FILE: &str = "donnees_filtrees.csv";

pub const EXPORT_COLUMNS: [(Field, &str); 8] = [
    (Field::Pn, "PN"),
    (Field::Description, "Description"),
    (Field::ScoreCriticite, "Score criticité"),
    (Field::PercentAog, "% AOG"),
    (Field::PercentNrc, "% NRC"),
    (Field::QuantiteMoyenne, "Quantité Moyenne"),
    (Field::Urgency, "URGENCY"),
    (Field::Segment, "Segment"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Selects and renames the export columns. Every record carries every field,
/// so all eight columns are always present.
pub fn project(records: &[Record]) -> ExportTable {
    if records.is_empty() {
        return ExportTable::default();
    }
    let headers = EXPORT_COLUMNS
        .iter()
        .map(|(_, name)| name.to_string())
        .collect();
    let rows = records
        .iter()
        .map(|record| {
            EXPORT_COLUMNS
                .iter()
                .map(|(field, _)| record.display_value(*field))
                .collect()
        })
        .collect();
    ExportTable { headers, rows }
}

/// Maps exported headers back to canonical fields, row by row.
pub fn unproject(table: &ExportTable) -> Result<Vec<BTreeMap<Field, String>>> {
    let fields = table
        .headers
        .iter()
        .map(|header| {
            EXPORT_COLUMNS
                .iter()
                .find(|(_, name)| name == header)
                .map(|(field, _)| *field)
                .ok_or_else(|| anyhow!("Unknown export column '{header}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(table
        .rows
        .iter()
        .map(|row| fields.iter().copied().zip(row.iter().cloned()).collect())
        .collect())
}

pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> Result<()> {
    let mut writer = io_utils::csv_writer(writer);
    writer
        .write_record(&table.headers)
        .context("Writing export header")?;
    for (idx, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing export row {}", idx + 1))?;
    }
    writer.flush().context("Flushing export")?;
    Ok(())
}

pub fn execute(args: &ExportArgs) -> Result<()> {
    let session = Session::from_args(&args.source, &args.filters)?;
    let table = match session.export() {
        Ok(table) => table,
        Err(err @ IngestError::EmptyExport) => {
            warn!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let output = io_utils::open_output(Some(&args.output))?;
    write_csv(&table, output)
        .with_context(|| format!("Exporting to {:?}", args.output))?;
    info!(
        "Exported {} row(s) across {} column(s) to {:?}",
        table.rows.len(),
        table.headers.len(),
        args.output
    );
    Ok(())
}
