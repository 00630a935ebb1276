//! Raw table → typed [`Record`] list.
//!
//! Headers are resolved through the [`SchemaMapper`], mandatory fields are
//! checked, and every cell is coerced independently. A bad cell falls back to
//! its field default and is only counted; the whole table is rejected solely
//! for missing mandatory columns or a structurally broken row.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::{
    data::{RawCell, RawTable, Record, cell_text, parse_float, parse_integer, parse_year},
    error::IngestError,
    schema::{Field, FieldKind, SchemaMapper},
};

/// Normalized record set. Fields absent from the input hold their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn normalize(table: &RawTable, mapper: &SchemaMapper) -> Result<Dataset, IngestError> {
    let resolved = table
        .headers
        .iter()
        .map(|header| mapper.resolve(header))
        .collect::<Vec<_>>();
    for column in resolved.iter().filter(|column| column.field().is_none()) {
        debug!("Ignoring unmapped column '{}'", column.name());
    }

    let mut columns_by_field: BTreeMap<Field, Vec<usize>> = BTreeMap::new();
    for (idx, column) in resolved.iter().enumerate() {
        if let Some(field) = column.field() {
            columns_by_field.entry(field).or_default().push(idx);
        }
    }
    let source_fields = columns_by_field.keys().copied().collect::<BTreeSet<_>>();

    let missing = mapper
        .required_fields()
        .into_iter()
        .filter(|field| !source_fields.contains(field))
        .map(|field| mapper.display_name(field))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(IngestError::SchemaValidation { missing });
    }

    let header_count = table.headers.len();
    let mut records = Vec::with_capacity(table.rows.len());
    let mut anomalies: BTreeMap<Field, usize> = BTreeMap::new();
    let mut skipped_blank = 0usize;
    for (row_idx, row) in table.rows.iter().enumerate() {
        if row.len() > header_count {
            return Err(IngestError::Processing(format!(
                "la ligne {} contient {} cellules pour {} en-têtes",
                row_idx + 2,
                row.len(),
                header_count
            )));
        }
        if row.iter().all(RawCell::is_blank) {
            skipped_blank += 1;
            continue;
        }
        let mut record = Record::default();
        for (field, indices) in &columns_by_field {
            let cell = pick_cell(row, indices);
            if !assign(&mut record, *field, cell) {
                *anomalies.entry(*field).or_insert(0) += 1;
            }
        }
        records.push(record);
    }

    if skipped_blank > 0 {
        debug!("Skipped {skipped_blank} blank row(s)");
    }
    for (field, count) in &anomalies {
        debug!("Defaulted {count} unparsable cell(s) in '{field}'");
    }
    let synthesized = Field::ALL
        .iter()
        .filter(|field| !source_fields.contains(field))
        .map(|field| field.as_str())
        .collect::<Vec<_>>();
    if !synthesized.is_empty() {
        debug!("Synthesized default values for {}", synthesized.join(", "));
    }
    info!(
        "Normalized {} record(s) from {} column(s)",
        records.len(),
        header_count
    );
    Ok(Dataset { records })
}

static EMPTY_CELL: RawCell = RawCell::Empty;

/// Leftmost non-blank cell among the columns mapped to one field.
fn pick_cell<'a>(row: &'a [RawCell], indices: &[usize]) -> &'a RawCell {
    indices
        .iter()
        .filter_map(|idx| row.get(*idx))
        .find(|cell| !cell.is_blank())
        .unwrap_or(&EMPTY_CELL)
}

/// Writes the coerced cell into `record`; returns `false` when a non-blank cell
/// could not be parsed and the default was used instead.
fn assign(record: &mut Record, field: Field, cell: &RawCell) -> bool {
    let blank = cell.is_blank();
    match field.kind() {
        FieldKind::Text => {
            let value = if blank { String::new() } else { cell_text(cell) };
            match field {
                Field::Pn => record.pn = value,
                Field::Description => record.description = value,
                Field::AcReg => record.ac_reg = value,
                Field::Urgency => record.urgency = value,
                Field::Segment => record.segment = value,
                _ => unreachable!("{field} is not a text field"),
            }
            true
        }
        FieldKind::Float => {
            let parsed = parse_float(cell);
            let value = parsed.unwrap_or(0.0);
            match field {
                Field::QuantiteMoyenne => record.quantite_moyenne = value,
                Field::PercentNrc => record.percent_nrc = value,
                Field::PercentAog => record.percent_aog = value,
                Field::ScoreCriticite => record.score_criticite = value,
                _ => unreachable!("{field} is not a float field"),
            }
            blank || parsed.is_some()
        }
        FieldKind::Integer => {
            let parsed = parse_integer(cell);
            let value = parsed.unwrap_or(0);
            match field {
                Field::NombreVisites => record.nombre_visites = value,
                Field::FrequenceTotale => record.frequence_totale = value,
                Field::FrequenceNrc => record.frequence_nrc = value,
                Field::FrequenceAog => record.frequence_aog = value,
                _ => unreachable!("{field} is not an integer field"),
            }
            blank || parsed.is_some()
        }
        FieldKind::Year => {
            record.annee = parse_year(cell);
            blank || record.annee.is_some()
        }
    }
}
