use serde::{Deserialize, Serialize};

use crate::schema::Field;

/// One untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            RawCell::Float(value) => value.is_nan(),
            RawCell::Int(_) | RawCell::Bool(_) => false,
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Float(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::Int(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawCell::Empty)
    }
}

/// Header row plus data rows, as read from the first sheet of a workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<C: Into<RawCell>>(&mut self, cells: impl IntoIterator<Item = C>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn with_row<C: Into<RawCell>>(mut self, cells: impl IntoIterator<Item = C>) -> Self {
        self.push_row(cells);
        self
    }
}

/// A fully typed critical-part record. Every field is always populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub pn: String,
    pub description: String,
    pub quantite_moyenne: f64,
    pub nombre_visites: i64,
    pub frequence_totale: i64,
    pub frequence_nrc: i64,
    pub frequence_aog: i64,
    pub percent_nrc: f64,
    pub percent_aog: f64,
    pub score_criticite: f64,
    pub ac_reg: String,
    pub annee: Option<i32>,
    pub urgency: String,
    pub segment: String,
}

impl Record {
    /// Stringified value of `field`; an absent year renders as an empty string.
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::Pn => self.pn.clone(),
            Field::Description => self.description.clone(),
            Field::QuantiteMoyenne => self.quantite_moyenne.to_string(),
            Field::NombreVisites => self.nombre_visites.to_string(),
            Field::FrequenceTotale => self.frequence_totale.to_string(),
            Field::FrequenceNrc => self.frequence_nrc.to_string(),
            Field::FrequenceAog => self.frequence_aog.to_string(),
            Field::PercentNrc => self.percent_nrc.to_string(),
            Field::PercentAog => self.percent_aog.to_string(),
            Field::ScoreCriticite => self.score_criticite.to_string(),
            Field::AcReg => self.ac_reg.clone(),
            Field::Annee => self.annee.map(|year| year.to_string()).unwrap_or_default(),
            Field::Urgency => self.urgency.clone(),
            Field::Segment => self.segment.clone(),
        }
    }
}

/// Decimal parse; `None` for blank or unparsable cells and non-finite values.
pub fn parse_float(cell: &RawCell) -> Option<f64> {
    let parsed = match cell {
        RawCell::Empty => return None,
        RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
        RawCell::Int(value) => *value as f64,
        RawCell::Float(value) => *value,
        RawCell::Bool(value) => f64::from(u8::from(*value)),
    };
    parsed.is_finite().then_some(parsed)
}

/// Decimal parse truncated toward zero.
pub fn parse_integer(cell: &RawCell) -> Option<i64> {
    parse_float(cell).map(|value| value.trunc() as i64)
}

/// Year parse: only pure digit strings (after dropping a trailing `.0`) qualify.
pub fn parse_year(cell: &RawCell) -> Option<i32> {
    match cell {
        RawCell::Int(value) => i32::try_from(*value).ok().filter(|year| *year >= 0),
        RawCell::Float(value) => {
            if value.is_finite() && value.fract() == 0.0 && *value >= 0.0 {
                i32::try_from(*value as i64).ok()
            } else {
                None
            }
        }
        RawCell::Text(text) => {
            let trimmed = text.trim();
            let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                digits.parse::<i32>().ok()
            } else {
                None
            }
        }
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// String coercion; blank cells become an empty string.
pub fn cell_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(text) => text.clone(),
        RawCell::Int(value) => value.to_string(),
        RawCell::Float(value) if value.is_nan() => String::new(),
        RawCell::Float(value) => value.to_string(),
        RawCell::Bool(true) => "True".to_string(),
        RawCell::Bool(false) => "False".to_string(),
    }
}
