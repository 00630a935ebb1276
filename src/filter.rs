use serde::{Deserialize, Serialize};

use crate::data::Record;

/// Live filter values. Blank strings and non-positive scores are inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub pn: String,
    pub urgency: String,
    pub ac_reg: String,
    pub min_score: f64,
    pub annee: String,
}

impl FilterState {
    pub fn set_pn(&mut self, value: &str) {
        self.pn = value.to_string();
    }

    pub fn set_urgency(&mut self, value: &str) {
        self.urgency = value.to_string();
    }

    pub fn set_ac_reg(&mut self, value: &str) {
        self.ac_reg = value.to_string();
    }

    /// Blank or unparsable input resets the threshold to inactive.
    pub fn set_min_score(&mut self, value: &str) {
        self.min_score = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
            .unwrap_or(0.0);
    }

    pub fn set_annee(&mut self, value: &str) {
        self.annee = value.to_string();
    }

    /// Year predicate value; `None` when blank or not an integer.
    pub fn year(&self) -> Option<i32> {
        if self.annee.is_empty() {
            return None;
        }
        self.annee.trim().parse::<i32>().ok()
    }

    pub fn is_active(&self) -> bool {
        !self.pn.is_empty()
            || !self.urgency.is_empty()
            || !self.ac_reg.is_empty()
            || self.min_score > 0.0
            || self.year().is_some()
    }

    fn conditions(&self) -> Vec<FilterCondition<'_>> {
        let mut conditions = Vec::new();
        if !self.pn.is_empty() {
            conditions.push(FilterCondition::PnContains(self.pn.to_lowercase()));
        }
        if !self.urgency.is_empty() {
            conditions.push(FilterCondition::UrgencyEquals(&self.urgency));
        }
        if !self.ac_reg.is_empty() {
            conditions.push(FilterCondition::AcRegEquals(&self.ac_reg));
        }
        if self.min_score > 0.0 {
            conditions.push(FilterCondition::MinScore(self.min_score));
        }
        if let Some(year) = self.year() {
            conditions.push(FilterCondition::YearEquals(year));
        }
        conditions
    }
}

#[derive(Debug, Clone)]
enum FilterCondition<'a> {
    PnContains(String),
    UrgencyEquals(&'a str),
    AcRegEquals(&'a str),
    MinScore(f64),
    YearEquals(i32),
}

impl FilterCondition<'_> {
    fn matches(&self, record: &Record) -> bool {
        match self {
            FilterCondition::PnContains(needle) => {
                record.pn.to_lowercase().contains(needle.as_str())
            }
            FilterCondition::UrgencyEquals(value) => record.urgency == *value,
            FilterCondition::AcRegEquals(value) => record.ac_reg == *value,
            FilterCondition::MinScore(threshold) => record.score_criticite >= *threshold,
            FilterCondition::YearEquals(year) => record.annee == Some(*year),
        }
    }
}

/// Working subset: every record passing all active predicates, in input order.
pub fn apply(records: &[Record], filters: &FilterState) -> Vec<Record> {
    let conditions = filters.conditions();
    if conditions.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| conditions.iter().all(|condition| condition.matches(record)))
        .cloned()
        .collect()
}
