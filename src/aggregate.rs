//! Derived views over the record set and the working subset.
//!
//! Filter choice lists and the reference count read the full record set; every
//! other view reads the working subset. All functions are pure and recompute
//! from scratch on each call.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::{data::Record, schema::Field};

const TOP_PARTS: usize = 10;
const UNKNOWN_URGENCY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPart {
    pub name: String,
    #[serde(rename = "Score")]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AogNrcPoint {
    pub name: String,
    #[serde(rename = "% AOG")]
    pub percent_aog: f64,
    #[serde(rename = "% NRC")]
    pub percent_nrc: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgencySlice {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearPoint {
    pub name: String,
    #[serde(rename = "Score Moyen")]
    pub avg_score: f64,
    #[serde(rename = "Quantité Totale")]
    pub total_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_references_tracked: usize,
    pub avg_score_criticite: f64,
    pub avg_percent_aog: f64,
    pub avg_percent_nrc: f64,
}

/// Values offered by the filter controls, taken from the unfiltered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChoices {
    pub pns: Vec<String>,
    pub urgencies: Vec<String>,
    pub ac_regs: Vec<String>,
    pub years: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub choices: FilterChoices,
    pub kpis: Kpis,
    pub top_critical_parts: Vec<CriticalPart>,
    pub aog_nrc_by_part: Vec<AogNrcPoint>,
    pub urgency_distribution: Vec<UrgencySlice>,
    pub evolution_by_year: Vec<YearPoint>,
}

impl Dashboard {
    pub fn compute(records: &[Record], subset: &[Record]) -> Self {
        Self {
            choices: FilterChoices::compute(records),
            kpis: Kpis::compute(records, subset),
            top_critical_parts: top_critical_parts(subset),
            aog_nrc_by_part: aog_nrc_by_part(subset),
            urgency_distribution: urgency_distribution(subset),
            evolution_by_year: evolution_by_year(subset),
        }
    }
}

impl FilterChoices {
    pub fn compute(records: &[Record]) -> Self {
        Self {
            pns: unique_values(records, Field::Pn),
            urgencies: unique_values(records, Field::Urgency),
            ac_regs: unique_values(records, Field::AcReg),
            years: unique_years(records),
        }
    }
}

impl Kpis {
    pub fn compute(records: &[Record], subset: &[Record]) -> Self {
        Self {
            total_references_tracked: total_references_tracked(records),
            avg_score_criticite: avg_score_criticite(subset),
            avg_percent_aog: avg_percent_aog(subset),
            avg_percent_nrc: avg_percent_nrc(subset),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Distinct non-empty values of `field`, ascending.
pub fn unique_values(records: &[Record], field: Field) -> Vec<String> {
    records
        .iter()
        .map(|record| record.display_value(field))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct known years in numeric order.
pub fn unique_years(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.annee)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|year| year.to_string())
        .collect()
}

pub fn total_references_tracked(records: &[Record]) -> usize {
    unique_values(records, Field::Pn).len()
}

pub fn avg_score_criticite(subset: &[Record]) -> f64 {
    mean(subset.iter().map(|record| record.score_criticite))
        .map(round2)
        .unwrap_or(0.0)
}

pub fn avg_percent_aog(subset: &[Record]) -> f64 {
    mean(subset.iter().map(|record| record.percent_aog))
        .map(|ratio| round2(ratio * 100.0))
        .unwrap_or(0.0)
}

pub fn avg_percent_nrc(subset: &[Record]) -> f64 {
    mean(subset.iter().map(|record| record.percent_nrc))
        .map(|ratio| round2(ratio * 100.0))
        .unwrap_or(0.0)
}

/// Ten highest scores; equal scores keep their input order.
pub fn top_critical_parts(subset: &[Record]) -> Vec<CriticalPart> {
    subset
        .iter()
        .sorted_by(|a, b| b.score_criticite.total_cmp(&a.score_criticite))
        .take(TOP_PARTS)
        .map(|record| CriticalPart {
            name: record.pn.clone(),
            score: record.score_criticite,
        })
        .collect()
}

#[derive(Default)]
struct RatioTotals {
    aog: f64,
    nrc: f64,
    count: usize,
}

/// Per-part mean AOG/NRC ratios, ranked by their sum. Ties keep part-number order.
pub fn aog_nrc_by_part(subset: &[Record]) -> Vec<AogNrcPoint> {
    let mut groups: BTreeMap<&str, RatioTotals> = BTreeMap::new();
    for record in subset {
        let totals = groups.entry(record.pn.as_str()).or_default();
        totals.aog += record.percent_aog;
        totals.nrc += record.percent_nrc;
        totals.count += 1;
    }
    groups
        .into_iter()
        .map(|(pn, totals)| {
            let count = totals.count as f64;
            (pn, totals.aog / count, totals.nrc / count)
        })
        .sorted_by(|a, b| (b.1 + b.2).total_cmp(&(a.1 + a.2)))
        .take(TOP_PARTS)
        .map(|(pn, aog, nrc)| AogNrcPoint {
            name: pn.to_string(),
            percent_aog: round2(aog * 100.0),
            percent_nrc: round2(nrc * 100.0),
        })
        .collect()
}

/// Record count per urgency, largest first, ties in alphabetical order.
pub fn urgency_distribution(subset: &[Record]) -> Vec<UrgencySlice> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in subset {
        let name = if record.urgency.is_empty() {
            UNKNOWN_URGENCY
        } else {
            record.urgency.as_str()
        };
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(name, value)| UrgencySlice {
            name: name.to_string(),
            value,
        })
        .collect()
}

#[derive(Default)]
struct YearTotals {
    score: f64,
    quantity: f64,
    count: usize,
}

/// Mean score and summed average quantity per known year, ascending.
pub fn evolution_by_year(subset: &[Record]) -> Vec<YearPoint> {
    let mut groups: BTreeMap<i32, YearTotals> = BTreeMap::new();
    for record in subset {
        let Some(year) = record.annee else {
            continue;
        };
        let totals = groups.entry(year).or_default();
        totals.score += record.score_criticite;
        totals.quantity += record.quantite_moyenne;
        totals.count += 1;
    }
    groups
        .into_iter()
        .map(|(year, totals)| YearPoint {
            name: year.to_string(),
            avg_score: round2(totals.score / totals.count as f64),
            total_quantity: round2(totals.quantity),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(pn: &str, score: f64) -> Record {
        Record {
            pn: pn.to_string(),
            score_criticite: score,
            ..Record::default()
        }
    }

    #[test]
    fn empty_subset_yields_zero_kpis_and_empty_series() {
        let dashboard = Dashboard::compute(&[], &[]);
        assert_eq!(dashboard.kpis.avg_score_criticite, 0.0);
        assert_eq!(dashboard.kpis.avg_percent_aog, 0.0);
        assert_eq!(dashboard.kpis.total_references_tracked, 0);
        assert!(dashboard.top_critical_parts.is_empty());
        assert!(dashboard.aog_nrc_by_part.is_empty());
        assert!(dashboard.urgency_distribution.is_empty());
        assert!(dashboard.evolution_by_year.is_empty());
    }

    #[test]
    fn unique_years_sort_numerically() {
        let records = [2, 10, 1]
            .into_iter()
            .map(|year| Record {
                annee: Some(year),
                ..Record::default()
            })
            .collect::<Vec<_>>();
        assert_eq!(unique_years(&records), vec!["1", "2", "10"]);
    }

    #[test]
    fn top_parts_are_stable_for_equal_scores() {
        let subset = vec![part("A", 70.0), part("B", 90.0), part("C", 70.0)];
        let names = top_critical_parts(&subset)
            .into_iter()
            .map(|p| p.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn top_parts_cap_at_ten() {
        let subset = (0..15)
            .map(|i| part(&format!("P{i:02}"), i as f64))
            .collect::<Vec<_>>();
        let top = top_critical_parts(&subset);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "P14");
    }

    #[test]
    fn aog_nrc_groups_by_part_and_ranks_by_sum() {
        let mut a1 = part("A", 0.0);
        a1.percent_aog = 0.1;
        a1.percent_nrc = 0.2;
        let mut a2 = part("A", 0.0);
        a2.percent_aog = 0.3;
        a2.percent_nrc = 0.0;
        let mut b = part("B", 0.0);
        b.percent_aog = 0.5;
        b.percent_nrc = 0.5;
        let points = aog_nrc_by_part(&[a1, a2, b]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "B");
        assert_eq!(points[0].percent_aog, 50.0);
        assert_eq!(points[1].name, "A");
        assert_eq!(points[1].percent_aog, 20.0);
        assert_eq!(points[1].percent_nrc, 10.0);
    }

    #[test]
    fn urgency_distribution_orders_by_count_then_name() {
        let subset = ["Routine", "AOG", "Critical", "AOG", "", "Critical"]
            .into_iter()
            .map(|urgency| Record {
                urgency: urgency.to_string(),
                ..Record::default()
            })
            .collect::<Vec<_>>();
        let slices = urgency_distribution(&subset);
        let flat = slices
            .iter()
            .map(|s| (s.name.as_str(), s.value))
            .collect::<Vec<_>>();
        assert_eq!(
            flat,
            vec![("AOG", 2), ("Critical", 2), ("Routine", 1), ("Unknown", 1)]
        );
    }

    #[test]
    fn evolution_averages_score_and_sums_quantity() {
        let subset = vec![
            Record {
                annee: Some(2023),
                score_criticite: 80.0,
                quantite_moyenne: 1.25,
                ..Record::default()
            },
            Record {
                annee: Some(2022),
                score_criticite: 10.0,
                quantite_moyenne: 3.0,
                ..Record::default()
            },
            Record {
                annee: Some(2023),
                score_criticite: 85.0,
                quantite_moyenne: 2.5,
                ..Record::default()
            },
            Record {
                annee: None,
                score_criticite: 99.0,
                ..Record::default()
            },
        ];
        let points = evolution_by_year(&subset);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "2022");
        assert_eq!(points[1].name, "2023");
        assert_eq!(points[1].avg_score, 82.5);
        assert_eq!(points[1].total_quantity, 3.75);
    }

    #[test]
    fn percent_kpis_scale_ratios() {
        let subset = vec![
            Record {
                percent_aog: 0.05,
                percent_nrc: 0.1,
                ..Record::default()
            },
            Record {
                percent_aog: 0.1,
                percent_nrc: 0.16,
                ..Record::default()
            },
        ];
        assert_eq!(avg_percent_aog(&subset), 7.5);
        assert_eq!(avg_percent_nrc(&subset), 13.0);
    }

    #[test]
    fn dashboard_serializes_chart_keys() {
        let subset = vec![part("A", 50.0)];
        let json = serde_json::to_value(Dashboard::compute(&subset, &subset)).expect("json");
        assert_eq!(json["top_critical_parts"][0]["Score"], 50.0);
        assert_eq!(json["kpis"]["total_references_tracked"], 1);
    }
}
