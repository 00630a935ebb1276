//! Built-in synthetic dataset used whenever no spreadsheet can be loaded.

use crate::{aggregate::round2, data::Record, normalize::Dataset};

const AC_REGS: [&str; 3] = ["F-GKLM", "F-GNOP", "F-GXYZ"];
const YEARS: [i32; 3] = [2022, 2023, 2024];
const URGENCIES: [&str; 3] = ["Routine", "Critical", "AOG"];
const SEGMENTS: [&str; 3] = ["Airframe", "Cabin", "Landing Gear"];

pub fn sample_records() -> Vec<Record> {
    let mut records = vec![
        Record {
            pn: "PN001".to_string(),
            description: "Part A".to_string(),
            quantite_moyenne: 10.5,
            nombre_visites: 5,
            frequence_totale: 20,
            frequence_nrc: 2,
            frequence_aog: 1,
            percent_nrc: 0.1,
            percent_aog: 0.05,
            score_criticite: 85.0,
            ac_reg: "F-GABC".to_string(),
            annee: Some(2023),
            urgency: "Critical".to_string(),
            segment: "Engine".to_string(),
        },
        Record {
            pn: "PN002".to_string(),
            description: "Part B".to_string(),
            quantite_moyenne: 5.0,
            nombre_visites: 10,
            frequence_totale: 30,
            frequence_nrc: 5,
            frequence_aog: 3,
            percent_nrc: 0.16,
            percent_aog: 0.1,
            score_criticite: 95.0,
            ac_reg: "F-GDEF".to_string(),
            annee: Some(2023),
            urgency: "AOG".to_string(),
            segment: "Avionics".to_string(),
        },
    ];
    records.extend((3..15).map(generated_record));
    records
}

pub fn sample_dataset() -> Dataset {
    Dataset::from_records(sample_records())
}

fn generated_record(i: i64) -> Record {
    let slot = (i % 3) as usize;
    let frequence_totale = i * 3;
    let frequence_nrc = i / 2;
    let frequence_aog = i / 4;
    let ratio = |count: i64| round2(count as f64 / frequence_totale as f64);
    let letter = char::from(b'A' + (i - 1) as u8);
    Record {
        pn: format!("PN{i:03}"),
        description: format!("Part {letter}"),
        quantite_moyenne: ((10.0 + i as f64 * 1.5) * 10.0).round() / 10.0,
        nombre_visites: i % 5 + 1,
        frequence_totale,
        frequence_nrc,
        frequence_aog,
        percent_nrc: ratio(frequence_nrc),
        percent_aog: ratio(frequence_aog),
        score_criticite: 60.0 + i as f64 * 2.5,
        ac_reg: AC_REGS[slot].to_string(),
        annee: Some(YEARS[slot]),
        urgency: URGENCIES[slot].to_string(),
        segment: SEGMENTS[slot].to_string(),
    }
}
