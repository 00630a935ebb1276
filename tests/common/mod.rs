#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use critical_parts::data::Record;
use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// One cell written into a generated workbook.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

pub const FULL_HEADERS: [&str; 14] = [
    "PN",
    "Description",
    "Quantité Moyenne",
    "Nombre de visites",
    "Fréquence totale",
    "Fréquence NRC",
    "Fréquence AOG",
    "% NRC",
    "% AOG",
    "Score de criticité",
    "A/C REG",
    "Année",
    "URGENCY",
    "Segment",
];

/// Builds an in-memory `.xlsx` whose first sheet holds `headers` then `rows`.
pub fn workbook_bytes(headers: &[&str], rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .expect("write header");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(text) => {
                    sheet
                        .write_string(row_num, col as u16, *text)
                        .expect("write text cell");
                }
                Cell::Number(value) => {
                    sheet
                        .write_number(row_num, col as u16, *value)
                        .expect("write number cell");
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().expect("serialize workbook")
}

/// Full-schema row with the given part number, score, urgency and year.
pub fn part_row<'a>(pn: &'a str, score: f64, urgency: &'a str, year: f64) -> Vec<Cell<'a>> {
    vec![
        Cell::Text(pn),
        Cell::Text("Joint torique"),
        Cell::Number(4.0),
        Cell::Number(3.0),
        Cell::Number(12.0),
        Cell::Number(2.0),
        Cell::Number(1.0),
        Cell::Number(0.2),
        Cell::Number(0.1),
        Cell::Number(score),
        Cell::Text("F-HBXA"),
        Cell::Number(year),
        Cell::Text(urgency),
        Cell::Text("Landing Gear"),
    ]
}

pub fn record(pn: &str, score: f64) -> Record {
    Record {
        pn: pn.to_string(),
        description: format!("Pièce {pn}"),
        score_criticite: score,
        ..Record::default()
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    pub fn write_workbook(&self, name: &str, headers: &[&str], rows: &[Vec<Cell<'_>>]) -> PathBuf {
        self.write_bytes(name, &workbook_bytes(headers, rows))
    }
}
