use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use critical_parts::aggregate::Dashboard;
use critical_parts::data::{RawTable, Record};
use critical_parts::filter::{self, FilterState};
use critical_parts::normalize::normalize;
use critical_parts::schema::SchemaMapper;

fn generate_records(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            let urgency = match i % 3 {
                0 => "Routine",
                1 => "Critical",
                _ => "AOG",
            };
            Record {
                pn: format!("PN{:05}", i % 2_000),
                description: format!("Part {i}"),
                quantite_moyenne: (i % 40) as f64 * 0.5,
                nombre_visites: (i % 7) as i64,
                percent_aog: (i % 11) as f64 / 100.0,
                percent_nrc: (i % 13) as f64 / 100.0,
                score_criticite: (i % 100) as f64,
                ac_reg: format!("F-G{:03}", i % 50),
                annee: Some(2018 + (i % 7) as i32),
                urgency: urgency.to_string(),
                ..Record::default()
            }
        })
        .collect()
}

fn generate_table(rows: usize) -> RawTable {
    let mut table = RawTable::new([
        "Réfèrence pièce",
        "Description",
        "Score de criticité",
        "% AOG",
        "% NRC",
        "Année",
        "URGENCY",
    ]);
    for i in 0..rows {
        table.push_row([
            format!("PN{i:05}"),
            format!("Part {i}"),
            format!("{}", i % 100),
            format!("0.{}", i % 10),
            format!("0.{}", i % 7),
            format!("{}.0", 2018 + i % 7),
            "AOG".to_string(),
        ]);
    }
    table
}

fn bench_dashboard(c: &mut Criterion) {
    let records = generate_records(20_000);
    let mut filters = FilterState::default();
    filters.set_pn("pn01");
    filters.set_min_score("40");

    c.bench_function("dashboard_unfiltered_20k", |b| {
        b.iter(|| {
            let subset = filter::apply(&records, &FilterState::default());
            Dashboard::compute(&records, &subset)
        })
    });

    c.bench_function("dashboard_filtered_20k", |b| {
        b.iter(|| {
            let subset = filter::apply(&records, &filters);
            Dashboard::compute(&records, &subset)
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let mapper = SchemaMapper::new();
    c.bench_function("normalize_10k_rows", |b| {
        b.iter_batched(
            || generate_table(10_000),
            |table| normalize(&table, &mapper).expect("normalize"),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_dashboard, bench_normalize);
criterion_main!(benches);
