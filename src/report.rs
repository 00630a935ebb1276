use std::fmt::Write as _;

use anyhow::{Context, Result};
use log::info;

use crate::{aggregate::Dashboard, cli::DashboardArgs, session::Session, table};

pub fn execute(args: &DashboardArgs) -> Result<()> {
    let session = Session::from_args(&args.source, &args.filters)?;
    let dashboard = session.dashboard();
    if args.json {
        let json =
            serde_json::to_string_pretty(&dashboard).context("Serializing dashboard to JSON")?;
        println!("{json}");
    } else {
        print!("{}", render_dashboard(&dashboard));
    }
    info!(
        "Dashboard computed over {} of {} record(s)",
        session.working_subset().len(),
        session.records().len()
    );
    Ok(())
}

/// Text rendering of every dashboard section, one table per chart.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let kpis = &dashboard.kpis;

    section(
        &mut output,
        "Indicateurs clés",
        &["Indicateur", "Valeur"],
        vec![
            vec![
                "Références suivies".to_string(),
                kpis.total_references_tracked.to_string(),
            ],
            vec![
                "Score de criticité moyen".to_string(),
                kpis.avg_score_criticite.to_string(),
            ],
            vec!["% AOG moyen".to_string(), kpis.avg_percent_aog.to_string()],
            vec!["% NRC moyen".to_string(), kpis.avg_percent_nrc.to_string()],
        ],
    );

    section(
        &mut output,
        "Top 10 pièces critiques",
        &["PN", "Score"],
        dashboard
            .top_critical_parts
            .iter()
            .map(|part| vec![part.name.clone(), part.score.to_string()])
            .collect(),
    );

    section(
        &mut output,
        "% AOG / % NRC par pièce",
        &["PN", "% AOG", "% NRC"],
        dashboard
            .aog_nrc_by_part
            .iter()
            .map(|point| {
                vec![
                    point.name.clone(),
                    point.percent_aog.to_string(),
                    point.percent_nrc.to_string(),
                ]
            })
            .collect(),
    );

    section(
        &mut output,
        "Répartition des urgences",
        &["Urgence", "Nombre"],
        dashboard
            .urgency_distribution
            .iter()
            .map(|slice| vec![slice.name.clone(), slice.value.to_string()])
            .collect(),
    );

    section(
        &mut output,
        "Évolution par année",
        &["Année", "Score Moyen", "Quantité Totale"],
        dashboard
            .evolution_by_year
            .iter()
            .map(|point| {
                vec![
                    point.name.clone(),
                    point.avg_score.to_string(),
                    point.total_quantity.to_string(),
                ]
            })
            .collect(),
    );

    let choices = &dashboard.choices;
    section(
        &mut output,
        "Filtres disponibles",
        &["Filtre", "Valeurs"],
        vec![
            vec!["PN".to_string(), choices.pns.join(", ")],
            vec!["URGENCY".to_string(), choices.urgencies.join(", ")],
            vec!["A/C REG".to_string(), choices.ac_regs.join(", ")],
            vec!["Année".to_string(), choices.years.join(", ")],
        ],
    );

    output
}

fn section(output: &mut String, title: &str, headers: &[&str], rows: Vec<Vec<String>>) {
    if !output.is_empty() {
        output.push('\n');
    }
    let _ = writeln!(output, "== {title} ==");
    if rows.is_empty() {
        let _ = writeln!(output, "(aucune donnée)");
        return;
    }
    let headers = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    output.push_str(&table::render_table(&headers, &rows));
}
