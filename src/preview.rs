use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, schema::Field, session::Session, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let session = Session::from_args(&args.source, &args.filters)?;
    let subset = session.working_subset();
    let limit = if args.rows == 0 { subset.len() } else { args.rows };

    let headers = Field::ALL
        .iter()
        .map(|field| field.as_str().to_string())
        .collect::<Vec<_>>();
    let rows = subset
        .iter()
        .take(limit)
        .map(|record| {
            Field::ALL
                .iter()
                .map(|field| record.display_value(*field))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    table::print_table(&headers, &rows);
    info!(
        "Displayed {} of {} filtered record(s) ({} loaded)",
        rows.len(),
        subset.len(),
        session.records().len()
    );
    Ok(())
}
