use anyhow::Result;
use log::info;

use crate::{cli::SchemaArgs, schema::SchemaMapper, table};

pub fn execute(args: &SchemaArgs) -> Result<()> {
    let mapper = SchemaMapper::from_options(args.mapping.as_deref(), args.require_segment)?;
    let (headers, rows) = mapping_rows(&mapper);
    table::print_table(&headers, &rows);
    info!(
        "Listed {} header alias(es); {} field(s) required",
        rows.len(),
        mapper.required_fields().len()
    );
    Ok(())
}

/// One row per recognized header: position, header, canonical field, value
/// type and whether the field is required.
fn mapping_rows(mapper: &SchemaMapper) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["#", "header", "field", "type", "required"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = mapper
        .aliases()
        .enumerate()
        .map(|(idx, (name, field))| {
            vec![
                (idx + 1).to_string(),
                name.to_string(),
                field.to_string(),
                field.kind().to_string(),
                if mapper.is_required(field) { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    (headers, rows)
}
