use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{export::DEFAULT_EXPORT_FILE, filter::FilterState, session::DEFAULT_DATASET_PATH};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore critical-parts maintenance spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show KPIs, filter choices and chart series for the filtered records
    Dashboard(DashboardArgs),
    /// Display the filtered records in a formatted table
    Preview(PreviewArgs),
    /// Write the filtered records to a CSV file
    Export(ExportArgs),
    /// List recognized spreadsheet headers and their canonical fields
    Schema(SchemaArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Workbook loaded at startup (sample data is used if it is missing)
    #[arg(short = 'i', long = "input", default_value = DEFAULT_DATASET_PATH)]
    pub input: PathBuf,
    /// Workbook uploaded in place of the startup dataset ('-' reads stdin)
    #[arg(short = 'u', long = "upload")]
    pub upload: Option<PathBuf>,
    /// File name reported for the upload (needed when it is read from stdin)
    #[arg(long = "upload-name", requires = "upload")]
    pub upload_name: Option<String>,
    /// YAML profile declaring extra header aliases
    #[arg(long = "mapping")]
    pub mapping: Option<PathBuf>,
    /// Reject spreadsheets without a Segment column
    #[arg(long = "require-segment")]
    pub require_segment: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive part number substring
    #[arg(long = "pn")]
    pub pn: Option<String>,
    /// Exact urgency value
    #[arg(long = "urgency")]
    pub urgency: Option<String>,
    /// Exact aircraft registration
    #[arg(long = "ac-reg")]
    pub ac_reg: Option<String>,
    /// Minimum criticality score (values <= 0 disable the filter)
    #[arg(long = "min-score")]
    pub min_score: Option<String>,
    /// Exact year
    #[arg(long = "annee")]
    pub annee: Option<String>,
}

impl FilterArgs {
    pub fn apply_to(&self, filters: &mut FilterState) {
        if let Some(value) = &self.pn {
            filters.set_pn(value);
        }
        if let Some(value) = &self.urgency {
            filters.set_urgency(value);
        }
        if let Some(value) = &self.ac_reg {
            filters.set_ac_reg(value);
        }
        if let Some(value) = &self.min_score {
            filters.set_min_score(value);
        }
        if let Some(value) = &self.annee {
            filters.set_annee(value);
        }
    }
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Emit the dashboard as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Number of rows to display (0 shows every row)
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Destination CSV file ('-' writes to stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// YAML profile declaring extra header aliases
    #[arg(long = "mapping")]
    pub mapping: Option<PathBuf>,
    /// Mark the Segment column as required
    #[arg(long = "require-segment")]
    pub require_segment: bool,
}
