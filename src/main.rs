use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};

use tabula::data::loader::DatasetCache;
use tabula::pipeline::PipelineOutput;
use tabula::pipeline::format::format_number;
use tabula::state::DashboardState;
use tabula::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Filter a tabular export by category and print a formatted, coloured report.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Dataset file (.csv, .json, .parquet)
    file: PathBuf,

    /// Pipeline config (JSON); built-in defaults otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Category value to keep; repeat for several. None keeps every row.
    #[arg(short, long = "filter", value_name = "VALUE")]
    filters: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(long, default_value = "TVL Chains Dashboard")]
    title: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let cache = DatasetCache::new(None);
    let dataset = cache.get_or_load(&args.file)?;

    let mut state = DashboardState::new(config);
    state.set_dataset(Arc::clone(&dataset))?;
    if !args.filters.is_empty() {
        state.select_labels(&args.filters);
    }

    let output = state.output.as_ref().context("pipeline produced no output")?;
    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(output).context("serialising output")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let available: Vec<String> =
                state.available_values().iter().map(ToString::to_string).collect();
            print_report(&args.title, output, &available)?
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

fn print_report(title: &str, output: &PipelineOutput, available: &[String]) -> Result<()> {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!(
        "Total: {}   Rows: {}   Categories: {}",
        format_number(output.metrics.total),
        output.metrics.row_count,
        output.metrics.distinct_count
    );
    println!();

    println!("{}", table_to_string(output)?);

    if !output.series.is_empty() {
        println!();
        println!("By category:");
        for s in &output.series {
            let name = if s.category.is_empty() {
                "(none)"
            } else {
                s.category.as_str()
            };
            println!(
                "  {} {name}: {} ({} values)",
                s.color,
                format_number(s.total),
                s.points.len()
            );
        }
    }

    let legend = output.color_map.legend_entries();
    if !legend.is_empty() {
        println!();
        println!("Legend:");
        for (label, color) in legend {
            println!("  {color} {label}");
        }
    }

    let shown: Vec<&str> = available
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    if !shown.is_empty() {
        println!();
        println!("Filter values: {}", shown.join(", "));
    }
    Ok(())
}

/// Render the display table, with a trailing row-colour column, via arrow's
/// pretty printer.
fn table_to_string(output: &PipelineOutput) -> Result<String> {
    let table = &output.table;

    let mut fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| Field::new(c, DataType::Utf8, false))
        .collect();
    fields.push(Field::new("row color", DataType::Utf8, true));

    let mut arrays: Vec<ArrayRef> = (0..table.columns.len())
        .map(|i| {
            let values: Vec<&str> = table
                .rows
                .iter()
                .map(|r| r.cells.get(i).map_or("", |c| c.text.as_str()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    let colors: Vec<Option<String>> = table
        .rows
        .iter()
        .map(|r| r.row_color.map(|c| c.to_hex()))
        .collect();
    arrays.push(Arc::new(StringArray::from(colors)));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building report table")?;
    let rendered = arrow::util::pretty::pretty_format_batches(&[batch])
        .context("formatting report table")?;
    Ok(rendered.to_string())
}
