use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client_report::export::{export_pdf_to_file, report_filename};
use client_report::{config, RecordSet, ReportError, ReportRenderer, StyleProfile};

#[derive(Parser, Debug)]
#[command(
    name = "client-report",
    version,
    about = "Client background reports from exported warehouse records."
)]
struct Args {
    /// JSON file holding one record or an array of records.
    #[arg(short, long)]
    input: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the search-result summaries, one row per record.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the report preview for one record.
    Preview {
        #[arg(short, long, default_value_t = 0)]
        row: usize,
        /// Preset name (standard, branded, raw-flags) or a JSON profile path.
        #[arg(short, long, default_value = "standard")]
        profile: String,
        /// Print the preview model as JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },
    /// Render the PDF for one record and write it to disk.
    Export {
        #[arg(short, long, default_value_t = 0)]
        row: usize,
        #[arg(short, long, default_value = "standard")]
        profile: String,
        /// Output directory; defaults to the application exports directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Preset or file path first, then `<profiles_dir>/<name>.json`.
fn load_profile(name: &str) -> anyhow::Result<StyleProfile> {
    match StyleProfile::resolve(name) {
        Err(ReportError::UnknownProfile(_)) => {
            let path = config::profiles_dir().join(format!("{name}.json"));
            if path.is_file() {
                StyleProfile::load(&path)
                    .with_context(|| format!("Cannot load style profile {}", path.display()))
            } else {
                anyhow::bail!("Unknown style profile {name:?}")
            }
        }
        other => other.with_context(|| format!("Cannot load style profile {name:?}")),
    }
}

fn main() -> anyhow::Result<()> {
    client_report::init_tracing();
    let args = Args::parse();

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read {}", args.input.display()))?;
    let records = RecordSet::from_json_str(&data)
        .with_context(|| format!("Cannot parse records in {}", args.input.display()))?;
    tracing::info!(app = config::APP_NAME, version = config::APP_VERSION, records = records.len(), "Records loaded");

    match args.command {
        Command::List { json } => {
            let summaries = records.summaries();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("#\tClient\tNurse\tDate\tHousing\tImpairment\tMMH");
                for (i, s) in summaries.iter().enumerate() {
                    println!(
                        "{i}\t{}\t{}\t{}\t{}\t{}\t{}",
                        s.client_name, s.nurse_name, s.date, s.housing_risk, s.impairment_risk, s.mmh_risk
                    );
                }
            }
        }
        Command::Preview { row, profile, json } => {
            let record = records.select(row)?;
            let renderer = ReportRenderer::new(load_profile(&profile)?);
            let preview = renderer.preview(record);
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                print!("{}", preview.to_markdown());
            }
        }
        Command::Export { row, profile, out } => {
            let record = records.select(row)?;
            let renderer = ReportRenderer::new(load_profile(&profile)?);
            let bytes = renderer.pdf(record).context("PDF rendering failed")?;
            let dir = out.unwrap_or_else(config::exports_dir);
            let filename = report_filename(record, chrono::Local::now().date_naive());
            let path = export_pdf_to_file(&bytes, &filename, &dir)
                .with_context(|| format!("Cannot write report into {}", dir.display()))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
