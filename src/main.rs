mod document;
mod input;
mod layout;
mod model;
mod pipeline;
mod report;
mod template;
mod tracing;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::input::load_input_dir;
use crate::layout::CoordinateTable;
use crate::model::Metric;
use crate::pipeline::{LogProgress, PipelineInput, run_pipeline};
use crate::report::{RunSummary, SheetSummary, output_paths, write_notices, write_xlsx};
use crate::template::TemplateSet;

#[derive(Debug, Parser)]
#[command(name = "aura-report", version, about = "Merge per-channel measurement tables into a templated xlsx report")]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the report for one experiment folder
    Run(RunConfig),
    /// Write the bundled template assets as JSON
    ExportTemplates {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct RunConfig {
    /// Folder with `<sample>_<channel>.csv` tables and Analysis_Settings.txt
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Experiment name; outputs are `<out>/<name>.xlsx` and `<out>/<name>_notices.json`
    #[arg(long)]
    name: String,
    #[arg(long, value_enum, default_value_t = Metric::Count)]
    metric: Metric,
    /// Settings file to use instead of the one inside the input folder
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Folder of template assets replacing the bundled set
    #[arg(long)]
    templates: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    crate::tracing::init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Run(config) => run_report(&config),
        Command::ExportTemplates { out } => export_templates(&out),
    }
}

fn run_report(config: &RunConfig) -> Result<(), String> {
    fs::create_dir_all(&config.out)
        .map_err(|e| format!("cannot create {}: {e}", config.out.display()))?;

    let coords = CoordinateTable::builtin();
    coords.validate().map_err(|e| e.to_string())?;
    let templates = load_templates(config.templates.as_deref())?;
    templates.validate(&coords).map_err(|e| e.to_string())?;

    let bundle =
        load_input_dir(&config.input, config.settings.as_deref()).map_err(|e| e.to_string())?;
    crate::info!(
        "{} tables across {} samples in {} (settings {})",
        bundle.samples.n_tables(),
        bundle.samples.len(),
        bundle.input_dir.display(),
        bundle.settings_path.display()
    );
    let input = PipelineInput {
        samples: &bundle.samples,
        channel_order: &bundle.channel_order,
        metric: config.metric,
        templates: &templates,
        coords: &coords,
    };
    let mut output = run_pipeline(&input, &mut LogProgress).map_err(|e| e.to_string())?;

    if let Some(message) = output
        .notices
        .unknown_channel_message(&bundle.channel_order.names())
    {
        crate::warn!("{}", message);
    }
    let mut file_issues = bundle.file_issues.clone();
    file_issues.append(&mut output.notices.file_issues);
    output.notices.file_issues = file_issues;

    crate::debug!("sheets: {}", output.document.sheet_names().join(", "));
    if let Some(span) = output.summary_copositivity {
        crate::debug!(
            "summary co-positivity in columns {}..={}",
            span.start,
            span.end
        );
    }
    if output.notices.is_empty() {
        crate::info!("no notices for this run");
    }

    let (xlsx_path, notices_path) = output_paths(&config.out, &config.name);
    write_xlsx(&output.document, &xlsx_path).map_err(|e| e.to_string())?;

    let summary = RunSummary {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        experiment: &config.name,
        metric: config.metric,
        input_files: bundle.n_csv_files,
        sheets: output
            .sheets
            .iter()
            .map(|s| SheetSummary {
                sample: s.sample.clone(),
                sheet: s.sheet_name.clone(),
                channels: s.n_channels,
                copositivity: s.copositivity.is_some(),
            })
            .collect(),
        notices: &output.notices,
    };
    write_notices(&notices_path, &summary).map_err(|e| e.to_string())?;

    crate::info!(
        "{} sample sheets written, {} samples skipped",
        output.sheets.len(),
        output.notices.skipped_samples.len()
    );
    Ok(())
}

fn load_templates(dir: Option<&Path>) -> Result<TemplateSet, String> {
    match dir {
        Some(dir) => {
            let set = TemplateSet::load_dir(dir).map_err(|e| e.to_string())?;
            crate::info!("loaded {} template assets from {}", set.len(), dir.display());
            Ok(set)
        }
        None => TemplateSet::builtin().map_err(|e| e.to_string()),
    }
}

fn export_templates(out: &Path) -> Result<(), String> {
    let written = TemplateSet::builtin()
        .and_then(|set| set.export_dir(out))
        .map_err(|e| e.to_string())?;
    crate::info!("exported {} template assets to {}", written.len(), out.display());
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
