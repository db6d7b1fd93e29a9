use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pdf_table_xlsx::{
    ExtractOptions, ExtractionReport, PageSelection, PdfDocument, convert_pdf_to_xlsx,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2xlsx",
    version,
    about = "Extract tables from text PDFs into an Excel workbook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the number of pages in the PDF.
    Pages(PagesArgs),
    /// Extract tables and write them to an .xlsx workbook.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct PagesArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output workbook path.
    #[arg(short, long, default_value = pdf_table_xlsx::XLSX_FILE_NAME)]
    output: PathBuf,

    /// Page selection like 1-3,5. Defaults to every page.
    #[arg(long)]
    pages: Option<String>,

    /// Write one sheet per page instead of a single Combined sheet.
    #[arg(long)]
    per_page: bool,

    /// Minimum rows (header included) for a grid to count as a table.
    #[arg(long, default_value_t = 2)]
    min_rows: usize,

    /// Minimum dominant column count for a grid to count as a table.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// List every skipped or failed page.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    Ok(ExtractOptions {
        pages,
        min_rows: args.min_rows,
        min_cols: args.min_cols,
        combine: !args.per_page,
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    let summary = report.summary;
    eprintln!(
        "extracted {} table(s) from {} page(s): {} row(s), up to {} column(s)",
        summary.table_count, report.page_count, summary.total_rows, summary.max_columns
    );

    let failures = report
        .issues
        .iter()
        .filter(|issue| issue.code.is_failure())
        .count();
    if failures > 0 {
        eprintln!("warning: could not extract {failures} page(s)");
    }
    if verbose {
        for issue in &report.issues {
            eprintln!("  - {issue}");
        }
    }
}

fn run_pages(args: &PagesArgs) -> Result<u32> {
    let document = PdfDocument::from_path(&args.input)
        .with_context(|| format!("failed to open '{}'", args.input.display()))?;
    Ok(document.page_count())
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    convert_pdf_to_xlsx(&args.input, &args.output, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_table_xlsx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pages(args) => match run_pages(&args) {
            Ok(count) => {
                println!("{count}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.written {
                    println!("{}", args.output.display());
                    ExitCode::SUCCESS
                } else {
                    eprintln!("error: no tables found on the selected pages");
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
