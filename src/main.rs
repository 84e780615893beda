use anyhow::{Context, Result};
use clap::Parser;
use sheetnorm::{
    config::{LayoutOverrides, Overrides, RunConfig},
    run_pipeline,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Normalize a stacked-header statistics sheet into CSV + SQL inserts.
#[derive(Parser, Debug)]
#[command(name = "sheetnorm", version)]
struct Args {
    /// Workbook to read (.xlsx, .xls, .ods)
    input: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// YAML file with layout / output settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Base name of the output files
    #[arg(long)]
    stem: Option<String>,

    /// Destination table for the SQL script
    #[arg(long)]
    table: Option<String>,

    #[command(flatten)]
    layout: LayoutOverrides,

    /// Also write a Parquet file
    #[arg(long)]
    parquet: bool,

    /// Also write `<stem>.summary.json`
    #[arg(long)]
    summary_json: bool,
}

impl Args {
    fn resolve(self) -> Result<RunConfig> {
        let overrides = Overrides {
            sheet: self.sheet,
            table: self.table,
            out_dir: self.out_dir,
            stem: self.stem,
            parquet: self.parquet,
            summary_json: self.summary_json,
            layout: self.layout,
        };
        RunConfig::resolve(self.input, self.config.as_deref(), overrides)
            .context("invalid configuration")
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) resolve config ───────────────────────────────────────────
    let cfg = Args::parse().resolve()?;
    info!(
        input = %cfg.input.display(),
        out_dir = %cfg.out_dir.display(),
        table = %cfg.table,
        layout = ?cfg.layout,
        "startup"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    match run_pipeline(&cfg) {
        Ok(summary) => {
            info!(records = summary.total_records, "all done");
            Ok(())
        }
        Err(e) => {
            error!("run failed: {:#}", e);
            Err(e)
        }
    }
}
