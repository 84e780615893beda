use anyhow::Result;
use clap::Parser;
use sheetnorm::{
    config::{LayoutOverrides, Overrides, RunConfig},
    grid::{load_grid, sheet_names},
    process::{normalize::is_malformed, reconstruct_headers},
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Dump the top-left corner of a sheet to locate its category rows.
#[derive(Parser, Debug)]
struct Args {
    input: PathBuf,

    #[arg(long)]
    sheet: Option<String>,

    /// YAML file whose layout is used to resolve headers
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    layout: LayoutOverrides,

    /// Rows to dump
    #[arg(long, default_value_t = 8)]
    rows: usize,

    /// Columns to dump per row
    #[arg(long, default_value_t = 20)]
    cols: usize,

    /// Show resolved headers for this many columns
    #[arg(long, default_value_t = 25)]
    headers: usize,
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let cfg = RunConfig::resolve(
        args.input.clone(),
        args.config.as_deref(),
        Overrides {
            sheet: args.sheet.clone(),
            layout: args.layout.clone(),
            ..Default::default()
        },
    )?;
    let layout = &cfg.layout;

    println!("=== Workbook: {} ===", args.input.display());
    println!("Sheets: {:?}", sheet_names(&args.input)?);

    let grid = load_grid(&args.input, cfg.sheet.as_deref())?;
    println!("Size: {} rows x {} cols", grid.height(), grid.width());
    println!();

    // 1) Non-empty cells of the first rows
    for row in 0..args.rows.min(grid.height()) {
        println!("ROW {}:", row);
        for col in 0..args.cols.min(grid.width()) {
            let cell = grid.get(row, col);
            if cell.is_blank() {
                continue;
            }
            let flag = if layout.is_value_cell(row, col) && is_malformed(cell) {
                "  (non-numeric)"
            } else {
                ""
            };
            println!("  [{:>3}] = {}{}", col, cell, flag);
        }
    }
    println!();

    // 2) Headers as the chosen layout resolves them
    println!("=== Headers ({:?}) ===", layout);
    let headers = reconstruct_headers(&grid, layout);
    for (col, h) in headers.iter().take(args.headers).enumerate() {
        println!(
            "Col {:>3}: year={:<8} sex={:<12} age={:<16} disability={}",
            col,
            h.year.as_deref().unwrap_or("-"),
            h.sex.as_deref().unwrap_or("-"),
            h.age_band.as_deref().unwrap_or("-"),
            h.disability_type.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
