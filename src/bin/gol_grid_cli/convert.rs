use crate::util::load_pattern;
use anyhow::Result;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub(super) struct ConvertArgs {
    /// Path to the file containing the pattern; supports .cells, .rle, .cells.gz and .rle.gz formats
    pattern: String,

    /// Path to the file where the converted pattern will be saved; the format is chosen by extension
    #[arg(short, long)]
    output: String,

    /// Pad the pattern with dead cells to this many columns
    #[arg(short, long, requires = "rows")]
    columns: Option<usize>,

    /// Pad the pattern with dead cells to this many rows
    #[arg(short, long, requires = "columns")]
    rows: Option<usize>,

    /// Pad the shorter side of the pattern to make it square
    #[arg(short, long, conflicts_with = "columns")]
    square: bool,
}

pub(super) fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut pattern = load_pattern(&args.pattern)?;
    if let (Some(columns), Some(rows)) = (args.columns, args.rows) {
        pattern = pattern.fit(columns, rows)?;
    } else if args.square {
        pattern = pattern.squared();
    }
    pattern.to_file(&args.output)?;
    info!(
        width = pattern.width(),
        height = pattern.height(),
        output = %args.output,
        "saved pattern"
    );
    Ok(())
}
