use crate::util::{format_count, load_pattern, print_population};
use anyhow::Result;
use clap::Args;
use gol_grid::{Grid, Topology};

#[derive(Args, Debug)]
pub(super) struct StatsArgs {
    /// Path to the file containing the pattern; supports .cells, .rle, .cells.gz and .rle.gz formats
    pattern: String,
}

pub(super) fn run_stats(args: StatsArgs) -> Result<()> {
    let timer = std::time::Instant::now();
    let pattern = load_pattern(&args.pattern)?;
    let grid = Grid::from_pattern(&pattern, Topology::Bounded)?;
    println!(
        "Size: {} x {}",
        format_count(grid.width())?,
        format_count(grid.height())?
    );
    println!("Hash: 0x{:016x}", grid.hash());
    print_population(grid.population())?;
    let cells = grid.width() * grid.height();
    println!(
        "Density: {:.2}%",
        grid.population() as f64 * 100.0 / cells as f64
    );
    println!(
        "Computed stats in {:.1} secs",
        timer.elapsed().as_secs_f64()
    );
    Ok(())
}
