use crate::util::{load_pattern, local_time, print_population};
use ahash::AHashMap;
use anyhow::Result;
use clap::Args;
use gol_grid::{Grid, Pattern, Topology, TransitionKind};
use std::{fmt::Write, time::Duration};
use tracing::info;

#[derive(Args, Debug)]
pub(super) struct RunArgs {
    /// Path to the file containing the pattern; a random soup is used if omitted
    pattern: Option<String>,

    /// Number of columns of the field; the pattern is centered in it
    #[arg(short, long, requires = "rows")]
    columns: Option<usize>,

    /// Number of rows of the field; the pattern is centered in it
    #[arg(short, long, requires = "columns")]
    rows: Option<usize>,

    /// Size of the random soup when no pattern is given, as columns and rows
    #[arg(long, num_args = 2, value_names = ["COLUMNS", "ROWS"], default_values_t = [40, 20])]
    soup: Vec<usize>,

    /// Seed of the random soup; seeds from the OS if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Stitch the opposite bounds of the field together
    #[arg(short, long)]
    torus: bool,

    /// The number of generations to compute
    #[arg(short, long, default_value_t = 100)]
    generations: u64,

    /// Delay between two generations, in milliseconds
    #[arg(short, long, default_value_t = 100)]
    interval_ms: u64,

    /// Only print the final generation
    #[arg(short, long)]
    quiet: bool,

    /// Keep running after a generation repeats an earlier one
    #[arg(long)]
    no_cycle_stop: bool,

    /// Path to the file where the final generation will be saved
    #[arg(short, long)]
    output: Option<String>,

    /// Count population of the final generation
    #[arg(short, long)]
    population: bool,
}

pub(super) fn run_simulation(args: RunArgs) -> Result<()> {
    let topology = Topology::from_wrapped(args.torus);

    let timer = std::time::Instant::now();
    let pattern = match &args.pattern {
        Some(path) => load_pattern(path)?,
        None => {
            let (columns, rows) = match (args.columns, args.rows) {
                (Some(columns), Some(rows)) => (columns, rows),
                _ => (args.soup[0], args.soup[1]),
            };
            Pattern::random(columns, rows, args.seed)?
        }
    };
    let mut grid = match (args.columns, args.rows) {
        (Some(columns), Some(rows)) => Grid::with_tiling(&pattern, topology, columns, rows)?,
        _ => Grid::from_pattern(&pattern, topology)?,
    };
    info!(
        width = grid.width(),
        height = grid.height(),
        ?topology,
        "loaded pattern in {:.1} secs",
        timer.elapsed().as_secs_f64()
    );

    let timer = std::time::Instant::now();
    let interval = Duration::from_millis(args.interval_ms);
    let mut seen = AHashMap::new();
    seen.insert(grid.hash(), grid.generation());
    if !args.quiet {
        render(&grid);
    }
    for _ in 0..args.generations {
        if !args.quiet && !interval.is_zero() {
            std::thread::sleep(interval);
        }
        grid.compute();
        if !args.quiet {
            render(&grid);
        }
        if let Some(first) = seen.insert(grid.hash(), grid.generation()) {
            info!(
                "generation {} repeats generation {} (period {})",
                grid.generation(),
                first,
                grid.generation() - first
            );
            if !args.no_cycle_stop {
                break;
            }
        }
    }
    info!(
        "computed {} generations in {:.1} secs",
        grid.generation(),
        timer.elapsed().as_secs_f64()
    );

    if args.quiet {
        render(&grid);
    }
    if args.population {
        print_population(grid.population())?;
    }
    if let Some(output) = &args.output {
        grid.current_state().to_file(output)?;
        info!(%output, "saved final generation");
    }
    Ok(())
}

fn glyph(kind: TransitionKind) -> char {
    match kind {
        TransitionKind::Dormant => '.',
        TransitionKind::Lonely => '-',
        TransitionKind::Choked => 'x',
        TransitionKind::Living => 'O',
        TransitionKind::Reborn => '+',
    }
}

fn render(grid: &Grid) {
    let mut frame = String::with_capacity((grid.width() + 1) * (grid.height() + 1));
    // `write!` into a `String` cannot fail
    let _ = writeln!(
        frame,
        "generation {} at {}",
        grid.generation(),
        local_time()
    );
    for row in grid.rows() {
        frame.extend(row.iter().map(|cell| glyph(cell.pending())));
        frame.push('\n');
    }
    print!("{frame}");
}
