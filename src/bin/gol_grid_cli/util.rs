use anyhow::{anyhow, Result};
use chrono::Local;
use gol_grid::Pattern;
use num_format::{CustomFormat, Grouping, ToFormattedString};

/// Reads a pattern and rejects missing or empty sources, which would
/// otherwise surface as an empty grid.
pub(super) fn load_pattern(path: &str) -> Result<Pattern> {
    let pattern = Pattern::from_file(path)?;
    if pattern.is_empty() {
        return Err(anyhow!("Pattern {} is missing or empty", path));
    }
    Ok(pattern)
}

pub(super) fn format_count(count: usize) -> Result<String> {
    let fmt = CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator("_")
        .build()?;
    Ok(count.to_formatted_string(&fmt))
}

pub(super) fn print_population(population: usize) -> Result<()> {
    println!("Population: {}", format_count(population)?);
    Ok(())
}

pub(super) fn local_time() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}
