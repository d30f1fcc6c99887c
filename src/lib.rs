#![warn(clippy::all)]

mod cell;
mod grid;
mod pattern;
mod topology;

pub use cell::{Cell, TransitionKind};
pub use grid::Grid;
pub use pattern::{Pattern, PatternFormat, ALIVE, DEAD};
pub use topology::{moore_neighborhood, Topology};

pub const VERSION: &str = "0.1.0";
