/// Describes how the field boundaries behave when resolving neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Cells beyond the edges do not exist.
    #[default]
    Bounded,
    /// Opposite bounds of the field are stitched together.
    Torus,
}

impl Topology {
    /// Maps the conventional "wrapped" flag onto a topology.
    pub fn from_wrapped(wrapped: bool) -> Self {
        if wrapped {
            Topology::Torus
        } else {
            Topology::Bounded
        }
    }

    pub fn is_wrapped(self) -> bool {
        self == Topology::Torus
    }
}

/// Returns the Moore neighborhood of the cell at `(col, row)` in a
/// `width` x `height` field.
///
/// Candidates are enumerated with the row offset `-1..=1` in the outer loop and
/// the column offset `-1..=1` in the inner loop, so the order is stable.
///
/// On a [`Topology::Torus`] every coordinate is taken modulo the field size.
/// For fields narrower or shorter than 3 cells the wrapped candidates start to
/// coincide; each distinct coordinate is listed once and the cell itself is
/// never listed. Consequently a 2x2 torus gives every cell 3 neighbors and a
/// 1x1 torus gives none.
pub fn moore_neighborhood(
    col: usize,
    row: usize,
    width: usize,
    height: usize,
    topology: Topology,
) -> Vec<(usize, usize)> {
    debug_assert!(col < width && row < height);
    let mut neighbors = Vec::with_capacity(8);
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let x = col as isize + dx;
            let y = row as isize + dy;
            let candidate = match topology {
                Topology::Bounded => {
                    if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
                        continue;
                    }
                    (x as usize, y as usize)
                }
                Topology::Torus => (
                    x.rem_euclid(width as isize) as usize,
                    y.rem_euclid(height as isize) as usize,
                ),
            };
            if candidate == (col, row) || neighbors.contains(&candidate) {
                continue;
            }
            neighbors.push(candidate);
        }
    }
    neighbors
}
