/// Classifies what happened to a cell in the most recent generation.
///
/// The classification is layered on top of the binary alive/dead state and is
/// meant for renderers; [`TransitionKind::is_alive`] recovers the state itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Dead and stays dead.
    #[default]
    Dormant,
    /// Was alive, died of isolation (fewer than 2 alive neighbors).
    Lonely,
    /// Was alive, died of overcrowding (more than 3 alive neighbors).
    Choked,
    /// Alive and stays alive (2 or 3 alive neighbors).
    Living,
    /// Was dead, came to life (exactly 3 alive neighbors).
    Reborn,
}

impl TransitionKind {
    /// Applies the B3/S23 rule to a cell with `alive_neighbors` alive
    /// neighbors in the previous generation.
    pub fn classify(alive_neighbors: usize, alive: bool) -> Self {
        match (alive_neighbors, alive) {
            (0..=1, true) => TransitionKind::Lonely,
            (2..=3, true) => TransitionKind::Living,
            (_, true) => TransitionKind::Choked,
            (3, false) => TransitionKind::Reborn,
            (_, false) => TransitionKind::Dormant,
        }
    }

    /// Whether a cell with this classification is alive in the generation
    /// that produced it.
    pub fn is_alive(self) -> bool {
        matches!(self, TransitionKind::Living | TransitionKind::Reborn)
    }
}

/// State of a single cell as exposed to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    alive: bool,
    pending: TransitionKind,
}

impl Cell {
    /// A cell as it appears before any generation was computed.
    pub fn seeded(alive: bool) -> Self {
        Self {
            alive,
            pending: if alive {
                TransitionKind::Living
            } else {
                TransitionKind::Dormant
            },
        }
    }

    /// Computes the next state of this cell.
    pub fn next(self, alive_neighbors: usize) -> Self {
        let pending = TransitionKind::classify(alive_neighbors, self.alive);
        Self {
            alive: pending.is_alive(),
            pending,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn pending(&self) -> TransitionKind {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransitionKind::*;

    #[test]
    fn test_transition_table() {
        let table = [
            (0, true, false, Lonely),
            (1, true, false, Lonely),
            (0, false, false, Dormant),
            (1, false, false, Dormant),
            (2, true, true, Living),
            (2, false, false, Dormant),
            (3, true, true, Living),
            (3, false, true, Reborn),
        ];
        for (count, alive, next_alive, kind) in table {
            let next = Cell::seeded(alive).next(count);
            assert_eq!(next.pending(), kind, "count {count}, alive {alive}");
            assert_eq!(next.is_alive(), next_alive, "count {count}, alive {alive}");
        }
    }

    #[test]
    fn test_overcrowding() {
        for count in 4..=8 {
            let choked = Cell::seeded(true).next(count);
            assert!(!choked.is_alive());
            assert_eq!(choked.pending(), Choked);

            // already dead cells must stay dead
            let dead = Cell::seeded(false).next(count);
            assert!(!dead.is_alive());
            assert_eq!(dead.pending(), Dormant);
        }
    }

    #[test]
    fn test_out_of_range_counts() {
        assert_eq!(TransitionKind::classify(9, true), Choked);
        assert_eq!(TransitionKind::classify(usize::MAX, false), Dormant);
    }

    #[test]
    fn test_seeded() {
        assert_eq!(Cell::seeded(true).pending(), Living);
        assert_eq!(Cell::seeded(false).pending(), Dormant);
        assert_eq!(Cell::default(), Cell::seeded(false));
    }
}
