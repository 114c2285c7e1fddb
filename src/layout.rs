// Initial layout provider: explicit layouts and seeded random generation

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, BoardError};
use crate::types::Coord;

/// Errors raised while producing a starting board
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("a {rows}x{cols} board has {available} cells but the layout needs {needed}")]
    TooCrowded {
        rows: usize,
        cols: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid layout: {0}")]
    Board(#[from] BoardError),
}

/// Everything needed to construct the starting board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub obstacles: Vec<Coord>,
    pub seeker: Coord,
    pub targets: Vec<Coord>,
    pub pursuers: Vec<Coord>,
}

impl Layout {
    /// Validates the layout and builds the starting board
    pub fn to_board(&self) -> Result<Board, BoardError> {
        Board::new(
            self.rows,
            self.cols,
            &self.obstacles,
            self.seeker,
            &self.targets,
            &self.pursuers,
        )
    }

    /// Random layout where obstacles, the seeker, targets and pursuers all get
    /// distinct cells, so the result always passes `Board::new` validation.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        num_obstacles: usize,
        num_targets: usize,
        num_pursuers: usize,
        rng: &mut R,
    ) -> Result<Layout, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyDimensions { rows, cols }.into());
        }
        let available = rows.saturating_mul(cols);
        let needed = num_obstacles + 1 + num_targets + num_pursuers;
        if needed > available {
            return Err(LayoutError::TooCrowded {
                rows,
                cols,
                needed,
                available,
            });
        }

        let mut cells: Vec<Coord> = (0..rows as i32)
            .flat_map(|row| (0..cols as i32).map(move |col| Coord::new(row, col)))
            .collect();
        cells.shuffle(rng);

        let mut picked = cells.into_iter();
        let obstacles: Vec<Coord> = picked.by_ref().take(num_obstacles).collect();
        let seeker = picked.next().ok_or(LayoutError::TooCrowded {
            rows,
            cols,
            needed,
            available,
        })?;
        let targets: Vec<Coord> = picked.by_ref().take(num_targets).collect();
        let pursuers: Vec<Coord> = picked.take(num_pursuers).collect();

        info!(
            "Generated {}x{} layout: {} obstacles, {} targets, {} pursuers",
            rows,
            cols,
            obstacles.len(),
            targets.len(),
            pursuers.len()
        );

        Ok(Layout {
            rows,
            cols,
            obstacles,
            seeker,
            targets,
            pursuers,
        })
    }
}
