// Board model: fixed terrain plus the positions that change from turn to turn
//
// A Board is a value. `apply` always returns a fresh Board and leaves its input
// untouched, so the search can fan out many hypothetical futures from one
// ancestor without any backtracking bookkeeping. The static terrain (grid size,
// obstacles, target cells) lives behind an Arc and is shared by every Board
// derived from the same game.

use std::fmt;
use std::sync::Arc;

use crate::types::{Coord, Direction, Mover, MoverKind};

/// Names the entity that made a layout invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Seeker,
    Pursuer(usize),
    Target(usize),
    Obstacle(usize),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Seeker => write!(f, "seeker"),
            Entity::Pursuer(i) => write!(f, "pursuer #{}", i),
            Entity::Target(i) => write!(f, "target #{}", i),
            Entity::Obstacle(i) => write!(f, "obstacle #{}", i),
        }
    }
}

/// Invalid board configuration, reported by `Board::new`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board dimensions must be at least 1x1, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },

    #[error("board dimensions {rows}x{cols} are too large")]
    DimensionsTooLarge { rows: usize, cols: usize },

    #[error("{entity} at {coord} is outside the {rows}x{cols} board")]
    OutOfBounds {
        entity: Entity,
        coord: Coord,
        rows: usize,
        cols: usize,
    },

    #[error("{entity} at {coord} is placed on an obstacle")]
    OnObstacle { entity: Entity, coord: Coord },

    #[error("{entity} at {coord} duplicates another target cell")]
    DuplicateTarget { entity: Entity, coord: Coord },
}

/// Static terrain of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terrain {
    Empty,
    Obstacle,
    Target(usize),
}

/// What a renderer sees at a cell, ignoring who stands on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Obstacle,
    Target,
    CollectedTarget,
}

#[derive(Debug)]
struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Terrain>,
    obstacles: Vec<Coord>,
    targets: Vec<Coord>,
}

impl Grid {
    fn in_bounds(&self, coord: &Coord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// Callers must check `in_bounds` first
    fn terrain(&self, coord: &Coord) -> Terrain {
        self.cells[coord.row as usize * self.cols + coord.col as usize]
    }
}

/// One immutable game state
#[derive(Debug, Clone)]
pub struct Board {
    grid: Arc<Grid>,
    seeker: Coord,
    pursuers: Vec<Coord>,
    collected: Vec<bool>,
    targets_collected: usize,
}

impl Board {
    /// Builds the starting board, rejecting any layout that breaks the board invariants.
    ///
    /// A target under the seeker's start cell counts as collected immediately.
    pub fn new(
        rows: usize,
        cols: usize,
        obstacles: &[Coord],
        seeker: Coord,
        targets: &[Coord],
        pursuers: &[Coord],
    ) -> Result<Board, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyDimensions { rows, cols });
        }
        let cell_count = rows
            .checked_mul(cols)
            .filter(|_| rows <= i32::MAX as usize && cols <= i32::MAX as usize)
            .ok_or(BoardError::DimensionsTooLarge { rows, cols })?;

        let mut grid = Grid {
            rows,
            cols,
            cells: vec![Terrain::Empty; cell_count],
            obstacles: obstacles.to_vec(),
            targets: targets.to_vec(),
        };

        let check_bounds = |grid: &Grid, entity: Entity, coord: Coord| {
            if grid.in_bounds(&coord) {
                Ok(())
            } else {
                Err(BoardError::OutOfBounds {
                    entity,
                    coord,
                    rows,
                    cols,
                })
            }
        };

        for (i, &coord) in obstacles.iter().enumerate() {
            check_bounds(&grid, Entity::Obstacle(i), coord)?;
            let idx = coord.row as usize * cols + coord.col as usize;
            grid.cells[idx] = Terrain::Obstacle;
        }

        for (i, &coord) in targets.iter().enumerate() {
            check_bounds(&grid, Entity::Target(i), coord)?;
            let entity = Entity::Target(i);
            match grid.terrain(&coord) {
                Terrain::Obstacle => return Err(BoardError::OnObstacle { entity, coord }),
                Terrain::Target(_) => return Err(BoardError::DuplicateTarget { entity, coord }),
                Terrain::Empty => {
                    let idx = coord.row as usize * cols + coord.col as usize;
                    grid.cells[idx] = Terrain::Target(i);
                }
            }
        }

        let mut placed = vec![(Entity::Seeker, seeker)];
        placed.extend(
            pursuers
                .iter()
                .enumerate()
                .map(|(i, &coord)| (Entity::Pursuer(i), coord)),
        );
        for (entity, coord) in placed {
            check_bounds(&grid, entity, coord)?;
            if grid.terrain(&coord) == Terrain::Obstacle {
                return Err(BoardError::OnObstacle { entity, coord });
            }
        }

        let mut board = Board {
            grid: Arc::new(grid),
            seeker,
            pursuers: pursuers.to_vec(),
            collected: vec![false; targets.len()],
            targets_collected: 0,
        };
        board.collect_at_seeker();
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn obstacles(&self) -> &[Coord] {
        &self.grid.obstacles
    }

    pub fn targets(&self) -> &[Coord] {
        &self.grid.targets
    }

    pub fn seeker(&self) -> Coord {
        self.seeker
    }

    /// Pursuer positions in their stable order
    pub fn pursuers(&self) -> &[Coord] {
        &self.pursuers
    }

    pub fn targets_collected(&self) -> usize {
        self.targets_collected
    }

    pub fn total_targets(&self) -> usize {
        self.grid.targets.len()
    }

    /// Whether target `index` (in `targets()` order) has been visited by the seeker
    pub fn is_collected(&self, index: usize) -> bool {
        self.collected.get(index).copied().unwrap_or(false)
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        self.grid.in_bounds(coord)
    }

    /// Terrain and collection status of a cell, `None` when out of bounds
    pub fn cell(&self, coord: &Coord) -> Option<CellKind> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(match self.grid.terrain(coord) {
            Terrain::Empty => CellKind::Empty,
            Terrain::Obstacle => CellKind::Obstacle,
            Terrain::Target(i) if self.collected[i] => CellKind::CollectedTarget,
            Terrain::Target(_) => CellKind::Target,
        })
    }

    /// Whether `kind` may step onto `coord`.
    ///
    /// The seeker may enter any in-bounds non-obstacle cell. Pursuers are also kept
    /// off uncollected targets; they may enter the seeker's cell (a capture) and may
    /// share cells with each other.
    pub fn can_enter(&self, coord: &Coord, kind: MoverKind) -> bool {
        match (self.cell(coord), kind) {
            (None, _) | (Some(CellKind::Obstacle), _) => false,
            (Some(CellKind::Target), MoverKind::Pursuer) => false,
            _ => true,
        }
    }

    /// Generates the legal moves from `position` in Up, Down, Left, Right order
    pub fn legal_moves(&self, position: Coord, kind: MoverKind) -> Vec<Direction> {
        Direction::all()
            .iter()
            .filter(|dir| self.can_enter(&dir.apply(&position), kind))
            .copied()
            .collect()
    }

    /// Legal moves of a specific mover at its current position
    pub fn moves_for(&self, mover: Mover) -> Vec<Direction> {
        match self.position_of(mover) {
            Some(position) => self.legal_moves(position, mover.kind()),
            None => Vec::new(),
        }
    }

    pub fn position_of(&self, mover: Mover) -> Option<Coord> {
        match mover {
            Mover::Seeker => Some(self.seeker),
            Mover::Pursuer(i) => self.pursuers.get(i).copied(),
        }
    }

    /// Returns the board after `mover` steps in `direction`.
    ///
    /// A seeker stepping onto an uncollected target collects it. A move that is
    /// not in `moves_for(mover)`, including one for an unknown pursuer index,
    /// yields an unchanged copy.
    pub fn apply(&self, mover: Mover, direction: Direction) -> Board {
        let mut next = self.clone();
        let dest = match self.position_of(mover) {
            Some(position) => direction.apply(&position),
            None => return next,
        };
        if !self.can_enter(&dest, mover.kind()) {
            return next;
        }
        match mover {
            Mover::Seeker => {
                next.seeker = dest;
                next.collect_at_seeker();
            }
            Mover::Pursuer(i) => next.pursuers[i] = dest,
        }
        next
    }

    fn collect_at_seeker(&mut self) {
        if let Terrain::Target(i) = self.grid.terrain(&self.seeker) {
            if !self.collected[i] {
                self.collected[i] = true;
                self.targets_collected += 1;
            }
        }
    }

    pub fn is_won(&self) -> bool {
        self.targets_collected == self.total_targets()
    }

    /// Whether any pursuer shares the seeker's cell
    pub fn is_lost(&self) -> bool {
        self.pursuers.contains(&self.seeker)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_won() || self.is_lost()
    }

    /// Value the seeker maximizes and the pursuers minimize
    pub fn score(&self) -> i32 {
        self.targets_collected as i32
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() as i32 {
            let line: Vec<String> = (0..self.cols() as i32)
                .map(|col| {
                    let coord = Coord::new(row, col);
                    let pursuer_here = self.pursuers.contains(&coord);
                    let symbol = if coord == self.seeker {
                        if pursuer_here {
                            '!'
                        } else {
                            'S'
                        }
                    } else if pursuer_here {
                        'X'
                    } else {
                        match self.cell(&coord) {
                            Some(CellKind::Obstacle) => '#',
                            Some(CellKind::Target) => 'T',
                            Some(CellKind::CollectedTarget) => 'o',
                            _ => '.',
                        }
                    };
                    symbol.to_string()
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        write!(
            f,
            "Score: {}/{}",
            self.targets_collected,
            self.total_targets()
        )
    }
}
