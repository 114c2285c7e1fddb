// Adversarial search for the seeker's next move
//
// Minimax with alpha-beta pruning over strictly alternating plies: one seeker
// ply, then one combined pursuers ply in which every pursuer's moves are tried
// as independent single-pursuer alternatives. Modelling the pursuers one at a
// time instead of as a joint move is a known approximation; it weakens the
// opponent model once there are two or more pursuers.
//
// `choose_move` wraps the recursion in iterative deepening. The wall-clock
// budget is checked between iterations, and optionally (`hard_deadline`) inside
// the recursion as well.

use log::{debug, info};
use rayon::prelude::*;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::types::{Direction, Mover};

/// How often the recursion polls the clock when `hard_deadline` is set
const DEADLINE_POLL_INTERVAL: u64 = 1024;

/// Whose ply it is at a node of the search tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Seeker,
    Pursuers,
}

impl Turn {
    fn next(self) -> Turn {
        match self {
            Turn::Seeker => Turn::Pursuers,
            Turn::Pursuers => Turn::Seeker,
        }
    }
}

/// Limits for a single decision
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Deepest iteration to run, in plies
    pub max_depth: u8,
    /// Wall-clock budget for the whole decision
    pub time_budget: Duration,
    /// Also poll the deadline inside an iteration and abandon it when exceeded
    pub hard_deadline: bool,
    /// Search root seeker moves on the rayon pool
    pub parallel_root: bool,
}

impl SearchLimits {
    /// Depth-bounded search with no effective time limit
    pub fn depth(max_depth: u8) -> Self {
        SearchLimits {
            max_depth,
            time_budget: Duration::MAX,
            hard_deadline: false,
            parallel_root: false,
        }
    }

    pub fn depth_and_time(max_depth: u8, time_budget: Duration) -> Self {
        SearchLimits {
            max_depth,
            time_budget,
            hard_deadline: false,
            parallel_root: false,
        }
    }
}

/// Outcome of `choose_move`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the seeker has no legal move or no iteration finished
    pub best_move: Option<Direction>,
    pub best_score: i32,
    /// Deepest iteration that ran to completion, 0 if none did
    pub completed_depth: u8,
    pub nodes: u64,
    pub cutoffs: u64,
    pub elapsed: Duration,
}

/// Recursive alpha-beta searcher; one instance per thread of exploration
#[derive(Debug)]
pub struct Searcher {
    deadline: Option<Instant>,
    aborted: bool,
    pub nodes: u64,
    pub cutoffs: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher {
            deadline: None,
            aborted: false,
            nodes: 0,
            cutoffs: 0,
        }
    }

    /// A searcher that abandons its work once `deadline` passes
    pub fn with_deadline(deadline: Instant) -> Self {
        Searcher {
            deadline: Some(deadline),
            ..Searcher::new()
        }
    }

    /// Whether the last call was cut short by the deadline
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    fn out_of_time(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if self.nodes % DEADLINE_POLL_INTERVAL == 0 && Instant::now() >= deadline {
                self.aborted = true;
            }
        }
        self.aborted
    }

    /// Minimax with alpha-beta pruning.
    ///
    /// Returns the best seeker move at seeker nodes (always `None` at pursuer
    /// nodes) and the node's value. Ties keep the first move in enumeration order.
    /// If the search aborts, the returned value must be discarded.
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        turn: Turn,
    ) -> (Option<Direction>, i32) {
        self.nodes += 1;

        if depth == 0 || board.is_terminal() || self.out_of_time() {
            return (None, board.score());
        }

        match turn {
            Turn::Seeker => {
                let moves = board.moves_for(Mover::Seeker);
                if moves.is_empty() {
                    return (None, board.score());
                }

                let mut best_value = i32::MIN;
                let mut best_move = None;
                for dir in moves {
                    let child = board.apply(Mover::Seeker, dir);
                    let (_, value) = self.minimax(&child, depth - 1, alpha, beta, turn.next());
                    if self.aborted {
                        break;
                    }
                    if value > best_value {
                        best_value = value;
                        best_move = Some(dir);
                    }
                    alpha = alpha.max(best_value);
                    if beta <= alpha {
                        self.cutoffs += 1;
                        break;
                    }
                }

                match best_move {
                    Some(_) => (best_move, best_value),
                    None => (None, board.score()),
                }
            }
            Turn::Pursuers => {
                let mut best_value = i32::MAX;
                let mut any_move = false;

                'pursuers: for index in 0..board.pursuers().len() {
                    let mover = Mover::Pursuer(index);
                    for dir in board.moves_for(mover) {
                        any_move = true;
                        let child = board.apply(mover, dir);
                        let (_, value) =
                            self.minimax(&child, depth - 1, alpha, beta, turn.next());
                        if self.aborted {
                            break 'pursuers;
                        }
                        best_value = best_value.min(value);
                        beta = beta.min(best_value);
                        if beta <= alpha {
                            self.cutoffs += 1;
                            break 'pursuers;
                        }
                    }
                }

                if !any_move {
                    // Boxed-in (or absent) pursuers pass the ply back to the seeker
                    let (_, value) = self.minimax(board, depth - 1, alpha, beta, turn.next());
                    return (None, value);
                }
                if best_value == i32::MAX {
                    // Aborted before the first child returned
                    return (None, board.score());
                }
                (None, best_value)
            }
        }
    }

    /// Root seeker moves searched one by one with a shared window
    fn search_root(&mut self, board: &Board, depth: u8) -> (Option<Direction>, i32) {
        self.minimax(board, depth, i32::MIN, i32::MAX, Turn::Seeker)
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one depth iteration
struct Iteration {
    best_move: Option<Direction>,
    score: i32,
    completed: bool,
    nodes: u64,
    cutoffs: u64,
}

/// Runs one iteration sequentially
fn run_sequential(board: &Board, depth: u8, deadline: Option<Instant>) -> Iteration {
    let mut searcher = match deadline {
        Some(deadline) => Searcher::with_deadline(deadline),
        None => Searcher::new(),
    };
    let (best_move, score) = searcher.search_root(board, depth);
    Iteration {
        best_move,
        score,
        completed: !searcher.aborted(),
        nodes: searcher.nodes,
        cutoffs: searcher.cutoffs,
    }
}

/// Runs one iteration with every root move searched on the rayon pool.
///
/// Each child gets the full window, so the values are exact and picking the
/// first maximum reproduces the sequential result.
fn run_parallel(board: &Board, depth: u8, deadline: Option<Instant>) -> Iteration {
    let moves = board.moves_for(Mover::Seeker);
    if depth == 0 || board.is_terminal() || moves.is_empty() {
        return run_sequential(board, depth, deadline);
    }

    let children: Vec<(Direction, i32, bool, u64, u64)> = moves
        .par_iter()
        .map(|&dir| {
            let mut searcher = match deadline {
                Some(deadline) => Searcher::with_deadline(deadline),
                None => Searcher::new(),
            };
            let child = board.apply(Mover::Seeker, dir);
            let (_, value) =
                searcher.minimax(&child, depth - 1, i32::MIN, i32::MAX, Turn::Pursuers);
            (dir, value, searcher.aborted(), searcher.nodes, searcher.cutoffs)
        })
        .collect();

    let mut iteration = Iteration {
        best_move: None,
        score: board.score(),
        completed: true,
        nodes: 1,
        cutoffs: 0,
    };
    let mut best_value = i32::MIN;
    for (dir, value, aborted, nodes, cutoffs) in children {
        iteration.nodes += nodes;
        iteration.cutoffs += cutoffs;
        if aborted {
            iteration.completed = false;
            continue;
        }
        if value > best_value {
            best_value = value;
            iteration.best_move = Some(dir);
            iteration.score = value;
        }
    }
    iteration
}

/// Folds one iteration into the kept result.
///
/// The first completed iteration is always taken; after that only a strictly
/// higher score replaces the kept move. An abandoned iteration is considered
/// only if it produced a move. Returns `false` once deepening has to stop.
fn merge_iteration(result: &mut SearchResult, iteration: &Iteration, depth: u8) -> bool {
    result.nodes += iteration.nodes;
    result.cutoffs += iteration.cutoffs;
    let have_result = result.completed_depth > 0;

    if iteration.completed {
        if !have_result || iteration.score > result.best_score {
            result.best_move = iteration.best_move;
            result.best_score = iteration.score;
        }
        result.completed_depth = depth;
        debug!(
            "Depth {} complete: move {:?}, score {}, nodes {}",
            depth, iteration.best_move, iteration.score, iteration.nodes
        );
        true
    } else {
        if iteration.best_move.is_some() && (!have_result || iteration.score > result.best_score) {
            result.best_move = iteration.best_move;
            result.best_score = iteration.score;
        }
        debug!("Depth {} abandoned at the deadline", depth);
        false
    }
}

/// Picks the seeker's move by iterative deepening.
///
/// Iterations run at depth 1, 2, ... up to `limits.max_depth`, and no new
/// iteration starts once `limits.time_budget` has elapsed. A later iteration,
/// completed or abandoned, replaces the kept result only when its score is
/// strictly higher, so the move kept is the one from the shallowest iteration
/// that reached the best score. The reported score never decreases as
/// `max_depth` grows.
pub fn choose_move(board: &Board, limits: &SearchLimits) -> SearchResult {
    let start_time = Instant::now();
    let deadline = if limits.hard_deadline {
        start_time.checked_add(limits.time_budget)
    } else {
        None
    };
    let parallel = limits.parallel_root && rayon::current_num_threads() > 1;

    let mut result = SearchResult {
        best_move: None,
        best_score: board.score(),
        completed_depth: 0,
        nodes: 0,
        cutoffs: 0,
        elapsed: Duration::ZERO,
    };

    for depth in 1..=limits.max_depth {
        if start_time.elapsed() >= limits.time_budget {
            debug!("Stopping search: time budget spent before depth {}", depth);
            break;
        }

        let iteration = if parallel {
            run_parallel(board, depth, deadline)
        } else {
            run_sequential(board, depth, deadline)
        };
        if !merge_iteration(&mut result, &iteration, depth) {
            break;
        }
    }

    result.elapsed = start_time.elapsed();
    info!(
        "Search chose {:?} (score: {}, depth: {}, nodes: {}, cutoffs: {}, time: {}ms)",
        result.best_move,
        result.best_score,
        result.completed_depth,
        result.nodes,
        result.cutoffs,
        result.elapsed.as_millis()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    /// Plain minimax over the same tree, without pruning
    fn exhaustive(board: &Board, depth: u8, turn: Turn) -> (Option<Direction>, i32) {
        if depth == 0 || board.is_terminal() {
            return (None, board.score());
        }
        match turn {
            Turn::Seeker => {
                let mut best = (None, i32::MIN);
                for dir in board.moves_for(Mover::Seeker) {
                    let (_, value) =
                        exhaustive(&board.apply(Mover::Seeker, dir), depth - 1, Turn::Pursuers);
                    if value > best.1 {
                        best = (Some(dir), value);
                    }
                }
                if best.0.is_none() {
                    (None, board.score())
                } else {
                    best
                }
            }
            Turn::Pursuers => {
                let mut best = i32::MAX;
                let mut any = false;
                for index in 0..board.pursuers().len() {
                    let mover = Mover::Pursuer(index);
                    for dir in board.moves_for(mover) {
                        any = true;
                        let (_, value) =
                            exhaustive(&board.apply(mover, dir), depth - 1, Turn::Seeker);
                        best = best.min(value);
                    }
                }
                if any {
                    (None, best)
                } else {
                    (None, exhaustive(board, depth - 1, Turn::Seeker).1)
                }
            }
        }
    }

    fn arena() -> Board {
        // . T . . .
        // . # . T .
        // S . . # .
        // . . X . T
        Board::new(
            4,
            5,
            &[Coord::new(1, 1), Coord::new(2, 3)],
            Coord::new(2, 0),
            &[Coord::new(0, 1), Coord::new(1, 3), Coord::new(3, 4)],
            &[Coord::new(3, 2)],
        )
        .unwrap()
    }

    fn two_pursuer_arena() -> Board {
        Board::new(
            4,
            4,
            &[Coord::new(1, 2)],
            Coord::new(1, 1),
            &[Coord::new(0, 0), Coord::new(3, 3), Coord::new(0, 3)],
            &[Coord::new(2, 0), Coord::new(3, 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_pruning_matches_exhaustive_minimax() {
        for board in [arena(), two_pursuer_arena()] {
            for depth in 1..=6 {
                let mut searcher = Searcher::new();
                let pruned = searcher.minimax(&board, depth, i32::MIN, i32::MAX, Turn::Seeker);
                let full = exhaustive(&board, depth, Turn::Seeker);
                assert_eq!(pruned, full, "mismatch at depth {}", depth);
            }
        }
    }

    #[test]
    fn test_pruning_actually_cuts() {
        let mut searcher = Searcher::new();
        searcher.minimax(&arena(), 6, i32::MIN, i32::MAX, Turn::Seeker);
        assert!(searcher.cutoffs > 0);
    }

    #[test]
    fn test_terminal_board_returns_score_without_move() {
        let board = Board::new(1, 2, &[], Coord::new(0, 0), &[Coord::new(0, 0)], &[]).unwrap();
        let mut searcher = Searcher::new();
        assert_eq!(
            searcher.minimax(&board, 4, i32::MIN, i32::MAX, Turn::Seeker),
            (None, 1)
        );
    }

    #[test]
    fn test_boxed_in_seeker_has_no_move() {
        let walls = [Coord::new(0, 1), Coord::new(1, 0)];
        let board = Board::new(2, 2, &walls, Coord::new(0, 0), &[Coord::new(1, 1)], &[]).unwrap();
        let result = choose_move(&board, &SearchLimits::depth(4));
        assert_eq!(result.best_move, None);
        assert_eq!(result.best_score, 0);
        assert_eq!(result.completed_depth, 4);
    }

    #[test]
    fn test_ties_keep_first_move_in_enumeration_order() {
        // Open 3x3 with a far target: every move scores 0 at depth 1
        let board = Board::new(3, 3, &[], Coord::new(1, 1), &[Coord::new(0, 0)], &[]).unwrap();
        let result = choose_move(&board, &SearchLimits::depth(1));
        assert_eq!(result.best_move, Some(Direction::Up));
        assert_eq!(result.best_score, 0);
    }

    #[test]
    fn test_picks_adjacent_target() {
        let board = Board::new(
            3,
            3,
            &[],
            Coord::new(1, 1),
            &[Coord::new(1, 2), Coord::new(2, 2)],
            &[],
        )
        .unwrap();
        let result = choose_move(&board, &SearchLimits::depth(1));
        assert_eq!(result.best_move, Some(Direction::Right));
        assert_eq!(result.best_score, 1);
    }

    #[test]
    fn test_deeper_search_never_reports_lower_score() {
        for board in [arena(), two_pursuer_arena()] {
            let mut previous = i32::MIN;
            for max_depth in 1..=7 {
                let result = choose_move(&board, &SearchLimits::depth(max_depth));
                assert!(
                    result.best_score >= previous,
                    "score dropped from {} to {} at depth {}",
                    previous,
                    result.best_score,
                    max_depth
                );
                previous = result.best_score;
            }
        }
    }

    #[test]
    fn test_zero_budget_returns_no_move() {
        let limits = SearchLimits::depth_and_time(5, Duration::ZERO);
        let result = choose_move(&arena(), &limits);
        assert_eq!(result.best_move, None);
        assert_eq!(result.completed_depth, 0);
        assert_eq!(result.best_score, arena().score());
    }

    #[test]
    fn test_hard_deadline_still_returns_a_legal_move() {
        let limits = SearchLimits {
            max_depth: u8::MAX,
            time_budget: Duration::from_millis(30),
            hard_deadline: true,
            parallel_root: false,
        };
        let board = arena();
        let result = choose_move(&board, &limits);
        assert!(result.completed_depth >= 1);
        let legal = board.moves_for(Mover::Seeker);
        assert!(legal.contains(&result.best_move.unwrap()));
        assert!(result.completed_depth < u8::MAX);
    }

    #[test]
    fn test_parallel_root_matches_sequential() {
        for board in [arena(), two_pursuer_arena()] {
            for depth in 1..=5 {
                let sequential = choose_move(&board, &SearchLimits::depth(depth));
                let parallel = run_parallel(&board, depth, None);
                let sequential_iteration = run_sequential(&board, depth, None);
                assert_eq!(parallel.best_move, sequential_iteration.best_move);
                assert_eq!(parallel.score, sequential_iteration.score);
                assert!(parallel.completed);
                assert!(sequential.best_score >= sequential_iteration.score);
            }
        }
    }

    #[test]
    fn test_pursuers_minimize_the_seeker_score() {
        // S . T with a pursuer able to step onto the seeker before it gets there
        let board = Board::new(
            2,
            3,
            &[],
            Coord::new(0, 0),
            &[Coord::new(0, 2)],
            &[Coord::new(1, 1)],
        )
        .unwrap();
        let mut searcher = Searcher::new();
        let (_, value) = searcher.minimax(&board, 4, i32::MIN, i32::MAX, Turn::Seeker);
        assert_eq!(value, 0);
        let (_, unopposed) = Searcher::new().minimax(
            &Board::new(2, 3, &[], Coord::new(0, 0), &[Coord::new(0, 2)], &[]).unwrap(),
            4,
            i32::MIN,
            i32::MAX,
            Turn::Seeker,
        );
        assert_eq!(unopposed, 1);
    }

    /// Kept result after two completed iterations that settled on `Up` at score 1
    fn kept_result() -> SearchResult {
        SearchResult {
            best_move: Some(Direction::Up),
            best_score: 1,
            completed_depth: 2,
            nodes: 40,
            cutoffs: 3,
            elapsed: Duration::ZERO,
        }
    }

    fn iteration(best_move: Direction, score: i32, completed: bool) -> Iteration {
        Iteration {
            best_move: Some(best_move),
            score,
            completed,
            nodes: 10,
            cutoffs: 1,
        }
    }

    #[test]
    fn test_abandoned_iteration_with_lower_score_is_discarded() {
        let mut result = kept_result();
        let keep_going = merge_iteration(&mut result, &iteration(Direction::Down, 0, false), 3);
        assert!(!keep_going);
        assert_eq!(result.best_move, Some(Direction::Up));
        assert_eq!(result.best_score, 1);
        assert_eq!(result.completed_depth, 2);
        assert_eq!(result.nodes, 50);
        assert_eq!(result.cutoffs, 4);
    }

    #[test]
    fn test_abandoned_iteration_with_higher_score_replaces_the_move() {
        let mut result = kept_result();
        let keep_going = merge_iteration(&mut result, &iteration(Direction::Down, 2, false), 3);
        assert!(!keep_going);
        assert_eq!(result.best_move, Some(Direction::Down));
        assert_eq!(result.best_score, 2);
        assert_eq!(result.completed_depth, 2);
    }

    #[test]
    fn test_completed_iteration_with_equal_score_keeps_the_earlier_move() {
        let mut result = kept_result();
        let keep_going = merge_iteration(&mut result, &iteration(Direction::Right, 1, true), 3);
        assert!(keep_going);
        assert_eq!(result.best_move, Some(Direction::Up));
        assert_eq!(result.best_score, 1);
        assert_eq!(result.completed_depth, 3);
    }

    #[test]
    fn test_first_completed_iteration_is_always_taken() {
        let mut result = SearchResult {
            best_score: 5,
            completed_depth: 0,
            ..kept_result()
        };
        assert!(merge_iteration(&mut result, &iteration(Direction::Left, -1, true), 1));
        assert_eq!(result.best_move, Some(Direction::Left));
        assert_eq!(result.best_score, -1);
        assert_eq!(result.completed_depth, 1);
    }
}
