// Turn driver: seeker decision, seeker move, pursuer moves, terminal check
//
// The live Board is owned here and is the single source of truth for the
// game. Every turn replaces it with a derived Board; the previous one is kept
// on an undo stack together with the history length it corresponds to.

use log::info;
use std::fmt;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::policy::{advance_pursuers, PursuerPolicy};
use crate::search::{choose_move, SearchLimits};
use crate::turn_logger::TurnLogger;
use crate::types::{Direction, Mover, TurnRecord};

/// Where a game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Every target was collected
    Won,
    /// A pursuer reached the seeker
    Lost,
    /// Stopped by the overall time limit before either side won
    TimeExpired,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Playing => write!(f, "in progress"),
            GameStatus::Won => write!(f, "seeker wins"),
            GameStatus::Lost => write!(f, "seeker loses"),
            GameStatus::TimeExpired => write!(f, "time expired, outcome undetermined"),
        }
    }
}

/// Summary produced when `Game::play` stops
#[derive(Debug, Clone)]
pub struct GameReport {
    pub board: Board,
    pub status: GameStatus,
    pub turns: u32,
    pub score_history: Vec<i32>,
    pub history: Vec<TurnRecord>,
}

struct Snapshot {
    board: Board,
    history_len: usize,
}

pub struct Game {
    board: Board,
    turns: u32,
    score_history: Vec<i32>,
    history: Vec<TurnRecord>,
    snapshots: Vec<Snapshot>,
    logger: TurnLogger,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Game {
            board,
            turns: 0,
            score_history: Vec::new(),
            history: Vec::new(),
            snapshots: Vec::new(),
            logger: TurnLogger::disabled(),
        }
    }

    pub fn with_logger(mut self, logger: TurnLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Score after each played turn, oldest first
    pub fn score_history(&self) -> &[i32] {
        &self.score_history
    }

    /// Every mover's record, in the order the moves were made
    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Won or Lost once the board is terminal, Playing otherwise
    pub fn status(&self) -> GameStatus {
        if self.board.is_won() {
            GameStatus::Won
        } else if self.board.is_lost() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    /// Plays one full turn and returns the seeker's move.
    ///
    /// The seeker stays in place when the search offers no move. Pursuers do not
    /// move if the seeker's own move already ended the game. On a finished game
    /// nothing happens and `None` is returned.
    pub fn play_turn<P: PursuerPolicy + ?Sized>(
        &mut self,
        limits: &SearchLimits,
        policy: &mut P,
    ) -> Option<Direction> {
        if self.board.is_terminal() {
            return None;
        }

        self.snapshots.push(Snapshot {
            board: self.board.clone(),
            history_len: self.history.len(),
        });
        let first_record = self.history.len();

        let decision = choose_move(&self.board, limits);
        let seeker_move = decision
            .best_move
            .filter(|dir| self.board.moves_for(Mover::Seeker).contains(dir));
        if let Some(dir) = seeker_move {
            self.board = self.board.apply(Mover::Seeker, dir);
        }
        self.history.push(TurnRecord {
            mover: Mover::Seeker,
            direction: seeker_move,
            resulting_score: self.board.score(),
        });

        if !self.board.is_terminal() {
            let (next, records) = advance_pursuers(&self.board, policy);
            self.board = next;
            self.history.extend(records);
        }

        self.turns += 1;
        self.score_history.push(self.board.score());

        info!(
            "Turn {}: seeker {} -> {} (score: {}/{}, searched depth {})",
            self.turns,
            seeker_move.map_or("stays", |d| d.as_str()),
            self.board.seeker(),
            self.board.score(),
            self.board.total_targets(),
            decision.completed_depth
        );
        self.logger.log_turn(
            self.turns,
            seeker_move,
            &self.board,
            &self.history[first_record..],
        );

        seeker_move
    }

    /// Reverts the last played turn. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.snapshots.pop() {
            Some(snapshot) => {
                self.board = snapshot.board;
                self.history.truncate(snapshot.history_len);
                self.score_history.pop();
                self.turns -= 1;
                true
            }
            None => false,
        }
    }

    /// Plays until the board is terminal or `time_limit` has elapsed.
    ///
    /// The time limit is checked after each turn, so at least one turn is played
    /// on a non-terminal board.
    pub fn play<P: PursuerPolicy + ?Sized>(
        &mut self,
        limits: &SearchLimits,
        time_limit: Duration,
        policy: &mut P,
    ) -> GameReport {
        let start_time = Instant::now();
        info!(
            "Starting game: {}x{} board, {} targets, {} pursuers",
            self.board.rows(),
            self.board.cols(),
            self.board.total_targets(),
            self.board.pursuers().len()
        );

        let mut status = self.status();
        while status == GameStatus::Playing {
            self.play_turn(limits, policy);
            status = self.status();

            if status == GameStatus::Playing && start_time.elapsed() > time_limit {
                info!(
                    "Stopping game: time limit of {}ms reached after {} turns",
                    time_limit.as_millis(),
                    self.turns
                );
                status = GameStatus::TimeExpired;
            }
        }

        info!("Game over after {} turns: {}", self.turns, status);
        GameReport {
            board: self.board.clone(),
            status,
            turns: self.turns,
            score_history: self.score_history.clone(),
            history: self.history.clone(),
        }
    }
}
