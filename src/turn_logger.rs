// Per-turn JSONL logging for post-game analysis
//
// Each played turn is appended to the log file as one JSON object per line.
// A logger that fails to open its file degrades to a no-op instead of
// interrupting the game.

use log::error;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Arc;

use crate::board::Board;
use crate::types::{Coord, Direction, TurnRecord};

/// Represents a single turn log entry
#[derive(Debug, Serialize)]
struct TurnLogEntry<'a> {
    turn: u32,
    seeker_move: Option<Direction>,
    score: i32,
    seeker: Coord,
    pursuers: &'a [Coord],
    records: &'a [TurnRecord],
    timestamp: String,
}

/// Shared turn logger state
#[derive(Clone)]
pub struct TurnLogger {
    file: Arc<Mutex<Option<BufWriter<File>>>>,
    enabled: bool,
}

impl TurnLogger {
    /// Creates a new turn logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return TurnLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Turn logging enabled: {}", log_file_path);
                TurnLogger {
                    file: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create turn log file '{}': {}", log_file_path, e);
                TurnLogger::disabled()
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        TurnLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one turn: the seeker's choice, the resulting board and every
    /// mover's record for that turn
    pub fn log_turn(
        &self,
        turn: u32,
        seeker_move: Option<Direction>,
        board: &Board,
        records: &[TurnRecord],
    ) {
        if !self.enabled {
            return;
        }

        let entry = TurnLogEntry {
            turn,
            seeker_move,
            score: board.score(),
            seeker: board.seeker(),
            pursuers: board.pursuers(),
            records,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let json_line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize turn log entry: {}", e);
                return;
            }
        };

        let mut guard = self.file.lock();
        if let Some(writer) = guard.as_mut() {
            if let Err(e) = writeln!(writer, "{}", json_line).and_then(|_| writer.flush()) {
                error!("Failed to write turn log entry: {}", e);
            }
        }
    }
}
