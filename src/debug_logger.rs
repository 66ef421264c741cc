// Debug logging module for per-decision game state logging
//
// Each decision is appended to a JSONL file as one self-contained line so the
// replay tool can re-run the search on the exact same position later.

use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::board::Board;
use crate::game::GameState;
use crate::heuristics::Heuristic;
use crate::player::Agent;
use crate::search::SearchReport;
use crate::types::{Move, Side};

/// Represents a single decision in the debug log
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DecisionLogEntry {
    /// Move number of the position the decision was made in
    pub turn: u32,
    pub player: Side,
    pub agent: String,
    /// Evaluation policy the agent searched with; absent for random agents
    #[serde(default)]
    pub heuristic: Option<Heuristic>,
    pub chosen_move: Move,
    pub depth: Option<u32>,
    /// Root value; infinite scores are written as `null`
    pub score: Option<f64>,
    pub board: Board,
    pub timestamp: String,
}

impl DecisionLogEntry {
    pub fn new(
        board: &Board,
        agent: &str,
        heuristic: Option<Heuristic>,
        report: &SearchReport,
    ) -> Self {
        DecisionLogEntry {
            turn: board.move_count(),
            player: board.active_player(),
            agent: agent.to_string(),
            heuristic,
            chosen_move: report.best_move,
            depth: report.depth,
            score: report.score.filter(|s| s.is_finite()),
            board: board.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
/// Clones write to the same file; the mutex keeps lines from interleaving
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, opens the log file for appending (creating it if needed)
    pub fn new<P: AsRef<Path>>(enabled: bool, log_file_path: P) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let path = log_file_path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", path.display());
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to open debug log file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one decision; failures are logged and otherwise ignored
    pub fn log_decision(&self, board: &Board, agent: &dyn Agent<Board>, report: &SearchReport) {
        if !self.enabled {
            return;
        }

        let entry = DecisionLogEntry::new(board, agent.name(), agent.heuristic(), report);
        let json_line = match serde_json::to_string(&entry) {
            Ok(json_line) => json_line,
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
                return;
            }
        };

        let mut file_guard = self.file.lock();
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", json_line) {
                error!("Failed to write debug log entry: {}", e);
            } else if let Err(e) = file.flush() {
                error!("Failed to flush debug log: {}", e);
            }
        }
    }
}
