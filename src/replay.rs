// Replay module for analyzing logged decisions and debugging search behaviour
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Re-run the logged agent on historical positions
// 3. Compare logged vs replayed moves
// 4. Generate detailed analysis reports

use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::alphabeta::AlphaBetaPlayer;
use crate::config::Config;
use crate::debug_logger::DecisionLogEntry;
use crate::minimax::MinimaxPlayer;
use crate::player::AgentKind;
use crate::types::Move;

/// Result of replaying a single decision
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub turn: u32,
    pub original_move: Move,
    pub replayed_move: Move,
    pub matches: bool,
    pub original_score: Option<f64>,
    pub replayed_score: f64,
    pub search_depth: u32,
    pub nodes: u64,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all decision entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(
        &self,
        log_path: P,
    ) -> Result<Vec<DecisionLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DecisionLogEntry = serde_json::from_str(&line).map_err(|e| {
                format!(
                    "Failed to parse JSON on line {}: {}",
                    line_num + 1,
                    e
                )
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-runs the logged agent on the entry's position without a time limit
    ///
    /// Alpha-beta is searched to the depth it last completed when logged,
    /// minimax to its logged (or configured) fixed depth. The logged heuristic
    /// overrides the configured one; older entries without it use the config.
    ///
    /// # Returns
    /// * `(move, score, depth, nodes, time_ms)` of the replayed search
    pub fn replay_turn(
        &self,
        entry: &DecisionLogEntry,
    ) -> Result<(Move, f64, u32, u64, u128), String> {
        let kind = AgentKind::parse(&entry.agent)?;
        let unbounded = || f64::INFINITY;
        let start_time = Instant::now();

        let mut search_config = self.config.search.clone();
        if let Some(heuristic) = entry.heuristic {
            search_config.heuristic = heuristic;
        }

        let (depth, outcome) = match kind {
            AgentKind::AlphaBeta => {
                let depth = entry.depth.ok_or_else(|| {
                    format!("Turn {}: search never completed a depth", entry.turn)
                })?;
                let player = AlphaBetaPlayer::new(search_config, entry.player);
                (depth, player.evaluate(&entry.board, depth, &unbounded))
            }
            AgentKind::Minimax => {
                let depth = entry.depth.unwrap_or(self.config.search.search_depth);
                let player = MinimaxPlayer::new(search_config);
                (depth, player.evaluate(&entry.board, depth, &unbounded))
            }
            AgentKind::Random => {
                return Err(format!("Turn {}: random decisions cannot be replayed", entry.turn));
            }
        };

        let outcome =
            outcome.map_err(|e| format!("Turn {}: replay search failed: {}", entry.turn, e))?;

        Ok((
            outcome.best_move,
            outcome.score,
            depth,
            outcome.stats.nodes,
            start_time.elapsed().as_millis(),
        ))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DecisionLogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let (replayed_move, replayed_score, search_depth, nodes, computation_time) =
            self.replay_turn(entry)?;

        let matches = entry.chosen_move == replayed_move;

        let result = ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move,
            matches,
            original_score: entry.score,
            replayed_score,
            search_depth,
            nodes,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (score: {}, depth: {}, nodes: {}, time: {}ms)",
                    entry.turn, replayed_move, replayed_score, search_depth, nodes, computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (score: {}, depth: {}, time: {}ms)",
                    entry.turn,
                    entry.chosen_move,
                    replayed_move,
                    replayed_score,
                    search_depth,
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in parallel, keeping log order in the results
    pub fn replay_all(&self, entries: &[DecisionLogEntry]) -> Vec<ReplayResult> {
        let outcomes: Vec<Result<ReplayResult, String>> = entries
            .par_iter()
            .map(|entry| self.replay_entry(entry))
            .collect();

        outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[DecisionLogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let count = results.len() as f64;
            let avg_time: f64 =
                results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>() / count;
            let avg_depth: f64 = results.iter().map(|r| r.search_depth as f64).sum::<f64>() / count;
            let avg_nodes: f64 = results.iter().map(|r| r.nodes as f64).sum::<f64>() / count;

            println!("Average Search Depth:       {:.1}", avg_depth);
            println!("Average Nodes Searched:     {:.0}", avg_nodes);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (score: {}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_score,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[DecisionLogEntry],
        expected_moves: &[(u32, Vec<Move>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}

/// Parses an expectation of the form `turn:row,col|row,col`
pub fn parse_expected_move(expectation: &str) -> Result<(u32, Vec<Move>), String> {
    let (turn, moves) = expectation.split_once(':').ok_or_else(|| {
        format!("Invalid expectation (want turn:row,col|row,col): {}", expectation)
    })?;

    let turn = turn
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("Invalid turn number: {}", turn))?;

    let moves = moves
        .split('|')
        .map(Move::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if moves.is_empty() {
        return Err(format!("No moves given for turn {}", turn));
    }
    Ok((turn, moves))
}
