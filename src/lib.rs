// Library exports for the isolation agents
// This allows the driver, the replay tool and the integration tests to share the search core

pub mod alphabeta;
pub mod board;
pub mod config;
pub mod debug_logger;
pub mod game;
pub mod heuristics;
pub mod minimax;
pub mod player;
pub mod replay;
pub mod search;
pub mod types;
