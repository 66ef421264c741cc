// Command-line driver for the isolation agents
//
// Usage:
//   cargo run --bin isolation -- [options]
//
// Options:
//   --config <path>      Path to Isolation.toml (default: Isolation.toml)
//   --board <json|@file> Position snapshot to move in (default: empty configured board)
//   --agent <kind>       alpha_beta | minimax | random
//   --heuristic <name>   mobility | weighted_mobility | distance_ratio | free_space_blend
//   --time <ms>          Turn time limit in milliseconds
//   --play <kind>        Play a full match against this opponent instead of one move

use log::info;
use std::env;
use std::fs;
use std::process;

use isolation_agent::board::Board;
use isolation_agent::config::Config;
use isolation_agent::debug_logger::DebugLogger;
use isolation_agent::game::GameState;
use isolation_agent::heuristics::Heuristic;
use isolation_agent::player::{build_agent, play_match, Agent, AgentKind};
use isolation_agent::search::Deadline;

fn print_usage() {
    eprintln!("Isolation Agent");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  isolation [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>        Path to Isolation.toml (default: Isolation.toml)");
    eprintln!("  --board <json|@file>   Board snapshot to move in (default: empty board)");
    eprintln!("  --agent <kind>         alpha_beta | minimax | random");
    eprintln!("  --heuristic <name>     mobility | weighted_mobility | distance_ratio | free_space_blend");
    eprintln!("  --time <ms>            Turn time limit in milliseconds");
    eprintln!("  --play <kind>          Play a full match against this opponent");
    eprintln!("  --help                 Show this help message");
}

/// Command-line overrides applied on top of the loaded configuration
#[derive(Default)]
struct Options {
    config_path: Option<String>,
    board: Option<String>,
    agent: Option<AgentKind>,
    heuristic: Option<Heuristic>,
    time_ms: Option<u64>,
    opponent: Option<AgentKind>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", flag))
        };

        match flag {
            "--config" => options.config_path = Some(value()?),
            "--board" => options.board = Some(value()?),
            "--agent" => options.agent = Some(AgentKind::parse(&value()?)?),
            "--heuristic" => options.heuristic = Some(Heuristic::parse(&value()?)?),
            "--time" => {
                let raw = value()?;
                let ms = raw
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid time limit '{}': {}", raw, e))?;
                options.time_ms = Some(ms);
            }
            "--play" => options.opponent = Some(AgentKind::parse(&value()?)?),
            _ => return Err(format!("Unknown option '{}'", flag)),
        }
        i += 2;
    }

    Ok(options)
}

/// Reads a board snapshot given inline or as `@path`
fn load_board(arg: &str) -> Result<Board, String> {
    let json = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read board file '{}': {}", path, e))?,
        None => arg.to_string(),
    };

    serde_json::from_str(&json).map_err(|e| format!("Failed to parse board: {}", e))
}

fn run(options: Options) -> Result<(), String> {
    let mut config = match &options.config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(),
    };
    if let Some(kind) = options.agent {
        config.agent.kind = kind;
    }
    if let Some(heuristic) = options.heuristic {
        config.search.heuristic = heuristic;
    }
    if let Some(ms) = options.time_ms {
        config.timing.turn_time_limit_ms = ms;
    }
    config.validate()?;

    let board = match &options.board {
        Some(arg) => load_board(arg)?,
        None => Board::new(config.board.width, config.board.height),
    };
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);

    info!(
        "Agent: {}, heuristic: {}, turn limit: {}ms",
        config.agent.kind.as_str(),
        config.search.heuristic.as_str(),
        config.timing.turn_time_limit_ms
    );

    match options.opponent {
        Some(opponent) => {
            let first = build_agent::<Board>(config.agent.kind, &config, board.active_player());
            let second =
                build_agent::<Board>(opponent, &config, board.active_player().opponent());
            let mut agents: [&dyn Agent<Board>; 2] = [first.as_ref(), second.as_ref()];
            // agents are indexed by side, not by turn order
            agents.rotate_left(board.active_player().index());

            let result = play_match(board, agents, config.timing.turn_time_limit_ms, &logger);
            println!("{}", result.final_board);
            println!(
                "Winner: {} ({} moves, {:?})",
                result.winner.as_str(),
                result.history.len(),
                result.outcome
            );
        }
        None => {
            let side = board.active_player();
            let agent = build_agent::<Board>(config.agent.kind, &config, side);
            let deadline = Deadline::new(config.timing.turn_time_limit_ms);
            let time_left = || deadline.time_left();

            let report = agent.search(&board, &time_left);
            logger.log_decision(&board, agent.as_ref(), &report);

            info!(
                "{} chose {} (score: {:?}, depth: {:?}, nodes: {}, time: {}ms)",
                side.as_str(),
                report.best_move,
                report.score,
                report.depth,
                report.stats.nodes,
                report.elapsed_ms
            );
            println!("{}", board);
            println!("{}", report.best_move);
        }
    }

    Ok(())
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
