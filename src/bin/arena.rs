//! Round-robin match-ups between the engine agents, for eyeballing their
//! relative strength after tuning changes.

use qchess::agent::Agent;
use qchess::board::Board;
use qchess::eval::Evaluator;
use qchess::piece::{Color, Winner};

const MAX_MOVES: usize = 150;
const GAMES_PER_MATCHUP: usize = 10;

fn play_game(white: &Agent, black: &Agent) -> Winner {
    let mut board = Board::new();
    for _ in 0..MAX_MOVES {
        if board.winner() != Winner::Null {
            break;
        }
        let agent = match board.side_to_move {
            Color::White => white,
            Color::Black => black,
        };
        if agent.run(&mut board).is_err() {
            break;
        }
    }
    board.winner()
}

struct Tally {
    wins_a: u32,
    wins_b: u32,
    draws: u32,
}

/// Each contestant plays both colors for half the games.
fn run_matchup(label_a: &str, agent_a: &Agent, label_b: &str, agent_b: &Agent) -> Tally {
    let mut tally = Tally { wins_a: 0, wins_b: 0, draws: 0 };
    let half = GAMES_PER_MATCHUP / 2;

    for _ in 0..half {
        match play_game(agent_a, agent_b) {
            Winner::White => tally.wins_a += 1,
            Winner::Black => tally.wins_b += 1,
            _ => tally.draws += 1,
        }
    }
    for _ in 0..half {
        match play_game(agent_b, agent_a) {
            Winner::White => tally.wins_b += 1,
            Winner::Black => tally.wins_a += 1,
            _ => tally.draws += 1,
        }
    }

    println!(
        "  {label_a} vs {label_b}: {label_a} wins {}, {label_b} wins {}, draws {} (out of {GAMES_PER_MATCHUP})",
        tally.wins_a, tally.wins_b, tally.draws
    );
    tally
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    if let Ok(seed) = std::env::var("QCHESS_SEED") {
        if let Ok(seed) = seed.parse() {
            qchess::rng::seed(seed);
        }
    }

    let evaluator = Evaluator::QuantumValueTable;
    let contestants: Vec<(&str, Agent)> = vec![
        ("Random", Agent::Random),
        ("Greedy", Agent::Greedy { evaluator }),
        ("Minimax", Agent::Minimax { evaluator, depth: 1 }),
        ("AlphaBeta", Agent::AlphaBeta { evaluator, depth: 2 }),
        ("Beam", Agent::BeamSearch { evaluator, depth: 3, width: 3 }),
    ];

    println!("=== Agent round-robin ({GAMES_PER_MATCHUP} games per pairing) ===");
    for i in 0..contestants.len() {
        for j in i + 1..contestants.len() {
            let (label_a, agent_a) = &contestants[i];
            let (label_b, agent_b) = &contestants[j];
            run_matchup(label_a, agent_a, label_b, agent_b);
        }
    }
}
