use qchess::agent::Agent;
use qchess::board::Board;
use qchess::eval::Evaluator;
use qchess::piece::{Color, Winner};

const MAX_MOVES: usize = 120;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    if let Ok(seed) = std::env::var("QCHESS_SEED") {
        if let Ok(seed) = seed.parse() {
            qchess::rng::seed(seed);
        }
    }

    let white = Agent::AlphaBeta {
        evaluator: Evaluator::QuantumValueTable,
        depth: 2,
    };
    let black = Agent::Greedy {
        evaluator: Evaluator::QuantumValueTable,
    };

    let mut board = Board::new();
    let mut move_count = 0;
    while board.winner() == Winner::Null && move_count < MAX_MOVES {
        let agent = match board.side_to_move {
            Color::White => &white,
            Color::Black => &black,
        };
        match agent.run(&mut board) {
            Ok(record) => {
                move_count += 1;
                println!("{move_count:3}. {record}");
            }
            Err(error) => {
                eprintln!("no move possible: {error}");
                break;
            }
        }
    }

    println!("{board}");
    let result = match board.winner() {
        Winner::White => "White wins",
        Winner::Black => "Black wins",
        Winner::Draw => "Draw, both kings gone",
        Winner::Null => "unfinished",
    };
    eprintln!("Game over after {move_count} moves: {result}");
}
