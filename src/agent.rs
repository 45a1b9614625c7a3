// =============================================================================
// Search agents
//
// Every agent does the same job: look at a board, pick one action from
// board.actions(), and play it in place. They differ only in how hard they
// look. Search always works on clones; the live board is mutated exactly
// once, at the very end, when the chosen action is applied.
//
// Scores come from the configured evaluator and are White-positive, so
// White maximizes and Black minimizes throughout. Ties within a small
// tolerance are broken uniformly at random to vary play between games.
// =============================================================================

use crate::board::Board;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::moves::Action;
use crate::piece::Color;
use crate::rng;

/// Scores closer than this are considered tied.
const TIE_TOLERANCE: f64 = 1e-6;

/// The closed set of players. Names round-trip through [`Agent::from_name`]
/// using the config's per-agent defaults.
#[derive(Clone, Debug, PartialEq)]
pub enum Agent {
    Random,
    Greedy { evaluator: Evaluator },
    Minimax { evaluator: Evaluator, depth: u32 },
    AlphaBeta { evaluator: Evaluator, depth: u32 },
    BeamSearch { evaluator: Evaluator, depth: u32, width: usize },
    /// Chooses nothing on its own; the facade feeds it explicit actions.
    Human,
}

impl Agent {
    pub const NAMES: [&'static str; 6] = [
        "Random",
        "Greedy",
        "Minimax",
        "AlphaBeta",
        "BeamSearch",
        "Human",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Agent::Random => "Random",
            Agent::Greedy { .. } => "Greedy",
            Agent::Minimax { .. } => "Minimax",
            Agent::AlphaBeta { .. } => "AlphaBeta",
            Agent::BeamSearch { .. } => "BeamSearch",
            Agent::Human => "Human",
        }
    }

    pub fn from_name(name: &str, config: &Config) -> Option<Agent> {
        match name {
            "Random" => Some(Agent::Random),
            "Greedy" => Some(Agent::Greedy { evaluator: config.evaluator }),
            "Minimax" => Some(Agent::Minimax {
                evaluator: config.evaluator,
                depth: config.minimax_depth,
            }),
            "AlphaBeta" => Some(Agent::AlphaBeta {
                evaluator: config.evaluator,
                depth: config.alphabeta_depth,
            }),
            "BeamSearch" => Some(Agent::BeamSearch {
                evaluator: config.evaluator,
                depth: config.beam_depth,
                width: config.beam_width,
            }),
            "Human" => Some(Agent::Human),
            _ => None,
        }
    }

    /// Pick one action for the side to move and apply it to `board`,
    /// returning the record string.
    pub fn run(&self, board: &mut Board) -> Result<String> {
        match *self {
            Agent::Random => run_random(board),
            Agent::Greedy { evaluator } => run_greedy(evaluator, board),
            Agent::Minimax { evaluator, depth } => run_minimax(evaluator, depth, board),
            Agent::AlphaBeta { evaluator, depth } => run_alphabeta(evaluator, depth, board),
            Agent::BeamSearch { evaluator, depth, width } => {
                run_beam(evaluator, depth, width, board)
            }
            Agent::Human => Err(Error::NoMoves),
        }
    }
}

fn extremum(values: &[f64], color: Color) -> f64 {
    match color {
        Color::White => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        Color::Black => values.iter().cloned().fold(f64::INFINITY, f64::min),
    }
}

fn tied_indices(values: &[f64], best: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, v)| (v - best).abs() < TIE_TOLERANCE)
        .map(|(i, _)| i)
        .collect()
}

/// Root choice pool for the depth-limited searchers. Finite best: the
/// near-ties. Winning infinity: the lines that force it. Losing infinity:
/// nothing separates the actions, so all of them.
fn root_pool(values: &[f64], color: Color) -> Vec<usize> {
    let best = extremum(values, color);
    let losing = match color {
        Color::White => f64::NEG_INFINITY,
        Color::Black => f64::INFINITY,
    };
    if best == losing {
        (0..values.len()).collect()
    } else if best.is_finite() {
        tied_indices(values, best)
    } else {
        values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == best)
            .map(|(i, _)| i)
            .collect()
    }
}

fn run_random(board: &mut Board) -> Result<String> {
    let actions = board.actions();
    if actions.is_empty() {
        return Err(Error::NoMoves);
    }
    let pick = rng::pick_index(actions.len());
    board.apply(&actions[pick])
}

/// One-ply lookahead: score every action on a clone and play an extremal
/// one, randomizing among near-ties.
fn run_greedy(evaluator: Evaluator, board: &mut Board) -> Result<String> {
    let actions = board.actions();
    if actions.is_empty() {
        return Err(Error::NoMoves);
    }
    let mut values = Vec::with_capacity(actions.len());
    for action in &actions {
        let mut probe = board.clone();
        probe.apply(action)?;
        values.push(evaluator.score(&probe));
    }
    let best = extremum(&values, board.side_to_move);
    let pool = tied_indices(&values, best);
    let pick = pool[rng::pick_index(pool.len())];
    board.apply(&actions[pick])
}

/// Value of each action available on `board`, looking `depth` plies past
/// the action itself. A node with no actions at all is scored as a loss
/// for its side to move.
fn minimax_values(evaluator: Evaluator, depth: u32, board: &Board) -> Result<Vec<f64>> {
    let actions = board.actions();
    let mut values = Vec::with_capacity(actions.len());
    for action in &actions {
        let mut child = board.clone();
        child.apply(action)?;
        if depth > 0 {
            let replies = minimax_values(evaluator, depth - 1, &child)?;
            values.push(match board.side_to_move {
                Color::White => replies.iter().cloned().fold(f64::INFINITY, f64::min),
                Color::Black => replies.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            });
        } else {
            values.push(evaluator.score(&child));
        }
    }
    if values.is_empty() {
        values.push(match board.side_to_move {
            Color::White => f64::NEG_INFINITY,
            Color::Black => f64::INFINITY,
        });
    }
    Ok(values)
}

fn run_minimax(evaluator: Evaluator, depth: u32, board: &mut Board) -> Result<String> {
    let actions = board.actions();
    if actions.is_empty() {
        return Err(Error::NoMoves);
    }
    let values = minimax_values(evaluator, depth, board)?;
    let pool = root_pool(&values, board.side_to_move);
    let pick = pool[rng::pick_index(pool.len())];
    board.apply(&actions[pick])
}

fn ab_max(board: &Board, evaluator: Evaluator, depth: u32, mut alpha: f64, beta: f64) -> Result<f64> {
    if depth == 0 {
        return Ok(evaluator.score(board));
    }
    let mut value = f64::NEG_INFINITY;
    for action in board.actions() {
        let mut child = board.clone();
        child.apply(&action)?;
        value = value.max(ab_min(&child, evaluator, depth - 1, alpha, beta)?);
        if value >= beta {
            break;
        }
        alpha = alpha.max(value);
    }
    Ok(value)
}

fn ab_min(board: &Board, evaluator: Evaluator, depth: u32, alpha: f64, mut beta: f64) -> Result<f64> {
    if depth == 0 {
        return Ok(evaluator.score(board));
    }
    let mut value = f64::INFINITY;
    for action in board.actions() {
        let mut child = board.clone();
        child.apply(&action)?;
        value = value.min(ab_max(&child, evaluator, depth - 1, alpha, beta)?);
        if value <= alpha {
            break;
        }
        beta = beta.min(value);
    }
    Ok(value)
}

/// Minimax with alpha-beta pruning. The root keeps the same tie-breaking
/// contract as plain minimax: every root child's value is collected while
/// the window narrows, then a near-tie of the best is chosen at random.
fn run_alphabeta(evaluator: Evaluator, depth: u32, board: &mut Board) -> Result<String> {
    let depth = depth.max(1);
    let actions = board.actions();
    if actions.is_empty() {
        return Err(Error::NoMoves);
    }
    let mut alpha = f64::NEG_INFINITY;
    let mut beta = f64::INFINITY;
    let mut values = Vec::with_capacity(actions.len());
    for action in &actions {
        let mut child = board.clone();
        child.apply(action)?;
        match board.side_to_move {
            Color::White => {
                let value = ab_min(&child, evaluator, depth - 1, alpha, beta)?;
                alpha = alpha.max(value);
                values.push(value);
            }
            Color::Black => {
                let value = ab_max(&child, evaluator, depth - 1, alpha, beta)?;
                beta = beta.min(value);
                values.push(value);
            }
        }
    }
    let pool = root_pool(&values, board.side_to_move);
    let pick = pool[rng::pick_index(pool.len())];
    board.apply(&actions[pick])
}

/// One lineage the beam is still following: the actions played so far, the
/// static score of its tip, and the tip position itself.
type Lineage = (Vec<Action>, f64, Board);

fn sort_and_trim(lineages: &mut Vec<Lineage>, color: Color, width: usize) {
    lineages.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    match color {
        // White wants the highest scores, which sit at the back.
        Color::White => {
            let excess = lineages.len().saturating_sub(width);
            lineages.drain(..excess);
        }
        Color::Black => lineages.truncate(width),
    }
}

/// Group lineages by their first action (in first-seen order) and compute
/// each group's minimax value, alternating the choosing side per level.
fn tree_values(color: Color, entries: &[(&[Action], f64)]) -> (Vec<Action>, Vec<f64>) {
    let mut firsts: Vec<Action> = Vec::new();
    let mut groups: Vec<Vec<(&[Action], f64)>> = Vec::new();
    for &(path, value) in entries {
        let first = &path[0];
        let index = match firsts.iter().position(|a| a == first) {
            Some(index) => index,
            None => {
                firsts.push(first.clone());
                groups.push(Vec::new());
                firsts.len() - 1
            }
        };
        groups[index].push((&path[1..], value));
    }
    let values = groups
        .iter()
        .map(|group| {
            if group.iter().all(|(rest, _)| rest.is_empty()) {
                match group.last() {
                    Some(&(_, value)) => value,
                    None => 0.0,
                }
            } else {
                let deeper: Vec<(&[Action], f64)> = group
                    .iter()
                    .filter(|(rest, _)| !rest.is_empty())
                    .cloned()
                    .collect();
                let (_, sub_values) = tree_values(color.opposite(), &deeper);
                extremum(&sub_values, color)
            }
        })
        .collect();
    (firsts, values)
}

/// Beam search: keep only the `width` best lines per expansion instead of
/// the full tree, then run minimax over the surviving lineages.
fn run_beam(evaluator: Evaluator, depth: u32, width: usize, board: &mut Board) -> Result<String> {
    let actions = board.actions();
    if actions.is_empty() {
        return Err(Error::NoMoves);
    }
    let mut lineages: Vec<Lineage> = Vec::new();
    for action in &actions {
        let mut child = board.clone();
        child.apply(action)?;
        let value = evaluator.score(&child);
        lineages.push((vec![action.clone()], value, child));
    }
    sort_and_trim(&mut lineages, board.side_to_move, width);

    let mut color = board.side_to_move;
    for _ in 1..depth {
        color = color.opposite();
        let mut survivors = Vec::new();
        for (prefix, _, parent) in lineages {
            let mut expansions: Vec<Lineage> = Vec::new();
            for action in parent.actions() {
                let mut child = parent.clone();
                child.apply(&action)?;
                let value = evaluator.score(&child);
                let mut path = prefix.clone();
                path.push(action);
                expansions.push((path, value, child));
            }
            sort_and_trim(&mut expansions, color, width);
            survivors.extend(expansions);
        }
        lineages = survivors;
    }

    if lineages.is_empty() {
        // Every surviving line ran out of moves; nothing separates the
        // root actions any more.
        let pick = rng::pick_index(actions.len());
        return board.apply(&actions[pick]);
    }

    let entries: Vec<(&[Action], f64)> = lineages
        .iter()
        .map(|(path, value, _)| (path.as_slice(), *value))
        .collect();
    let (firsts, values) = tree_values(board.side_to_move.opposite(), &entries);
    let best = extremum(&values, board.side_to_move);
    let index = values.iter().position(|&v| v == best).unwrap_or(0);
    board.apply(&firsts[index])
}
