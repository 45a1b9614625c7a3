// =============================================================================
// Position evaluation
//
// Three interchangeable scorers, all returning a scalar where positive
// favors White. RelativeStrength counts material weighted by probability;
// ValueTable adds a classical piece-square bonus; QuantumValueTable uses
// combined per-color tables and pays a premium for keeping pieces split,
// since spread-out probability is harder to capture.
//
// All of them read the derived square map, so two placements sharing a
// square count as whatever the map shows there.
// =============================================================================

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Color, PieceKind};

/// Material base values indexed by `PieceKind` (king first, pawn last).
const BASE_VALUES: [f64; 6] = [900.0, 90.0, 50.0, 30.0, 30.0, 10.0];

/// Per-kind probability threshold above which a placement earns the
/// superposition reward, and the reward scale itself.
const SPLIT_THRESHOLD: [f64; 6] = [0.1, 0.2, 0.3, 0.3, 0.3, 0.0];
const SPLIT_BONUS: [f64; 6] = [0.03, 0.02, 0.04, 0.03, 0.05, 0.0];

type Table = [[f64; 8]; 8];

// Positional bonuses from White's side, row 0 = rank 1. Black reads the
// vertically mirrored table and the bonus is subtracted.

#[rustfmt::skip]
const KING_BONUS: Table = [
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-2.0, -3.0, -3.0, -4.0, -4.0, -3.0, -3.0, -2.0],
    [-1.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -1.0],
    [ 2.0,  2.0,  0.0,  0.0,  0.0,  0.0,  2.0,  2.0],
    [ 2.0,  3.0,  1.0,  0.0,  0.0,  1.0,  3.0,  2.0],
];

#[rustfmt::skip]
const QUEEN_BONUS: Table = [
    [-2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0],
    [-1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0],
    [-0.5,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5],
    [ 0.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5],
    [-1.0,  0.5,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0],
];

#[rustfmt::skip]
const ROOK_BONUS: Table = [
    [ 0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0],
    [ 0.5,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  0.5],
    [-0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5],
    [-0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5],
    [-0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5],
    [-0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5],
    [-0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5],
    [ 0.0,  0.0,  0.0,  0.5,  0.5,  0.0,  0.0,  0.0],
];

#[rustfmt::skip]
const BISHOP_BONUS: Table = [
    [-2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0],
    [-1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  1.0,  1.0,  0.5,  0.0, -1.0],
    [-1.0,  0.5,  0.5,  1.0,  1.0,  0.5,  0.5, -1.0],
    [-1.0,  0.0,  1.0,  1.0,  1.0,  1.0,  0.0, -1.0],
    [-1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0, -1.0],
    [-1.0,  0.5,  0.0,  0.0,  0.0,  0.0,  0.5, -1.0],
    [-2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0],
];

#[rustfmt::skip]
const KNIGHT_BONUS: Table = [
    [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
    [-4.0, -2.0,  0.0,  0.0,  0.0,  0.0, -2.0, -4.0],
    [-3.0,  0.0,  1.0,  1.5,  1.5,  1.0,  0.0, -3.0],
    [-3.0,  0.5,  1.5,  2.0,  2.0,  1.5,  0.5, -3.0],
    [-3.0,  0.0,  1.5,  2.0,  2.0,  1.5,  0.0, -3.0],
    [-3.0,  0.5,  1.0,  1.5,  1.5,  1.0,  0.5, -3.0],
    [-4.0, -2.0,  0.0,  0.5,  0.5,  0.0, -2.0, -4.0],
    [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
];

#[rustfmt::skip]
const PAWN_BONUS: Table = [
    [ 0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0],
    [ 5.0,  5.0,  5.0,  5.0,  5.0,  5.0,  5.0,  5.0],
    [ 1.0,  1.0,  2.0,  3.0,  3.0,  2.0,  1.0,  1.0],
    [ 0.5,  0.5,  1.0,  2.5,  2.5,  1.0,  0.5,  0.5],
    [ 0.0,  0.0,  0.0,  2.0,  2.0,  0.0,  0.0,  0.0],
    [ 0.5, -0.5, -1.0,  0.0,  0.0, -1.0, -0.5,  0.5],
    [ 0.5,  1.0,  1.0, -2.0, -2.0,  1.0,  1.0,  0.5],
    [ 0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0],
];

fn bonus_table(kind: PieceKind) -> &'static Table {
    match kind {
        PieceKind::King => &KING_BONUS,
        PieceKind::Queen => &QUEEN_BONUS,
        PieceKind::Rook => &ROOK_BONUS,
        PieceKind::Bishop => &BISHOP_BONUS,
        PieceKind::Knight => &KNIGHT_BONUS,
        PieceKind::Pawn => &PAWN_BONUS,
    }
}

// Combined quantum tables: value and position folded together, one table
// per color and kind, row 0 = rank 1. The white tables are the source of
// truth; the black side is derived at start-up by negation, vertically
// mirrored for the kinds whose classical tables are mirrored too (queen
// and knight tables are shared between colors, as in the classical set).

#[rustfmt::skip]
const QUANTUM_KING: Table = [
    [197.0, 196.0, 196.0, 195.0, 195.0, 196.0, 196.0, 197.0],
    [197.0, 196.0, 196.0, 195.0, 195.0, 196.0, 196.0, 197.0],
    [197.0, 196.0, 196.0, 195.0, 195.0, 196.0, 196.0, 197.0],
    [197.0, 196.0, 196.0, 195.0, 195.0, 196.0, 196.0, 197.0],
    [198.0, 197.0, 197.0, 196.0, 196.0, 197.0, 197.0, 198.0],
    [199.0, 198.0, 198.0, 198.0, 198.0, 198.0, 198.0, 199.0],
    [202.0, 202.0, 200.0, 200.0, 200.0, 200.0, 202.0, 202.0],
    [202.0, 203.0, 201.0, 200.0, 200.0, 201.0, 203.0, 202.0],
];

#[rustfmt::skip]
const QUANTUM_QUEEN: Table = [
    [88.0, 89.0, 89.0, 89.5, 89.5, 89.0, 89.0, 88.0],
    [89.0, 90.0, 90.0, 90.0, 90.0, 90.0, 90.0, 89.0],
    [89.0, 90.0, 90.5, 90.5, 90.5, 90.5, 90.0, 89.0],
    [89.5, 90.0, 90.5, 90.5, 90.5, 90.5, 90.0, 89.5],
    [90.0, 90.0, 90.5, 90.5, 90.5, 90.5, 90.0, 89.5],
    [89.0, 90.5, 90.5, 90.5, 90.5, 90.5, 90.0, 89.0],
    [89.0, 90.0, 90.5, 90.0, 90.0, 90.0, 90.0, 89.0],
    [88.0, 89.0, 89.0, 89.5, 89.5, 89.0, 89.0, 88.0],
];

#[rustfmt::skip]
const QUANTUM_ROOK: Table = [
    [50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
    [50.5, 51.0, 51.0, 51.0, 51.0, 51.0, 51.0, 50.5],
    [49.5, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 49.5],
    [49.5, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 49.5],
    [49.5, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 49.5],
    [49.5, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 49.5],
    [49.5, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 49.5],
    [50.0, 50.0, 50.0, 50.5, 50.5, 50.0, 50.0, 50.0],
];

#[rustfmt::skip]
const QUANTUM_BISHOP: Table = [
    [28.0, 29.0, 29.0, 29.0, 29.0, 29.0, 29.0, 28.0],
    [29.0, 30.0, 30.0, 30.0, 30.0, 30.0, 30.0, 29.0],
    [29.0, 30.0, 30.5, 31.0, 31.0, 30.5, 30.0, 29.0],
    [29.0, 30.5, 30.5, 31.0, 31.0, 30.5, 30.5, 29.0],
    [29.0, 30.0, 31.0, 31.0, 31.0, 31.0, 30.0, 29.0],
    [29.0, 31.0, 31.0, 31.0, 31.0, 31.0, 31.0, 29.0],
    [29.0, 30.5, 30.0, 30.0, 30.0, 30.0, 30.5, 29.0],
    [28.0, 29.0, 29.0, 29.0, 29.0, 29.0, 29.0, 28.0],
];

#[rustfmt::skip]
const QUANTUM_KNIGHT: Table = [
    [25.0, 26.0, 27.0, 27.0, 27.0, 27.0, 26.0, 25.0],
    [26.0, 28.0, 30.0, 30.0, 30.0, 30.0, 28.0, 26.0],
    [27.0, 30.0, 31.0, 31.5, 31.5, 31.0, 30.0, 27.0],
    [27.0, 30.5, 31.5, 32.0, 32.0, 31.5, 30.5, 27.0],
    [27.0, 30.0, 31.5, 32.0, 32.0, 31.5, 30.0, 27.0],
    [27.0, 30.5, 31.0, 31.5, 31.5, 31.0, 30.5, 27.0],
    [26.0, 28.0, 30.0, 30.5, 30.5, 30.0, 28.0, 26.0],
    [25.0, 26.0, 27.0, 27.0, 27.0, 27.0, 26.0, 25.0],
];

#[rustfmt::skip]
const QUANTUM_PAWN: Table = [
    [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0],
    [15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0],
    [11.0, 11.0, 12.0, 13.0, 13.0, 12.0, 11.0, 11.0],
    [15.5, 10.5, 11.0, 12.5, 12.5, 11.0, 10.5, 15.5],
    [10.0, 10.0, 10.0, 12.0, 12.0, 10.0, 10.0, 10.0],
    [10.5,  9.5,  9.0, 10.0, 10.0,  9.0,  9.5, 10.5],
    [10.5, 11.0, 11.0,  8.0,  8.0, 11.0, 11.0, 10.5],
    [80.0, 80.0, 80.0, 80.0, 80.0, 80.0, 80.0, 80.0],
];

/// Which kinds mirror vertically for the black quantum table (the queen and
/// knight tables are color-shared, so they only change sign).
const QUANTUM_MIRRORED: [bool; 6] = [true, false, true, true, false, true];

static QUANTUM_TABLES: Lazy<[[Table; 6]; 2]> = Lazy::new(|| {
    let white = [
        QUANTUM_KING,
        QUANTUM_QUEEN,
        QUANTUM_ROOK,
        QUANTUM_BISHOP,
        QUANTUM_KNIGHT,
        QUANTUM_PAWN,
    ];
    let mut black = white;
    for (kind, table) in black.iter_mut().enumerate() {
        if QUANTUM_MIRRORED[kind] {
            table.reverse();
        }
        for row in table.iter_mut() {
            for value in row.iter_mut() {
                *value = -*value;
            }
        }
    }
    [white, black]
});

/// The closed set of board scorers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Evaluator {
    RelativeStrength,
    ValueTable,
    QuantumValueTable,
}

impl Evaluator {
    pub const ALL: [Evaluator; 3] = [
        Evaluator::RelativeStrength,
        Evaluator::ValueTable,
        Evaluator::QuantumValueTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Evaluator::RelativeStrength => "RelativeStrength",
            Evaluator::ValueTable => "ValueTable",
            Evaluator::QuantumValueTable => "QuantumValueTable",
        }
    }

    pub fn from_name(name: &str) -> Option<Evaluator> {
        Evaluator::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Score `board` from White's perspective.
    pub fn score(self, board: &Board) -> f64 {
        match self {
            Evaluator::RelativeStrength => relative_strength(board),
            Evaluator::ValueTable => value_table(board),
            Evaluator::QuantumValueTable => quantum_value_table(board),
        }
    }
}

fn relative_strength(board: &Board) -> f64 {
    board
        .occupants()
        .map(|(_, o)| o.color.sign() * BASE_VALUES[o.kind.index()] * o.probability)
        .sum()
}

fn value_table(board: &Board) -> f64 {
    board
        .occupants()
        .map(|(square, o)| {
            let col = square.col as usize - 1;
            let row = match o.color {
                Color::White => square.row as usize - 1,
                Color::Black => 8 - square.row as usize,
            };
            let value = BASE_VALUES[o.kind.index()] + bonus_table(o.kind)[row][col];
            o.color.sign() * value * o.probability
        })
        .sum()
}

fn quantum_value_table(board: &Board) -> f64 {
    board
        .occupants()
        .map(|(square, o)| {
            let kind = o.kind.index();
            let mut probability = o.probability;
            if probability > SPLIT_THRESHOLD[kind] {
                probability += (1.0 - probability) * SPLIT_BONUS[kind];
            }
            let table = &QUANTUM_TABLES[o.color.index()][kind];
            table[square.row as usize - 1][square.col as usize - 1] * probability
        })
        .sum()
}
