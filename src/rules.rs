//! Per-kind movement rules and the combiner that derives split and merge
//! actions from basic moves.
//!
//! A destination is generated by walking rays of offsets from the source
//! square. Superposed occupants (probability below 1) do not block rays,
//! which is what lets sliders pass "through" a half-present piece.

use once_cell::sync::Lazy;

use crate::board::{Board, Occupant};
use crate::moves::Action;
use crate::piece::{certain, Color, Piece, PieceKind, Square};

/// How a candidate square affects a ray walk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupancy {
    /// Empty, or held only in superposition; the ray continues through it.
    Unoccupied,
    /// Can be moved to, but stops the ray.
    Reachable,
    /// Cannot be moved to; stops the ray.
    Unreachable,
}

type Ray = Vec<(i8, i8)>;

fn slider(dc: i8, dr: i8) -> Ray {
    (1..8).map(|i| (dc * i, dr * i)).collect()
}

static ROOK_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    vec![slider(1, 0), slider(-1, 0), slider(0, 1), slider(0, -1)]
});

static BISHOP_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    vec![slider(1, 1), slider(-1, 1), slider(1, -1), slider(-1, -1)]
});

static QUEEN_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    ROOK_RAYS.iter().chain(BISHOP_RAYS.iter()).cloned().collect()
});

static KNIGHT_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    [(1, 2), (2, 1), (-1, 2), (-2, 1), (1, -2), (2, -1), (-1, -2), (-2, -1)]
        .iter()
        .map(|&step| vec![step])
        .collect()
});

static KING_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    [(1, 1), (1, 0), (1, -1), (0, 1), (0, -1), (-1, 1), (-1, 0), (-1, -1)]
        .iter()
        .map(|&step| vec![step])
        .collect()
});

static WHITE_PAWN_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    [(0, 1), (0, 2), (1, 1), (-1, 1)]
        .iter()
        .map(|&step| vec![step])
        .collect()
});

static BLACK_PAWN_RAYS: Lazy<Vec<Ray>> = Lazy::new(|| {
    [(0, -1), (0, -2), (1, -1), (-1, -1)]
        .iter()
        .map(|&step| vec![step])
        .collect()
});

fn rays(kind: PieceKind, color: Color) -> &'static [Ray] {
    match kind {
        PieceKind::King => &KING_RAYS,
        PieceKind::Queen => &QUEEN_RAYS,
        PieceKind::Rook => &ROOK_RAYS,
        PieceKind::Bishop => &BISHOP_RAYS,
        PieceKind::Knight => &KNIGHT_RAYS,
        PieceKind::Pawn => match color {
            Color::White => &WHITE_PAWN_RAYS,
            Color::Black => &BLACK_PAWN_RAYS,
        },
    }
}

/// Default check for sliders and the king.
fn slider_check(color: Color, occupant: Option<Occupant>) -> Occupancy {
    match occupant {
        None => Occupancy::Unoccupied,
        Some(o) if !certain(o.probability) => Occupancy::Unoccupied,
        Some(o) if o.color != color => Occupancy::Reachable,
        Some(_) => Occupancy::Unreachable,
    }
}

/// Rook check: the default, plus the castling hook. A rook standing on a
/// corner of its home rank reports the square of a fully present friendly
/// king on the e-file as reachable, so the generator emits the castling
/// tuple (rook square as source, king square as target).
fn rook_check(color: Color, cur: Square, next: Square, occupant: Option<Occupant>) -> Occupancy {
    let state = slider_check(color, occupant);
    if state == Occupancy::Unreachable {
        if let Some(o) = occupant {
            if o.color == color
                && o.kind == PieceKind::King
                && certain(o.probability)
                && next.col == 5
                && (cur.col == 1 || cur.col == 8)
                && cur.row == color.home_row()
            {
                return Occupancy::Reachable;
            }
        }
    }
    state
}

/// Knights jump, so only the destination matters: blocked solely by a fully
/// present friendly piece.
fn knight_check(color: Color, occupant: Option<Occupant>) -> Occupancy {
    match occupant {
        Some(o) if o.color == color && certain(o.probability) => Occupancy::Unreachable,
        _ => Occupancy::Reachable,
    }
}

/// Pawn check. Direction is already baked into the per-color rays; this
/// enforces the home-row restriction on the two-step advance, requires the
/// straight path to be unoccupied in the superposition sense, and allows a
/// diagonal step only onto a fully present opposing piece.
fn pawn_check(color: Color, cur: Square, next: Square, occupant: Option<Occupant>) -> Occupancy {
    let advance = next.row as i16 - cur.row as i16;
    if advance.abs() == 2 {
        let home = match color {
            Color::White => 2,
            Color::Black => 7,
        };
        if cur.row != home {
            return Occupancy::Unreachable;
        }
    }
    if cur.col == next.col {
        match occupant {
            Some(o) if certain(o.probability) => Occupancy::Unreachable,
            _ => Occupancy::Reachable,
        }
    } else {
        match occupant {
            Some(o) if o.color != color && certain(o.probability) => Occupancy::Reachable,
            _ => Occupancy::Unreachable,
        }
    }
}

fn check(
    color: Color,
    kind: PieceKind,
    cur: Square,
    next: Square,
    occupant: Option<Occupant>,
) -> Occupancy {
    match kind {
        PieceKind::Rook => rook_check(color, cur, next, occupant),
        PieceKind::Knight => knight_check(color, occupant),
        PieceKind::Pawn => pawn_check(color, cur, next, occupant),
        _ => slider_check(color, occupant),
    }
}

/// All destinations reachable in one move by a piece of the given kind and
/// color standing on `from`. Order follows the ray tables and is stable.
pub fn destinations(color: Color, kind: PieceKind, from: Square, board: &Board) -> Vec<Square> {
    let mut out = Vec::new();
    for ray in rays(kind, color) {
        for &(dc, dr) in ray {
            let col = from.col as i16 + dc as i16;
            let row = from.row as i16 + dr as i16;
            if !(1..=8).contains(&col) || !(1..=8).contains(&row) {
                break;
            }
            let next = Square { col: col as u8, row: row as u8 };
            match check(color, kind, from, next, board.at(next)) {
                Occupancy::Unoccupied => out.push(next),
                Occupancy::Reachable => {
                    out.push(next);
                    break;
                }
                Occupancy::Unreachable => break,
            }
        }
    }
    out
}

/// First piece in list order with a placement on `square`.
fn piece_at(square: Square, pieces: &[Piece]) -> Option<&Piece> {
    pieces.iter().find(|p| p.find(square))
}

/// Derive split actions from the basic set: for every non-pawn source, any
/// pair of its reachable targets that are each empty or held by a piece of
/// the same color and kind becomes a split.
pub fn combine_splits(actions: &mut Vec<Action>, pieces: &[Piece]) {
    let mut sources: Vec<Square> = Vec::new();
    let mut targets_by_source: Vec<Vec<Square>> = Vec::new();

    for action in actions.iter() {
        if !action.is_normal() {
            continue;
        }
        let src = action.sources[0];
        let piece = match piece_at(src, pieces) {
            Some(piece) => piece,
            None => continue,
        };
        if piece.kind == PieceKind::Pawn {
            continue;
        }
        let index = match sources.iter().position(|&s| s == src) {
            Some(index) => index,
            None => {
                sources.push(src);
                targets_by_source.push(Vec::new());
                sources.len() - 1
            }
        };
        let tgt = action.targets[0];
        match piece_at(tgt, pieces) {
            None => targets_by_source[index].push(tgt),
            Some(other) if other.color == piece.color && other.kind == piece.kind => {
                targets_by_source[index].push(tgt)
            }
            Some(_) => {}
        }
    }

    for (index, &src) in sources.iter().enumerate() {
        let targets = &targets_by_source[index];
        for a in 0..targets.len() {
            for b in a + 1..targets.len() {
                if targets[a] != targets[b] {
                    actions.push(Action::split(src, targets[a], targets[b]));
                }
            }
        }
    }
}

/// Derive merge actions: two sources whose basic moves reach one empty
/// target merge only when both squares belong to the same piece identity.
pub fn combine_merges(actions: &mut Vec<Action>, pieces: &[Piece]) {
    let mut targets: Vec<Square> = Vec::new();
    let mut sources_by_target: Vec<Vec<Square>> = Vec::new();

    for action in actions.iter() {
        if !action.is_normal() {
            continue;
        }
        let tgt = action.targets[0];
        let index = match targets.iter().position(|&t| t == tgt) {
            Some(index) => index,
            None => {
                targets.push(tgt);
                sources_by_target.push(Vec::new());
                targets.len() - 1
            }
        };
        sources_by_target[index].push(action.sources[0]);
    }

    for (index, &tgt) in targets.iter().enumerate() {
        if piece_at(tgt, pieces).is_some() {
            continue;
        }
        let sources = &sources_by_target[index];
        for a in 0..sources.len() {
            for b in a + 1..sources.len() {
                let (s1, s2) = (sources[a], sources[b]);
                if s1 == s2 {
                    continue;
                }
                if let Some(piece) = piece_at(s1, pieces) {
                    if piece.find(s2) {
                        actions.push(Action::merge(s1, s2, tgt));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Placement;

    fn sq(col: u8, row: u8) -> Square {
        Square { col, row }
    }

    #[test]
    fn knight_on_b1_has_two_destinations_at_the_start() {
        let board = Board::new();
        let dests = destinations(Color::White, PieceKind::Knight, sq(2, 1), &board);
        assert_eq!(dests, vec![sq(3, 3), sq(1, 3)]);
    }

    #[test]
    fn pawn_single_and_double_step_from_home_row() {
        let board = Board::new();
        let dests = destinations(Color::White, PieceKind::Pawn, sq(5, 2), &board);
        assert_eq!(dests, vec![sq(5, 3), sq(5, 4)]);
    }

    #[test]
    fn pawn_double_step_is_home_row_only() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Pawn, sq(5, 3)));
        let dests = destinations(Color::White, PieceKind::Pawn, sq(5, 3), &board);
        assert_eq!(dests, vec![sq(5, 4)]);
    }

    #[test]
    fn pawn_diagonal_needs_a_fully_present_opponent() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Pawn, sq(4, 4)));
        board.add_piece(Piece::at(Color::Black, PieceKind::Pawn, sq(5, 5)));
        board.add_piece(Piece::new(
            Color::Black,
            PieceKind::Knight,
            vec![Placement::new(sq(3, 5), 0.5), Placement::new(sq(3, 7), 0.5)],
        ));
        let dests = destinations(Color::White, PieceKind::Pawn, sq(4, 4), &board);
        // Forward, plus the certain pawn on e5; the half-present knight on
        // c5 is not capturable.
        assert!(dests.contains(&sq(4, 5)));
        assert!(dests.contains(&sq(5, 5)));
        assert!(!dests.contains(&sq(3, 5)));
    }

    #[test]
    fn sliders_pass_through_superposed_occupants() {
        // White rook split between a1 and d1; nothing on the a-file is
        // fully present, so a1-a8 is open all the way up.
        let mut board = Board::empty();
        board.add_piece(Piece::new(
            Color::White,
            PieceKind::Rook,
            vec![Placement::new(sq(1, 1), 0.5), Placement::new(sq(4, 1), 0.5)],
        ));
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 8)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(8, 8)));
        let dests = destinations(Color::White, PieceKind::Rook, sq(1, 1), &board);
        assert!(dests.contains(&sq(1, 8)), "rook should reach a8: {dests:?}");
    }

    #[test]
    fn rook_reports_the_king_square_for_castling() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Rook, sq(8, 1)));
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));
        let dests = destinations(Color::White, PieceKind::Rook, sq(8, 1), &board);
        assert!(dests.contains(&sq(5, 1)), "h1 rook should reach e1: {dests:?}");
    }

    #[test]
    fn no_castling_hook_for_a_superposed_king() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Rook, sq(8, 1)));
        board.add_piece(Piece::new(
            Color::White,
            PieceKind::King,
            vec![Placement::new(sq(5, 1), 0.5), Placement::new(sq(5, 2), 0.5)],
        ));
        let dests = destinations(Color::White, PieceKind::Rook, sq(8, 1), &board);
        // The half-present king does not block the ray either, so the rook
        // slides past e1 rather than castling onto it.
        assert!(dests.contains(&sq(4, 1)));
        assert!(dests.contains(&sq(5, 1)));
        assert!(dests.contains(&sq(1, 1)) || dests.contains(&sq(2, 1)));
    }
}
