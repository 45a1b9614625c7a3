use std::fmt;

use serde::Serialize;

use crate::moves::Action;
use crate::piece::{Color, Piece, PieceKind, PieceSpec, Square, Winner};
use crate::rules;

/// What the derived square map knows about a square: color, kind and
/// probability, but not which piece identity it belongs to.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Occupant {
    pub color: Color,
    pub kind: PieceKind,
    pub probability: f64,
}

/// The sixteen-piece army each side starts with, in the order the captured
/// accounting consumes slots.
const STANDARD_ARMY: [PieceKind; 16] = [
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Kinds missing from each side compared to the standard army.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapturedPieces {
    pub white: Vec<PieceKind>,
    pub black: Vec<PieceKind>,
}

/// The live position: an ordered list of quantum pieces, the side to move
/// and the record of the last action played.
///
/// A derived square map is kept alongside the piece list and rebuilt after
/// every mutation; rules read occupancy from it, while anything that needs
/// piece identity scans the list.
#[derive(Clone, Debug)]
pub struct Board {
    pub pieces: Vec<Piece>,
    pub side_to_move: Color,
    pub last_record: String,
    squares: [[Option<Occupant>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with White to move. Useful for test positions.
    pub fn empty() -> Board {
        Board {
            pieces: Vec::new(),
            side_to_move: Color::White,
            last_record: String::new(),
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting position.
    pub fn new() -> Board {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Board::empty();
        for (color, rank, pawn_rank) in [(Color::White, 1, 2), (Color::Black, 8, 7)] {
            for (i, &kind) in back_rank.iter().enumerate() {
                let square = Square { col: i as u8 + 1, row: rank };
                board.pieces.push(Piece::at(color, kind, square));
            }
            for col in 1..=8 {
                let square = Square { col, row: pawn_rank };
                board.pieces.push(Piece::at(color, PieceKind::Pawn, square));
            }
        }
        board.reindex();
        board
    }

    /// Build a board from externally supplied pieces; White to move.
    pub fn from_specs(specs: &[PieceSpec]) -> Board {
        let mut board = Board::empty();
        board.pieces = specs.iter().map(Piece::from).collect();
        board.reindex();
        board
    }

    pub fn to_specs(&self) -> Vec<PieceSpec> {
        self.pieces.iter().map(PieceSpec::from).collect()
    }

    /// Add one piece and refresh the derived map.
    pub fn add_piece(&mut self, piece: Piece) {
        self.pieces.push(piece);
        self.reindex();
    }

    /// Rebuild the derived square map from the piece list. Where placements
    /// overlap, the later piece in list order wins, matching the identity
    /// blindness of the map.
    pub fn reindex(&mut self) {
        self.squares = [[None; 8]; 8];
        for piece in &self.pieces {
            for placement in &piece.placements {
                let square = placement.square;
                self.squares[square.row as usize - 1][square.col as usize - 1] = Some(Occupant {
                    color: piece.color,
                    kind: piece.kind,
                    probability: placement.probability,
                });
            }
        }
    }

    pub fn at(&self, square: Square) -> Option<Occupant> {
        self.squares[square.row as usize - 1][square.col as usize - 1]
    }

    /// Every occupied square with its map entry, in column-major-free
    /// deterministic order (rows 1..8, columns 1..8).
    pub fn occupants(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        (1..=8u8).flat_map(move |row| {
            (1..=8u8).filter_map(move |col| {
                let square = Square { col, row };
                self.at(square).map(|occupant| (square, occupant))
            })
        })
    }

    /// First piece in list order holding a placement on `square`.
    pub(crate) fn index_of_piece_at(&self, square: Square) -> Option<usize> {
        self.pieces.iter().position(|p| p.find(square))
    }

    /// The piece identity owning all of `squares` at once, if one exists.
    /// Merge actions rely on this to tie two sources to a single piece.
    pub fn piece_index(&self, squares: &[Square]) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| squares.iter().all(|&s| p.find(s)))
    }

    /// The full legal action set for the side to move: basic moves from
    /// every placement of every friendly piece, then derived splits and
    /// merges. Enumeration order is stable across calls.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        for piece in &self.pieces {
            if piece.color != self.side_to_move {
                continue;
            }
            for placement in &piece.placements {
                for dest in rules::destinations(piece.color, piece.kind, placement.square, self) {
                    actions.push(Action::normal(placement.square, dest));
                }
            }
        }
        rules::combine_splits(&mut actions, &self.pieces);
        rules::combine_merges(&mut actions, &self.pieces);
        actions
    }

    /// The game ends only by king capture: a side without a living king has
    /// lost, and losing both at once is a draw.
    pub fn winner(&self) -> Winner {
        let king_alive = |color: Color| {
            self.pieces
                .iter()
                .any(|p| p.color == color && p.kind == PieceKind::King && p.alive())
        };
        match (king_alive(Color::White), king_alive(Color::Black)) {
            (true, true) => Winner::Null,
            (true, false) => Winner::White,
            (false, true) => Winner::Black,
            (false, false) => Winner::Draw,
        }
    }

    /// Kinds missing per side compared to the standard army. Each living
    /// piece consumes its own slot if one is free; a promoted extra falls
    /// back to consuming a pawn slot.
    pub fn captured(&self) -> CapturedPieces {
        let mut white: Vec<PieceKind> = STANDARD_ARMY.to_vec();
        let mut black: Vec<PieceKind> = STANDARD_ARMY.to_vec();
        for piece in &self.pieces {
            if !piece.placements.iter().any(|p| p.probability != 0.0) {
                continue;
            }
            let slots = match piece.color {
                Color::White => &mut white,
                Color::Black => &mut black,
            };
            if let Some(pos) = slots.iter().position(|&k| k == piece.kind) {
                slots.remove(pos);
            } else if let Some(pos) = slots.iter().position(|&k| k == PieceKind::Pawn) {
                slots.remove(pos);
            }
        }
        CapturedPieces { white, black }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  +{}+", "-".repeat(24))?;
        for row in (1..=8u8).rev() {
            write!(f, "{row} |")?;
            for col in 1..=8u8 {
                match self.at(Square { col, row }) {
                    None => write!(f, " . ")?,
                    Some(o) => {
                        let letter = match o.color {
                            Color::White => o.kind.abbrev(),
                            Color::Black => o.kind.abbrev().to_ascii_lowercase(),
                        };
                        write!(f, " {letter} ")?;
                    }
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  +{}+", "-".repeat(24))?;
        write!(f, "    a  b  c  d  e  f  g  h")
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
    fn starting_position_has_22_actions() {
        let board = Board::new();
        let actions = board.actions();

        let normals = actions.iter().filter(|a| a.is_normal()).count();
        let splits = actions.iter().filter(|a| a.is_split()).count();
        let merges = actions.iter().filter(|a| a.is_merge()).count();

        // 16 pawn moves and 4 knight moves, plus one split per knight
        // (both of its home destinations are empty).
        assert_eq!(normals, 20, "actions: {actions:?}");
        assert_eq!(splits, 2);
        assert_eq!(merges, 0);
        assert_eq!(actions.len(), 22);
        assert!(actions.contains(&Action::split(sq(2, 1), sq(3, 3), sq(1, 3))));
        assert!(actions.contains(&Action::split(sq(7, 1), sq(8, 3), sq(6, 3))));
    }

    #[test]
    fn lone_knight_can_split_to_both_home_squares() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Knight, sq(2, 1)));
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));
        let actions = board.actions();
        assert!(
            actions.contains(&Action::split(sq(2, 1), sq(3, 3), sq(1, 3)))
                || actions.contains(&Action::split(sq(2, 1), sq(1, 3), sq(3, 3))),
            "knight split missing from {actions:?}"
        );
    }

    #[test]
    fn pawns_never_split() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Pawn, sq(5, 2)));
        let actions = board.actions();
        assert_eq!(actions.len(), 2, "single and double step only: {actions:?}");
        assert!(actions.iter().all(|a| !a.is_split()));
    }

    #[test]
    fn superposed_piece_can_merge_into_an_empty_square() {
        let mut board = Board::empty();
        board.add_piece(Piece::new(
            Color::White,
            PieceKind::Knight,
            vec![Placement::new(sq(1, 3), 0.5), Placement::new(sq(3, 3), 0.5)],
        ));
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));
        let actions = board.actions();
        assert!(
            actions.contains(&Action::merge(sq(1, 3), sq(3, 3), sq(2, 1))),
            "merge to b1 missing from {actions:?}"
        );
        assert!(actions.contains(&Action::merge(sq(1, 3), sq(3, 3), sq(2, 5))));
    }

    #[test]
    fn two_separate_pieces_never_merge() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::Knight, sq(1, 3)));
        board.add_piece(Piece::at(Color::White, PieceKind::Knight, sq(3, 3)));
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));
        let actions = board.actions();
        assert!(actions.iter().all(|a| !a.is_merge()), "{actions:?}");
    }

    #[test]
    fn enumeration_order_is_stable() {
        let board = Board::new();
        assert_eq!(board.actions(), board.actions());
    }

    #[test]
    fn winner_tracks_the_kings() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));
        assert_eq!(board.winner(), Winner::Null);

        let black_king = board
            .pieces
            .iter()
            .position(|p| p.color == Color::Black)
            .unwrap();
        board.pieces[black_king].clear();
        board.reindex();
        assert_eq!(board.winner(), Winner::White);

        board.pieces[0].clear();
        board.reindex();
        assert_eq!(board.winner(), Winner::Draw);
    }

    #[test]
    fn captured_accounting_lets_promotion_consume_a_pawn_slot() {
        let mut board = Board::empty();
        board.add_piece(Piece::at(Color::White, PieceKind::King, sq(5, 1)));
        board.add_piece(Piece::at(Color::White, PieceKind::Queen, sq(4, 1)));
        // A second queen can only come from promotion.
        board.add_piece(Piece::at(Color::White, PieceKind::Queen, sq(1, 8)));
        board.add_piece(Piece::at(Color::Black, PieceKind::King, sq(5, 8)));

        let captured = board.captured();
        let pawns = captured
            .white
            .iter()
            .filter(|&&k| k == PieceKind::Pawn)
            .count();
        assert_eq!(pawns, 7, "one pawn slot consumed by the promoted queen");
        assert!(!captured.white.contains(&PieceKind::Queen));
        assert!(!captured.white.contains(&PieceKind::King));
        assert_eq!(captured.black.len(), 15);
    }

    #[test]
    fn specs_round_trip_preserves_the_board() {
        let board = Board::new();
        let rebuilt = Board::from_specs(&board.to_specs());
        for row in 1..=8u8 {
            for col in 1..=8u8 {
                let square = sq(col, row);
                assert_eq!(board.at(square), rebuilt.at(square), "mismatch at {square}");
            }
        }
    }
}
