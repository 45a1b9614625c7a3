//! The action engine: applies one action to a board in place.
//!
//! Exactly one of six rules fires per action, tried in a fixed priority
//! order: castling, plain move (including promotion by measurement),
//! attack, meeting a friendly piece, split, merge. Whatever happens, the
//! side to move flips and the derived square map is rebuilt.

use crate::board::Board;
use crate::error::{Error, Result};
use crate::moves::Action;
use crate::piece::{certain, Piece, PieceKind, Placement, Square};

impl Board {
    /// Apply `action`, mutating this board, and return its record string.
    ///
    /// The action's shape and sources are validated (`IllegalAction`,
    /// `NoSuchPiece`); full legality checking against [`Board::actions`] is
    /// the caller's business.
    pub fn apply(&mut self, action: &Action) -> Result<String> {
        if !action.well_formed() {
            return Err(Error::IllegalAction(action.clone()));
        }
        let index = self
            .piece_index(&action.sources)
            .ok_or(Error::NoSuchPiece(action.sources[0]))?;

        let record = if action.is_split() {
            split_move(self, index, action)?
        } else if action.is_merge() {
            merge_move(self, index, action)?
        } else {
            let color = self.pieces[index].color;
            let kind = self.pieces[index].kind;
            let target = action.targets[0];
            match self.at(target) {
                Some(o)
                    if kind == PieceKind::Rook
                        && o.color == color
                        && o.kind == PieceKind::King
                        && certain(o.probability) =>
                {
                    castle(self, index, action)?
                }
                None => plain_move(self, index, action)?,
                Some(o) if o.color != color => attack(self, index, action)?,
                Some(_) => meet(self, index, action)?,
            }
        };

        self.reindex();
        self.side_to_move = self.side_to_move.opposite();
        self.last_record = record.clone();
        tracing::debug!(record = %record, side = ?self.side_to_move, "applied action");
        Ok(record)
    }
}

fn take(piece: &mut Piece, square: Square) -> Result<Placement> {
    piece.remove(square).ok_or(Error::NoSuchPiece(square))
}

/// Castling, encoded as a rook-onto-king action. The rook comes from a
/// corner, the king sits on the e-file with probability 1; both jump to
/// their castled files on the same rank, probabilities untouched.
fn castle(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let source = action.sources[0];
    let target = action.targets[0];
    let (rook_col, king_col, record) = if source.col == 1 {
        (4, 3, "0-0-0")
    } else {
        (6, 7, "0-0")
    };

    let placement = take(&mut board.pieces[index], source)?;
    board.pieces[index].add(Placement::new(
        Square { col: rook_col, row: source.row },
        placement.probability,
    ));

    let king = board
        .index_of_piece_at(target)
        .ok_or(Error::NoSuchPiece(target))?;
    let placement = take(&mut board.pieces[king], target)?;
    board.pieces[king].add(Placement::new(
        Square { col: king_col, row: target.row },
        placement.probability,
    ));

    Ok(record.to_string())
}

/// A move to an empty square.
///
/// A pawn reaching its promotion rank is measured first: only if it really
/// stood on the source does it arrive as a queen. Otherwise the moving
/// probability transfers to the target, and a fully present piece that has
/// to cross a superposed obstacle enters superposition itself, carrying the
/// obstacle's probability to the target and leaving the rest behind.
fn plain_move(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let source = action.sources[0];
    let target = action.targets[0];
    let color = board.pieces[index].color;

    if board.pieces[index].kind == PieceKind::Pawn && target.row == color.promotion_row() {
        if board.pieces[index].measure() == Some(source) {
            let piece = &mut board.pieces[index];
            piece.clear();
            piece.add(Placement::certain(target));
            piece.kind = PieceKind::Queen;
        }
        return Ok(format!("{target}-Q"));
    }

    let letter = board.pieces[index].kind.letter();
    let record = format!("{letter}{source}-{target}");

    let placement = take(&mut board.pieces[index], source)?;
    let probability = placement.probability;
    if !certain(probability) {
        board.pieces[index].add(Placement::new(target, probability));
    } else {
        let blocking = obstacle(source, target, &board.pieces);
        if blocking > 0.0 {
            board.pieces[index].add(Placement::new(target, blocking));
            board.pieces[index].add(Placement::new(source, 1.0 - blocking));
        } else {
            board.pieces[index].add(Placement::new(target, probability));
        }
    }
    Ok(record)
}

/// Capture attempt. The attacker is measured: if it turns out not to be on
/// the source square, nothing further happens (the collapse stands). If it
/// is, the defender loses its placement on the target, dying if that was
/// its last one, and the attacker lands there with certainty.
fn attack(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let source = action.sources[0];
    let target = action.targets[0];
    let letter = board.pieces[index].kind.letter();
    let record = format!("{letter}{source}x{target}");

    if board.pieces[index].measure() != Some(source) {
        return Ok(record);
    }

    if let Some(defender) = board.index_of_piece_at(target) {
        board.pieces[defender].remove(target);
    }
    let piece = &mut board.pieces[index];
    piece.clear();
    piece.add(Placement::certain(target));
    Ok(record)
}

/// Moving onto a friendly occupant, which only quantum effects make
/// possible. Same kind: the two placements trade probabilities outright.
/// Different kinds: measure the defender, and collapse the attacker onto
/// the target only once measurement shows the square was actually free and
/// the attacker actually stood on its source.
fn meet(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let source = action.sources[0];
    let target = action.targets[0];
    let letter = board.pieces[index].kind.letter();
    let record = format!("{letter}{source}-{target}");

    let other = board
        .index_of_piece_at(target)
        .ok_or(Error::NoSuchPiece(target))?;

    if board.pieces[index].kind == board.pieces[other].kind {
        let mine = take(&mut board.pieces[index], source)?;
        let theirs = take(&mut board.pieces[other], target)?;
        board.pieces[index].add(Placement::new(target, mine.probability));
        board.pieces[other].add(Placement::new(source, theirs.probability));
        return Ok(record);
    }

    let defender_square = board.pieces[other].measure();
    if !board.pieces[index].superposed() {
        if defender_square != Some(target) {
            let piece = &mut board.pieces[index];
            piece.clear();
            piece.add(Placement::certain(target));
        }
    } else {
        let attacker_square = board.pieces[index].measure();
        if defender_square != Some(target) && attacker_square == Some(source) {
            let piece = &mut board.pieces[index];
            piece.clear();
            piece.add(Placement::certain(target));
        }
    }
    Ok(record)
}

/// Split: the source probability arrives halved on each target. Occupied
/// targets trade places with the mover; with both targets occupied the
/// three placements rotate instead.
fn split_move(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let source = action.sources[0];
    let (first, second) = (action.targets[0], action.targets[1]);
    let letter = board.pieces[index].kind.letter();
    let record = format!("{letter}{source}-{first}^{second}");

    let on_first = board.index_of_piece_at(first);
    let on_second = board.index_of_piece_at(second);

    if let (Some(a), Some(b)) = (on_first, on_second) {
        let moving = take(&mut board.pieces[index], source)?;
        let displaced_first = take(&mut board.pieces[a], first)?;
        let displaced_second = take(&mut board.pieces[b], second)?;
        board.pieces[index].add(Placement::new(first, moving.probability));
        board.pieces[a].add(Placement::new(second, displaced_first.probability));
        board.pieces[b].add(Placement::new(source, displaced_second.probability));
        return Ok(record);
    }

    if let Some(a) = on_first {
        let displaced = take(&mut board.pieces[a], first)?;
        board.pieces[a].add(Placement::new(source, displaced.probability));
    }
    if let Some(b) = on_second {
        let displaced = take(&mut board.pieces[b], second)?;
        board.pieces[b].add(Placement::new(source, displaced.probability));
    }
    let moving = take(&mut board.pieces[index], source)?;
    board.pieces[index].add(Placement::new(first, moving.probability / 2.0));
    board.pieces[index].add(Placement::new(second, moving.probability / 2.0));
    Ok(record)
}

/// Merge: both source placements of one piece pool their probability on the
/// target.
fn merge_move(board: &mut Board, index: usize, action: &Action) -> Result<String> {
    let (first, second) = (action.sources[0], action.sources[1]);
    let target = action.targets[0];
    let letter = board.pieces[index].kind.letter();
    let record = format!("{letter}{first}^{second}-{target}");

    let from_first = take(&mut board.pieces[index], first)?;
    let from_second = take(&mut board.pieces[index], second)?;
    board.pieces[index].add(Placement::new(
        target,
        from_first.probability + from_second.probability,
    ));
    Ok(record)
}

/// Probability of hitting an obstacle strictly between `source` and
/// `target` along a rank, file or diagonal. The first piece in list order
/// with any mass on an intermediate square decides; knight-style paths
/// have no intermediate squares and return 0.
fn obstacle(source: Square, target: Square, pieces: &[Piece]) -> f64 {
    let dc = target.col as i16 - source.col as i16;
    let dr = target.row as i16 - source.row as i16;
    if dc != 0 && dr != 0 && dc.abs() != dr.abs() {
        return 0.0;
    }
    let step_c = dc.signum();
    let step_r = dr.signum();
    let mut col = source.col as i16 + step_c;
    let mut row = source.row as i16 + step_r;
    while (col, row) != (target.col as i16, target.row as i16) {
        let square = Square { col: col as u8, row: row as u8 };
        for piece in pieces {
            let p = piece.get(square);
            if p > 0.0 {
                return p;
            }
        }
        col += step_c;
        row += step_r;
    }
    0.0
}
