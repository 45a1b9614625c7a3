//! The game controller: one board, two agents, an undo stack and the
//! bridge to the endgame store. This is the synchronous facade the outer
//! HTTP layer drives; every operation here runs to completion.

use std::collections::BTreeMap;

use crate::agent::Agent;
use crate::board::{Board, CapturedPieces};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::moves::Action;
use crate::piece::{Color, PieceKind, PieceSpec, Winner};
use crate::store::{EndgameStore, EndgameSummary};

pub struct Game {
    config: Config,
    store: EndgameStore,
    board: Option<Board>,
    white: Agent,
    black: Agent,
    records: Vec<String>,
    undo_stack: Vec<Board>,
}

impl Game {
    pub fn new(config: Config) -> Game {
        let store = EndgameStore::new(&config.store_path);
        Game {
            config,
            store,
            board: None,
            white: Agent::Human,
            black: Agent::Human,
            records: Vec::new(),
            undo_stack: Vec::new(),
        }
    }

    /// The wire names the agent registry understands.
    pub fn agent_names() -> &'static [&'static str] {
        &Agent::NAMES
    }

    pub fn set_white(&mut self, name: &str) -> Result<()> {
        self.white = Agent::from_name(name, &self.config)
            .ok_or_else(|| Error::Config(format!("unknown agent {name:?}")))?;
        Ok(())
    }

    pub fn set_black(&mut self, name: &str) -> Result<()> {
        self.black = Agent::from_name(name, &self.config)
            .ok_or_else(|| Error::Config(format!("unknown agent {name:?}")))?;
        Ok(())
    }

    /// Replace an agent with an explicitly configured one.
    pub fn set_white_agent(&mut self, agent: Agent) {
        self.white = agent;
    }

    pub fn set_black_agent(&mut self, agent: Agent) {
        self.black = agent;
    }

    pub fn white(&self) -> &Agent {
        &self.white
    }

    pub fn black(&self) -> &Agent {
        &self.black
    }

    /// Start a game from a piece list; an empty list means the standard
    /// starting position. White moves first.
    pub fn start(&mut self, pieces: &[PieceSpec]) {
        let board = if pieces.is_empty() {
            Board::new()
        } else {
            Board::from_specs(pieces)
        };
        self.board = Some(board);
        self.records.clear();
        self.undo_stack.clear();
    }

    /// Start from a saved endgame, restoring whose turn it is.
    pub fn load(&mut self, id: i64) -> Result<()> {
        let saved = self.store.load(id)?;
        let mut board = Board::from_specs(&saved.pieces);
        board.side_to_move = if saved.turn { Color::Black } else { Color::White };
        self.board = Some(board);
        self.records.clear();
        self.undo_stack.clear();
        Ok(())
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn actions(&self) -> Result<Vec<Action>> {
        let board = self.board.as_ref().ok_or(Error::NoGame)?;
        Ok(board.actions())
    }

    /// Play one turn. With an explicit action the side to move must be a
    /// human and the action must be legal; without one, the configured
    /// agent chooses. The pre-move board is pushed onto the undo stack and
    /// any failure leaves the position untouched.
    pub fn run(&mut self, action: Option<&Action>) -> Result<String> {
        let board = self.board.as_mut().ok_or(Error::NoGame)?;
        let agent = match board.side_to_move {
            Color::White => &self.white,
            Color::Black => &self.black,
        };
        let snapshot = board.clone();
        let outcome = match action {
            Some(action) => {
                if *agent != Agent::Human {
                    Err(Error::IllegalAction(action.clone()))
                } else if !board.actions().contains(action) {
                    Err(Error::IllegalAction(action.clone()))
                } else {
                    board.apply(action)
                }
            }
            None => agent.run(board),
        };
        match outcome {
            Ok(record) => {
                tracing::debug!(agent = agent.name(), record = %record, "turn played");
                self.undo_stack.push(snapshot);
                self.records.push(record.clone());
                Ok(record)
            }
            Err(error) => {
                *board = snapshot;
                Err(error)
            }
        }
    }

    /// Restore the position before the last applied action. Returns false
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.board = Some(previous);
                self.records.pop();
                true
            }
            None => false,
        }
    }

    /// Save the live position as a user endgame and return its id.
    pub fn save(&self, name: &str) -> Result<i64> {
        let board = self.board.as_ref().ok_or(Error::NoGame)?;
        self.store.save(
            board.to_specs(),
            name,
            1,
            board.side_to_move == Color::Black,
        )
    }

    pub fn search_saved(&self, kind: u8) -> Result<Vec<EndgameSummary>> {
        self.store.search(kind)
    }

    pub fn get_saved(&self, id: i64) -> Result<EndgameSummary> {
        self.store.get(id)
    }

    pub fn remove_saved(&self, id: i64) -> Result<()> {
        self.store.remove(id)
    }

    /// Drop the live game, its records and its undo history.
    pub fn end(&mut self) {
        self.board = None;
        self.records.clear();
        self.undo_stack.clear();
    }

    /// The derived square map in wire form: `"colrow"` keys mapping to
    /// (color, kind, probability) triples.
    pub fn square_map(&self) -> Result<BTreeMap<String, (Color, PieceKind, f64)>> {
        let board = self.board.as_ref().ok_or(Error::NoGame)?;
        Ok(board
            .occupants()
            .map(|(square, o)| {
                let key = format!("{}{}", square.col, square.row);
                (key, (o.color, o.kind, o.probability))
            })
            .collect())
    }

    pub fn captured(&self) -> Result<CapturedPieces> {
        let board = self.board.as_ref().ok_or(Error::NoGame)?;
        Ok(board.captured())
    }

    pub fn winner(&self) -> Winner {
        match &self.board {
            Some(board) => board.winner(),
            None => Winner::Null,
        }
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Square;

    fn sq(col: u8, row: u8) -> Square {
        Square { col, row }
    }

    fn temp_config(tag: &str) -> Config {
        let mut config = Config::default();
        config.store_path = std::env::temp_dir().join(format!(
            "qchess-game-{}-{tag}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&config.store_path);
        config
    }

    #[test]
    fn fresh_game_has_no_winner_and_22_actions() {
        let mut game = Game::new(temp_config("fresh"));
        game.start(&[]);
        assert_eq!(game.winner(), Winner::Null);
        assert_eq!(game.actions().unwrap().len(), 22);
        assert!(game.captured().unwrap().white.is_empty());
        assert!(game.captured().unwrap().black.is_empty());
    }

    #[test]
    fn human_move_applies_and_undo_restores_exactly() {
        let mut game = Game::new(temp_config("undo"));
        game.start(&[]);
        let before = game.square_map().unwrap();

        let record = game
            .run(Some(&Action::normal(sq(5, 2), sq(5, 4))))
            .unwrap();
        assert_eq!(record, "e2-e4");
        assert_eq!(game.records(), ["e2-e4"]);
        assert_ne!(game.square_map().unwrap(), before);

        assert!(game.undo());
        assert_eq!(game.square_map().unwrap(), before);
        assert!(game.records().is_empty());
        assert!(!game.undo(), "nothing left to undo");
    }

    #[test]
    fn illegal_human_moves_leave_the_board_alone() {
        let mut game = Game::new(temp_config("illegal"));
        game.start(&[]);
        let before = game.square_map().unwrap();

        // A rook buried behind its own pawn cannot move.
        let err = game
            .run(Some(&Action::normal(sq(1, 1), sq(1, 4))))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalAction(_)));
        assert_eq!(game.square_map().unwrap(), before);
        assert!(game.records().is_empty());
    }

    #[test]
    fn explicit_actions_are_refused_for_engine_agents() {
        let mut game = Game::new(temp_config("engine"));
        game.set_white("Random").unwrap();
        game.start(&[]);
        let err = game
            .run(Some(&Action::normal(sq(5, 2), sq(5, 4))))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalAction(_)));
    }

    #[test]
    fn agent_turns_alternate_through_the_facade() {
        crate::rng::seed(23);
        let mut game = Game::new(temp_config("alternate"));
        game.set_white("Random").unwrap();
        game.set_black("Greedy").unwrap();
        game.start(&[]);
        game.run(None).unwrap();
        game.run(None).unwrap();
        assert_eq!(game.records().len(), 2);
        assert_eq!(
            game.board().unwrap().side_to_move,
            Color::White,
            "two turns bring White back on move"
        );
    }

    #[test]
    fn save_then_load_restores_position_and_turn() {
        let mut game = Game::new(temp_config("saveload"));
        game.start(&[]);
        game.run(Some(&Action::normal(sq(4, 2), sq(4, 4)))).unwrap();
        let map = game.square_map().unwrap();

        let id = game.save("after d4").unwrap();
        game.end();
        assert!(game.actions().is_err());

        game.load(id).unwrap();
        assert_eq!(game.square_map().unwrap(), map);
        assert_eq!(game.board().unwrap().side_to_move, Color::Black);

        let saves = game.search_saved(1).unwrap();
        assert_eq!(saves.len(), 1);
        assert!(saves[0].turn);
    }

    #[test]
    fn saved_endgames_can_be_inspected_and_removed() {
        let mut game = Game::new(temp_config("remove"));
        game.start(&[]);
        let id = game.save("throwaway").unwrap();

        let summary = game.get_saved(id).unwrap();
        assert_eq!(summary.id, id);
        assert_eq!(summary.name, "throwaway");
        assert!(!summary.turn);

        game.remove_saved(id).unwrap();
        assert!(game.search_saved(1).unwrap().is_empty());
        assert!(game.get_saved(id).is_err());
        assert!(game.load(id).is_err());
    }

    #[test]
    fn unknown_agent_names_are_rejected() {
        let mut game = Game::new(temp_config("names"));
        assert!(game.set_white("Oracle").is_err());
        assert!(Game::agent_names().contains(&"BeamSearch"));
    }
}
