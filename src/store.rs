//! Endgame persistence adapter.
//!
//! The rest of the engine treats saved games as an opaque store: save hands
//! back an id, load hands back a piece list and whose turn it is. This
//! implementation keeps everything in one JSON file next to the process;
//! swapping in a real database only means re-implementing this module.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::piece::PieceSpec;

/// One persisted endgame. `kind` is 0 for system presets and 1 for user
/// saves; `turn` is false when White is to move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedEndgame {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub turn: bool,
    pub pieces: Vec<PieceSpec>,
}

/// The listing entry returned by [`EndgameStore::search`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndgameSummary {
    pub id: i64,
    pub name: String,
    pub turn: bool,
}

#[derive(Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: i64,
    endgames: Vec<SavedEndgame>,
}

pub struct EndgameStore {
    path: PathBuf,
}

impl EndgameStore {
    pub fn new(path: impl Into<PathBuf>) -> EndgameStore {
        EndgameStore { path: path.into() }
    }

    fn read(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| Error::Persistence(e.to_string()))
    }

    fn write(&self, file: &StoreFile) -> Result<()> {
        let text = serde_json::to_string_pretty(file)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Persist a piece list and return the new endgame's unique id.
    pub fn save(&self, pieces: Vec<PieceSpec>, name: &str, kind: u8, turn: bool) -> Result<i64> {
        let mut file = self.read()?;
        let id = file.next_id + 1;
        file.next_id = id;
        file.endgames.push(SavedEndgame {
            id,
            name: name.to_string(),
            kind,
            turn,
            pieces,
        });
        self.write(&file)?;
        tracing::info!(id, name, "saved endgame");
        Ok(id)
    }

    pub fn load(&self, id: i64) -> Result<SavedEndgame> {
        self.read()?
            .endgames
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::Persistence(format!("no endgame with id {id}")))
    }

    /// All endgames of one kind (0 = system preset, 1 = user save).
    pub fn search(&self, kind: u8) -> Result<Vec<EndgameSummary>> {
        Ok(self
            .read()?
            .endgames
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| EndgameSummary {
                id: e.id,
                name: e.name.clone(),
                turn: e.turn,
            })
            .collect())
    }

    pub fn get(&self, id: i64) -> Result<EndgameSummary> {
        let endgame = self.load(id)?;
        Ok(EndgameSummary {
            id: endgame.id,
            name: endgame.name,
            turn: endgame.turn,
        })
    }

    pub fn remove(&self, id: i64) -> Result<()> {
        let mut file = self.read()?;
        file.endgames.retain(|e| e.id != id);
        self.write(&file)
    }
}
