use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::Error;
use crate::piece::Square;

/// One playable action: a tuple of source squares and a tuple of targets.
///
/// Three shapes are legal: a normal move (one source, one target), a split
/// (one source, two targets) and a merge (two sources, one target).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Action {
    pub sources: SmallVec<[Square; 2]>,
    pub targets: SmallVec<[Square; 2]>,
}

impl Action {
    pub fn normal(from: Square, to: Square) -> Action {
        Action {
            sources: SmallVec::from_slice(&[from]),
            targets: SmallVec::from_slice(&[to]),
        }
    }

    pub fn split(from: Square, first: Square, second: Square) -> Action {
        Action {
            sources: SmallVec::from_slice(&[from]),
            targets: SmallVec::from_slice(&[first, second]),
        }
    }

    pub fn merge(first: Square, second: Square, to: Square) -> Action {
        Action {
            sources: SmallVec::from_slice(&[first, second]),
            targets: SmallVec::from_slice(&[to]),
        }
    }

    pub fn is_normal(&self) -> bool {
        self.sources.len() == 1 && self.targets.len() == 1
    }

    pub fn is_split(&self) -> bool {
        self.sources.len() == 1 && self.targets.len() == 2
    }

    pub fn is_merge(&self) -> bool {
        self.sources.len() == 2 && self.targets.len() == 1
    }

    /// Whether the source/target arity is one of the three legal shapes.
    pub fn well_formed(&self) -> bool {
        self.is_normal() || self.is_split() || self.is_merge()
    }
}

fn join(squares: &[Square]) -> String {
    squares
        .iter()
        .map(Square::to_string)
        .collect::<Vec<_>>()
        .join("^")
}

impl fmt::Display for Action {
    /// Plain coordinate notation: `b1-c3`, `b1-a3^c3`, `a3^c3-b1`.
    ///
    /// This is the action itself, not the record string the action engine
    /// produces (which prefixes the piece letter and marks captures).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", join(&self.sources), join(&self.targets))
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Action, Error> {
        let (lhs, rhs) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidCoordinate(s.to_string()))?;
        let parse_side = |side: &str| -> Result<SmallVec<[Square; 2]>, Error> {
            side.split('^').map(str::parse).collect()
        };
        let action = Action {
            sources: parse_side(lhs)?,
            targets: parse_side(rhs)?,
        };
        if action.well_formed() {
            Ok(action)
        } else {
            Err(Error::InvalidCoordinate(s.to_string()))
        }
    }
}
