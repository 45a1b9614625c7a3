//! Start-up configuration: a frozen set of named tunables.
//!
//! Built once (from a JSON file or the built-in defaults) and passed into
//! constructors; nothing mutates it afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::eval::Evaluator;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Evaluator handed to agents built from the registry.
    pub evaluator: Evaluator,
    pub minimax_depth: u32,
    pub alphabeta_depth: u32,
    pub beam_depth: u32,
    pub beam_width: usize,
    /// Where the endgame store keeps its data.
    pub store_path: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            evaluator: Evaluator::QuantumValueTable,
            minimax_depth: 1,
            alphabeta_depth: 2,
            beam_depth: 4,
            beam_width: 3,
            store_path: PathBuf::from("endgames.json"),
        }
    }
}

impl Config {
    /// Read the configuration from `path`, writing the defaults there
    /// first if the file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Config> {
        if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| Error::Config(e.to_string()))?;
            serde_json::from_str(&text).map_err(|e| Error::Config(e.to_string()))
        } else {
            let config = Config::default();
            let text = serde_json::to_string_pretty(&config)
                .map_err(|e| Error::Config(e.to_string()))?;
            fs::write(path, text).map_err(|e| Error::Config(e.to_string()))?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_tuning() {
        let config = Config::default();
        assert_eq!(config.evaluator, Evaluator::QuantumValueTable);
        assert_eq!(config.minimax_depth, 1);
        assert_eq!(config.alphabeta_depth, 2);
        assert_eq!(config.beam_depth, 4);
        assert_eq!(config.beam_width, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"alphabeta_depth": 4}"#).unwrap();
        assert_eq!(config.alphabeta_depth, 4);
        assert_eq!(config.beam_width, 3);
        assert_eq!(config.evaluator, Evaluator::QuantumValueTable);
    }

    #[test]
    fn load_or_init_writes_then_reads_the_same_file() {
        let path = std::env::temp_dir().join(format!(
            "qchess-config-{}-{}.json",
            std::process::id(),
            line!()
        ));
        let _ = fs::remove_file(&path);

        let written = Config::load_or_init(&path).unwrap();
        assert!(path.exists());
        let read = Config::load_or_init(&path).unwrap();
        assert_eq!(written.beam_depth, read.beam_depth);
        assert_eq!(written.store_path, read.store_path);

        let _ = fs::remove_file(&path);
    }
}
