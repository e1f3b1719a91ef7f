use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Stable identity of a player on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub uuid: String,
    pub name: String,
}

impl PlayerIdentity {
    /// Build an identity, deriving a placeholder name when the mapping has
    /// no entry for this uuid
    pub fn resolve(uuid: &str, known_name: Option<&String>) -> Self {
        let name = match known_name {
            Some(name) => name.clone(),
            None => {
                let prefix: String = uuid.chars().take(8).collect();
                format!("Unknown ({prefix}...)")
            }
        };

        Self {
            uuid: uuid.to_string(),
            name,
        }
    }
}

/// One player's raw statistics for the current cycle
///
/// `stats` is the nested bucket -> key -> numeric value object from the
/// player's stat file. Built fresh each cycle and never mutated.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub identity: PlayerIdentity,
    pub stats: Map<String, Value>,
}

/// One entry of the identity mapping file
///
/// The server writes additional fields (expiry and the like); anything
/// beyond uuid and name is ignored, and entries missing either are skipped.
#[derive(Debug, Deserialize)]
pub struct UserCacheEntry {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A stat file that could not be parsed this cycle
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// Result of one stats-directory scan
#[derive(Debug, Default)]
pub struct StatLoad {
    /// Records in file enumeration order
    pub records: Vec<PlayerRecord>,
    pub skipped: Vec<SkippedFile>,
}

/// Counts reported after one aggregate-and-publish cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub players: usize,
    pub skipped_files: usize,
    pub rankings: usize,
    pub published: bool,
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} players, {} rankings, {} files skipped, published: {}",
            self.players,
            self.rankings,
            self.skipped_files,
            if self.published { "yes" } else { "no" }
        )
    }
}
