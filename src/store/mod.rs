use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde_json::{Map, Value};

use crate::config::DataSettings;
use crate::domain::{PlayerIdentity, PlayerRecord, SkippedFile, StatLoad, UserCacheEntry};

const STAT_FILE_EXT: &str = "json";

/// Loads per-player stat files and the identity mapping for one cycle
///
/// Every input is allowed to be missing or partially broken: missing inputs
/// degrade to empty results and unparsable files are skipped individually,
/// so a single bad file never aborts a cycle.
pub struct StatRecordStore {
    usercache_path: PathBuf,
    stats_dir: PathBuf,
}

impl StatRecordStore {
    pub fn new(data: &DataSettings) -> Self {
        Self {
            usercache_path: data.usercache_path.clone(),
            stats_dir: data.stats_dir.clone(),
        }
    }

    /// Scan the stats directory and produce this cycle's records
    pub fn load(&self) -> Result<StatLoad> {
        let identities = self.load_identity_map();
        self.load_records(&identities)
    }

    /// Parse the uuid -> display-name mapping
    ///
    /// A missing or malformed mapping file yields an empty map; display
    /// names then fall back to the placeholder form. Entries missing either
    /// field are skipped individually.
    pub fn load_identity_map(&self) -> HashMap<String, String> {
        let raw = match fs::read_to_string(&self.usercache_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Identity mapping {} unavailable: {}",
                    self.usercache_path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        let entries: Vec<UserCacheEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to parse identity mapping {}: {}",
                    self.usercache_path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match (entry.uuid, entry.name) {
                (Some(uuid), Some(name)) if !uuid.is_empty() && !name.is_empty() => {
                    Some((uuid, name))
                }
                _ => None,
            })
            .collect()
    }

    fn load_records(&self, identities: &HashMap<String, String>) -> Result<StatLoad> {
        let mut load = StatLoad::default();

        let entries = match fs::read_dir(&self.stats_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Stats directory {} unavailable: {}",
                    self.stats_dir.display(),
                    e
                );
                return Ok(load);
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to list {}", self.stats_dir.display()))?;
            let path = entry.path();
            if Self::is_stat_file(&path) {
                paths.push(path);
            }
        }
        // Deterministic enumeration order; ranking tie-breaks depend on it
        paths.sort();

        for path in paths {
            let Some(uuid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let identity = PlayerIdentity::resolve(uuid, identities.get(uuid));

            let stats = match Self::parse_stat_file(&path) {
                Ok(stats) => stats,
                Err(e) => {
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    warn!("Failed to parse {file_name}: {e:#}");
                    load.skipped.push(SkippedFile {
                        file_name,
                        reason: format!("{e:#}"),
                    });
                    Map::new()
                }
            };

            load.records.push(PlayerRecord { identity, stats });
        }

        Ok(load)
    }

    /// Extract the nested stats object from one stat file
    ///
    /// A document without a "stats" key parses to an empty object; only
    /// unreadable or syntactically invalid files are errors.
    fn parse_stat_file(path: &Path) -> Result<Map<String, Value>> {
        let raw = fs::read_to_string(path).context("Failed to read stat file")?;
        let document: Value =
            serde_json::from_str(&raw).context("Failed to parse stat file")?;

        let stats = document
            .get("stats")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(stats)
    }

    fn is_stat_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(STAT_FILE_EXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> StatRecordStore {
        let data = DataSettings {
            usercache_path: dir.path().join("usercache.json"),
            stats_dir: dir.path().join("stats"),
            output_path: dir.path().join("ranking.md"),
        };
        StatRecordStore::new(&data)
    }

    fn write_stats(dir: &TempDir, file_name: &str, content: &str) {
        let stats_dir = dir.path().join("stats");
        fs::create_dir_all(&stats_dir).unwrap();
        fs::write(stats_dir.join(file_name), content).unwrap();
    }

    #[test]
    fn missing_stats_dir_is_empty_not_an_error() {
        let dir = TempDir::new().unwrap();
        let load = test_store(&dir).load().unwrap();

        assert!(load.records.is_empty());
        assert!(load.skipped.is_empty());
    }

    #[test]
    fn malformed_stat_file_yields_empty_record_and_skip_entry() {
        let dir = TempDir::new().unwrap();
        write_stats(&dir, "aaaa.json", "not json at all");
        write_stats(
            &dir,
            "bbbb.json",
            r#"{ "stats": { "minecraft:custom": { "minecraft:jump": 3 } } }"#,
        );

        let load = test_store(&dir).load().unwrap();

        assert_eq!(load.records.len(), 2);
        assert_eq!(load.skipped.len(), 1);
        assert_eq!(load.skipped[0].file_name, "aaaa.json");

        let broken = &load.records[0];
        assert!(broken.stats.is_empty());
        let intact = &load.records[1];
        assert!(!intact.stats.is_empty());
    }

    #[test]
    fn missing_identity_map_uses_placeholder_names() {
        let dir = TempDir::new().unwrap();
        write_stats(&dir, "123e4567-e89b.json", r#"{ "stats": {} }"#);

        let load = test_store(&dir).load().unwrap();
        assert_eq!(load.records[0].identity.name, "Unknown (123e4567...)");
    }

    #[test]
    fn identity_map_skips_incomplete_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("usercache.json"),
            r#"[
                { "name": "Alex", "uuid": "u-1", "expiresOn": "2026-01-01" },
                { "uuid": "u-2" },
                { "name": "Ghost" },
                { "uuid": "", "name": "" }
            ]"#,
        )
        .unwrap();

        let identities = test_store(&dir).load_identity_map();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities["u-1"], "Alex");
    }

    #[test]
    fn mapped_names_reach_the_records() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("usercache.json"),
            r#"[ { "uuid": "u-1", "name": "Alex" } ]"#,
        )
        .unwrap();
        write_stats(&dir, "u-1.json", r#"{ "stats": {} }"#);

        let load = test_store(&dir).load().unwrap();
        assert_eq!(load.records[0].identity.name, "Alex");
    }

    #[test]
    fn non_json_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_stats(&dir, "u-1.json", r#"{ "stats": {} }"#);
        write_stats(&dir, "notes.txt", "scratch");

        let load = test_store(&dir).load().unwrap();
        assert_eq!(load.records.len(), 1);
    }

    #[test]
    fn records_come_back_in_sorted_file_order() {
        let dir = TempDir::new().unwrap();
        write_stats(&dir, "cccc.json", r#"{ "stats": {} }"#);
        write_stats(&dir, "aaaa.json", r#"{ "stats": {} }"#);
        write_stats(&dir, "bbbb.json", r#"{ "stats": {} }"#);

        let load = test_store(&dir).load().unwrap();
        let uuids: Vec<&str> = load.records.iter().map(|r| r.identity.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["aaaa", "bbbb", "cccc"]);
    }
}
