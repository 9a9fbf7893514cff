//! Persistent strategy storage
//!
//! Strategies live under string keys. The built-in presets are always
//! the fallback when nothing has been stored yet.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::strategy::{
    display_name, preset_rank, presets, NamedStrategy, RuleSpec, Strategy, StrategyError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access strategy store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("strategy store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("strategy `{key}` is invalid: {source}")]
    Strategy {
        key: String,
        #[source]
        source: StrategyError,
    },
}

/// Keyed strategy persistence
pub trait StrategyStore {
    /// All stored strategies in display order
    fn load_all(&self) -> Result<Vec<NamedStrategy>, StoreError>;

    /// Insert or replace the strategy under `key`
    fn save(&mut self, key: &str, strategy: &Strategy) -> Result<(), StoreError>;

    /// Forget everything and go back to the built-in presets
    fn reset(&mut self) -> Result<(), StoreError>;

    fn load(&self, key: &str) -> Result<Option<NamedStrategy>, StoreError> {
        Ok(self.load_all()?.into_iter().find(|s| s.key == key))
    }
}

fn upsert(entries: &mut Vec<NamedStrategy>, key: &str, strategy: &Strategy) -> Result<(), StoreError> {
    strategy.validate().map_err(|source| StoreError::Strategy {
        key: key.to_string(),
        source,
    })?;

    match entries.iter_mut().find(|s| s.key == key) {
        Some(existing) => existing.strategy = strategy.clone(),
        None => entries.push(NamedStrategy::new(key, display_name(key), strategy.clone())),
    }
    Ok(())
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Store that lives only as long as the process
#[derive(Clone, Debug)]
pub struct MemoryStore {
    entries: Vec<NamedStrategy>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self { entries: presets() }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StrategyStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<NamedStrategy>, StoreError> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, key: &str, strategy: &Strategy) -> Result<(), StoreError> {
        upsert(&mut self.entries, key, strategy)
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        self.entries = presets();
        Ok(())
    }
}

// ============================================================================
// JSON FILE
// ============================================================================

/// Store backed by a single JSON file
///
/// Reads either an array of `{key, name, rules}` objects or a flat
/// `{key: [rules...]}` map. Always writes the array form.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<Vec<NamedStrategy>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let value: serde_json::Value = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        // The top-level shape picks the form; rules are checked per entry below
        let stored = if value.is_object() {
            serde_json::from_value::<BTreeMap<String, Vec<RuleSpec>>>(value).map(from_map)
        } else {
            serde_json::from_value::<Vec<StoredEntry>>(value)
        }
        .map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        stored
            .into_iter()
            .map(|entry| {
                let strategy = Strategy::from_specs(entry.rules).map_err(|source| StoreError::Strategy {
                    key: entry.key.clone(),
                    source,
                })?;
                Ok::<_, StoreError>(NamedStrategy::new(entry.key, entry.name, strategy))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn write(&self, entries: &[NamedStrategy]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// One array-form entry before its rules are parsed
#[derive(Deserialize)]
struct StoredEntry {
    key: String,
    name: String,
    rules: Vec<RuleSpec>,
}

/// Canonical preset keys first, remaining keys ascending
fn from_map(map: BTreeMap<String, Vec<RuleSpec>>) -> Vec<StoredEntry> {
    let mut entries: Vec<StoredEntry> = map
        .into_iter()
        .map(|(key, rules)| StoredEntry {
            name: display_name(&key),
            key,
            rules,
        })
        .collect();
    entries.sort_by_key(|e| preset_rank(&e.key).unwrap_or(usize::MAX));
    entries
}

impl StrategyStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<NamedStrategy>, StoreError> {
        Ok(self.read()?.unwrap_or_else(presets))
    }

    fn save(&mut self, key: &str, strategy: &Strategy) -> Result<(), StoreError> {
        let mut entries = self.load_all()?;
        upsert(&mut entries, key, strategy)?;
        self.write(&entries)
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Action, Condition, Operator, Rule};

    fn temp_store(name: &str) -> JsonFileStore {
        let path = std::env::temp_dir().join(format!("xplore-store-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        JsonFileStore::new(path)
    }

    fn always_mine() -> Strategy {
        Strategy::new(vec![Rule::always("m1", Action::MineCurrent)])
    }

    #[test]
    fn test_memory_store_starts_with_presets() {
        let store = MemoryStore::new();
        let keys: Vec<String> = store.load_all().unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["recon", "value_hunter", "custom", "homebody"]);
    }

    #[test]
    fn test_memory_store_save_and_reset() {
        let mut store = MemoryStore::new();
        store.save("custom", &always_mine()).unwrap();
        store.save("miner", &always_mine()).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[2].strategy, always_mine());
        assert_eq!(all[4].key, "miner");
        assert_eq!(all[4].name, "miner");

        store.reset().unwrap();
        assert_eq!(store.load_all().unwrap(), presets());
    }

    #[test]
    fn test_save_rejects_duplicate_ids() {
        let mut store = MemoryStore::new();
        let bad = Strategy::new(vec![
            Rule::always("x", Action::MineCurrent),
            Rule::always("x", Action::SeekFrontier),
        ]);
        assert!(matches!(store.save("custom", &bad), Err(StoreError::Strategy { .. })));
    }

    #[test]
    fn test_missing_file_loads_presets() {
        let store = temp_store("missing");
        assert_eq!(store.load_all().unwrap(), presets());
    }

    #[test]
    fn test_file_store_round_trip() {
        let mut store = temp_store("roundtrip");
        store.save("custom", &always_mine()).unwrap();

        let reopened = JsonFileStore::new(store.path().to_path_buf());
        let loaded = reopened.load("custom").unwrap().unwrap();
        assert_eq!(loaded.name, "Custom");
        assert_eq!(loaded.strategy, always_mine());

        store.reset().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_reads_object_form() {
        let store = temp_store("object");
        let json = r#"{
            "zeta": [{"id": "z", "condition": "ALWAYS", "operator": "<=", "threshold": 0, "action": "MINE_CURRENT"}],
            "homebody": [],
            "recon": [{"id": "r", "condition": "TURNS_REMAINING", "operator": ">=", "threshold": 17, "action": "SEEK_FRONTIER"}]
        }"#;
        std::fs::write(store.path(), json).unwrap();

        let all = store.load_all().unwrap();
        let keys: Vec<&str> = all.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["recon", "homebody", "zeta"]);
        assert_eq!(all[0].name, "Standard Recon");
        assert_eq!(all[0].strategy.rules()[0].condition, Condition::TurnsRemaining);
        assert_eq!(all[0].strategy.rules()[0].operator, Operator::AtLeast);

        std::fs::remove_file(store.path()).unwrap();
    }

    fn assert_malformed(result: Result<Vec<NamedStrategy>, StoreError>, key: &str, rule: &str) {
        match result {
            Err(StoreError::Strategy {
                key: bad_key,
                source: StrategyError::MalformedRule { rule: bad_rule, reason },
            }) => {
                assert_eq!(bad_key, key);
                assert_eq!(bad_rule, rule);
                assert!(reason.contains("SOMETIMES"));
            }
            other => panic!("expected malformed rule, got {other:?}"),
        }
    }

    #[test]
    fn test_array_form_reports_malformed_rule() {
        let store = temp_store("bad-array");
        let json = r#"[
            {"key": "recon", "name": "Standard Recon", "rules": []},
            {"key": "custom", "name": "Custom", "rules": [
                {"id": "x1", "condition": "SOMETIMES", "operator": ">=", "threshold": 1, "action": "MINE_CURRENT"}
            ]}
        ]"#;
        std::fs::write(store.path(), json).unwrap();
        assert_malformed(store.load_all(), "custom", "x1");
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_object_form_reports_malformed_rule() {
        let store = temp_store("bad-object");
        let json = r#"{"zeta": [
            {"id": "z1", "condition": "ALWAYS", "operator": "<=", "threshold": 0, "action": "MINE_CURRENT"},
            {"id": "z2", "condition": "SOMETIMES", "operator": ">=", "threshold": 1, "action": "MINE_CURRENT"}
        ]}"#;
        std::fs::write(store.path(), json).unwrap();
        assert_malformed(store.load_all(), "zeta", "z2");
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_duplicate_ids_on_disk_rejected() {
        let store = temp_store("dup-ids");
        let json = r#"{"custom": [
            {"id": "d", "condition": "ALWAYS", "operator": "<=", "threshold": 0, "action": "MINE_CURRENT"},
            {"id": "d", "condition": "ALWAYS", "operator": "<=", "threshold": 0, "action": "SEEK_FRONTIER"}
        ]}"#;
        std::fs::write(store.path(), json).unwrap();
        assert!(matches!(
            store.load_all(),
            Err(StoreError::Strategy { source: StrategyError::DuplicateRuleId(_), .. })
        ));
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let store = temp_store("garbage");
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load_all(), Err(StoreError::Json { .. })));
        std::fs::remove_file(store.path()).unwrap();
    }
}
