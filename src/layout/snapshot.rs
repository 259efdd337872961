//! Layout export/import as JSON snapshots

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::store::{PrefValue, PreferenceStore};

/// Every stored preference at a point in time
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutSnapshot {
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Version of the snapshot format
    pub version: String,
    pub preferences: BTreeMap<String, PrefValue>,
}

impl LayoutSnapshot {
    /// Current snapshot format version
    pub const VERSION: &'static str = "1.0.0";

    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        let preferences = store
            .keys()
            .into_iter()
            .filter_map(|key| store.get(&key).map(|value| (key, value)))
            .collect();

        Self {
            created_at: Utc::now(),
            version: Self::VERSION.to_string(),
            preferences,
        }
    }

    /// Write every entry into `store` and commit
    pub fn apply_to(&self, store: &dyn PreferenceStore) -> Result<()> {
        for (key, value) in &self.preferences {
            store
                .put(key, *value)
                .with_context(|| format!("Failed to store preference {}", key))?;
        }
        store.commit().context("Failed to commit imported layout")?;
        info!("Imported {} preferences", self.preferences.len());
        Ok(())
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize layout snapshot")?;

        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write layout snapshot to {}", path.display()))?;

        debug!("Layout snapshot saved to: {}", path.display());
        Ok(())
    }

    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read layout snapshot {}", path.display()))?;

        let snapshot: LayoutSnapshot =
            serde_json::from_str(&json).context("Failed to parse layout snapshot JSON")?;

        debug!(
            "Layout snapshot loaded (version: {}, created: {})",
            snapshot.version, snapshot.created_at
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MemoryStore;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_snapshot_save_load() {
        let store = MemoryStore::new();
        store.put("0-X", PrefValue::Float(100.0)).unwrap();
        store.put("controlScale", PrefValue::Int(70)).unwrap();
        store.put("buttonToggle3", PrefValue::Bool(false)).unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();
        LayoutSnapshot::from_store(&store)
            .save_to_file(path)
            .await
            .unwrap();

        let loaded = LayoutSnapshot::load_from_file(path).await.unwrap();
        assert_eq!(loaded.version, LayoutSnapshot::VERSION);
        assert_eq!(loaded.preferences.len(), 3);

        let restored = MemoryStore::new();
        loaded.apply_to(&restored).unwrap();
        assert_eq!(restored.get_f32("0-X", 0.0), 100.0);
        assert_eq!(restored.get_i32("controlScale", 50), 70);
        assert!(!restored.get_bool("buttonToggle3", true));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{ not json").unwrap();
        assert!(LayoutSnapshot::load_from_file(temp_file.path())
            .await
            .is_err());
    }
}
