// JSON registry adapter - Scan progress persisted as a JSON object

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::errors::*;
use crate::ports::*;

/// On-disk shape of one entry. Older registries store naive local
/// timestamps without an offset.
#[derive(Debug, Deserialize)]
struct StoredEntry {
    last_scan: String,
    status: ScanStatus,
}

impl StoredEntry {
    fn into_entry(self) -> Option<RegistryEntry> {
        Some(RegistryEntry {
            last_scan: parse_timestamp(&self.last_scan)?,
            status: self.status,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Local));
    }
    let naive: NaiveDateTime = raw.parse().ok()?;
    Local.from_local_datetime(&naive).earliest()
}

#[derive(Debug, Default)]
struct Contents {
    entries: BTreeMap<String, RegistryEntry>,
    /// Entries this version cannot read, written back untouched
    unreadable: BTreeMap<String, Value>,
}

/// Progress registry keyed by path, written back after every record
pub struct JsonProgressRegistry {
    path: PathBuf,
    contents: Mutex<Contents>,
}

impl JsonProgressRegistry {
    /// Open the registry at `path`. A missing file starts empty. Entries
    /// that do not parse are kept as they are and rescanned on demand; a
    /// file that is not a JSON object is moved aside to `<path>.corrupt`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let contents = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                DomainError::Registry(format!("Cannot read {}: {}", path.display(), e))
            })?;
            match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(raw) => Self::parse_entries(&path, raw),
                Err(e) => {
                    let backup = Self::sibling(&path, ".corrupt");
                    std::fs::rename(&path, &backup).map_err(|err| {
                        DomainError::Registry(format!(
                            "Progress registry {} is corrupt ({}) and could not be moved aside: {}",
                            path.display(),
                            e,
                            err
                        ))
                    })?;
                    tracing::warn!(
                        "Progress registry {} is corrupt ({}); moved to {} and starting fresh",
                        path.display(),
                        e,
                        backup.display()
                    );
                    Contents::default()
                }
            }
        } else {
            Contents::default()
        };

        Ok(Self {
            path,
            contents: Mutex::new(contents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_entries(path: &Path, raw: BTreeMap<String, Value>) -> Contents {
        let mut contents = Contents::default();
        for (key, value) in raw {
            let parsed = serde_json::from_value::<StoredEntry>(value.clone())
                .ok()
                .and_then(StoredEntry::into_entry);
            match parsed {
                Some(entry) => {
                    contents.entries.insert(key, entry);
                }
                None => {
                    tracing::warn!(
                        "Unreadable entry for {} in {}; keeping it as is",
                        key,
                        path.display()
                    );
                    contents.unreadable.insert(key, value);
                }
            }
        }
        contents
    }

    fn key(file_path: &Path) -> String {
        file_path.to_string_lossy().into_owned()
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Write to a sibling temp file and rename it over the registry
    fn save(&self, contents: &Contents) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::Registry(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        let serialize_error =
            |e: serde_json::Error| DomainError::Registry(format!("Cannot serialize registry: {}", e));
        let mut document = contents.unreadable.clone();
        for (key, entry) in &contents.entries {
            document.insert(key.clone(), serde_json::to_value(entry).map_err(serialize_error)?);
        }
        let content = serde_json::to_string_pretty(&document).map_err(serialize_error)?;

        let temp_path = Self::sibling(&self.path, ".tmp");
        std::fs::write(&temp_path, content).map_err(|e| {
            DomainError::Registry(format!("Cannot write {}: {}", temp_path.display(), e))
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            DomainError::Registry(format!(
                "Failed to rename temporary registry {}: {}",
                temp_path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl ProgressPort for JsonProgressRegistry {
    async fn status_of(&self, file_path: &Path) -> Option<ScanStatus> {
        let contents = self.contents.lock().await;
        contents
            .entries
            .get(&Self::key(file_path))
            .map(|entry| entry.status)
    }

    async fn record(&self, file_path: &Path, status: ScanStatus) -> Result<(), DomainError> {
        // held across the save so concurrent records serialize their writes
        let mut contents = self.contents.lock().await;
        let key = Self::key(file_path);
        contents.unreadable.remove(&key);
        contents.entries.insert(
            key,
            RegistryEntry {
                last_scan: Local::now(),
                status,
            },
        );
        self.save(&contents)
    }

    async fn entries(&self) -> Vec<(String, RegistryEntry)> {
        let contents = self.contents.lock().await;
        contents
            .entries
            .iter()
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("progress.json");

        let registry = JsonProgressRegistry::load(&path).unwrap();
        assert!(!registry.is_recorded(Path::new("/v/a.mkv")).await);
        registry
            .record(Path::new("/v/a.mkv"), ScanStatus::Error)
            .await
            .unwrap();
        registry
            .record(Path::new("/v/b.mp4"), ScanStatus::Ok)
            .await
            .unwrap();
        assert!(path.exists());

        let reloaded = JsonProgressRegistry::load(&path).unwrap();
        assert_eq!(
            reloaded.status_of(Path::new("/v/a.mkv")).await,
            Some(ScanStatus::Error)
        );
        let keys: Vec<String> = reloaded.entries().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/v/a.mkv".to_string(), "/v/b.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_status_serialized_lowercase() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let registry = JsonProgressRegistry::load(&path).unwrap();
        registry
            .record(Path::new("clip.avi"), ScanStatus::Ok)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"status\": \"ok\""));
        assert!(raw.contains("last_scan"));
        assert!(!dir.path().join("progress.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_registry_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not json").unwrap();

        let registry = JsonProgressRegistry::load(&path).unwrap();
        assert!(registry.entries().await.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("progress.json.corrupt")).unwrap(),
            "{ not json"
        );
    }

    #[tokio::test]
    async fn test_loads_naive_timestamps_and_keeps_unreadable_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(
            &path,
            r#"{
  "/v/a.mkv": {"last_scan": "2024-05-01T10:00:00.123456", "status": "error"},
  "/v/b.mp4": {"last_scan": "2024-05-01T10:05:00", "status": "ok"},
  "/v/c.avi": {"last_scan": "2024-05-01T10:06:00", "status": "pending"}
}"#,
        )
        .unwrap();

        let registry = JsonProgressRegistry::load(&path).unwrap();
        assert_eq!(
            registry.status_of(Path::new("/v/a.mkv")).await,
            Some(ScanStatus::Error)
        );
        assert_eq!(
            registry.status_of(Path::new("/v/b.mp4")).await,
            Some(ScanStatus::Ok)
        );
        let a = &registry.entries().await[0].1;
        assert_eq!(
            a.last_scan.naive_local(),
            "2024-05-01T10:00:00.123456".parse::<NaiveDateTime>().unwrap()
        );
        // an entry with an unknown status is not trusted
        assert_eq!(registry.status_of(Path::new("/v/c.avi")).await, None);

        registry
            .record(Path::new("/v/d.mov"), ScanStatus::Ok)
            .await
            .unwrap();

        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<&str> = raw.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/v/a.mkv", "/v/b.mp4", "/v/c.avi", "/v/d.mov"]);
        assert_eq!(raw["/v/c.avi"]["status"], "pending");

        let reloaded = JsonProgressRegistry::load(&path).unwrap();
        assert_eq!(reloaded.entries().await.len(), 3);
        assert_eq!(
            reloaded.status_of(Path::new("/v/a.mkv")).await,
            Some(ScanStatus::Error)
        );
    }

    #[tokio::test]
    async fn test_recording_replaces_unreadable_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, r#"{"/v/c.avi": {"status": "pending"}}"#).unwrap();

        let registry = JsonProgressRegistry::load(&path).unwrap();
        registry
            .record(Path::new("/v/c.avi"), ScanStatus::Error)
            .await
            .unwrap();

        let reloaded = JsonProgressRegistry::load(&path).unwrap();
        assert_eq!(
            reloaded.status_of(Path::new("/v/c.avi")).await,
            Some(ScanStatus::Error)
        );
    }
}
