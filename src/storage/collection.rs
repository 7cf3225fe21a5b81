use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;

use super::StorageError;
use crate::records::{MissionFilter, MissionScoped};

/// Append-only access to a collection of records.
pub trait RecordStore<T> {
    /// Records matching `filter`, in insertion order.
    fn list(&self, filter: &MissionFilter) -> Result<Vec<T>, StorageError>;

    /// Builds a record from the current contents and appends it atomically.
    fn append_with<F>(&self, build: F) -> Result<T, StorageError>
    where
        F: FnOnce(&[T]) -> T;

    fn append(&self, record: T) -> Result<T, StorageError> {
        self.append_with(|_| record)
    }
}

/// A JSON array file. Appends rewrite the whole file under a lock, so this is the only
/// writer as long as a single instance owns the path.
pub struct JsonCollection<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        JsonCollection {
            path,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    fn load(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &[T]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
        std::fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

impl<T> RecordStore<T> for JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + MissionScoped,
{
    fn list(&self, filter: &MissionFilter) -> Result<Vec<T>, StorageError> {
        let mut records = self.load()?;
        records.retain(|r| r.in_mission(filter));
        Ok(records)
    }

    fn append_with<F>(&self, build: F) -> Result<T, StorageError>
    where
        F: FnOnce(&[T]) -> T,
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut records = self.load()?;
        let record = build(&records);
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RoverStatus, TelemetryRecord};

    fn capture(file: &str, mission: &str) -> TelemetryRecord {
        TelemetryRecord {
            file: file.to_string(),
            rover_status: Some(RoverStatus {
                mission_id: Some(mission.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collection: JsonCollection<TelemetryRecord> =
            JsonCollection::new(dir.path().join("metadata.json"));
        assert!(collection.list(&MissionFilter::All).unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let collection: JsonCollection<TelemetryRecord> =
            JsonCollection::new(dir.path().join("nested").join("metadata.json"));

        collection.append(capture("a.jpg", "m1")).unwrap();
        collection.append(capture("b.jpg", "m2")).unwrap();
        collection.append(capture("c.jpg", "m1")).unwrap();

        let all = collection.list(&MissionFilter::All).unwrap();
        let files: Vec<_> = all.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, ["a.jpg", "b.jpg", "c.jpg"]);

        let m1 = collection
            .list(&MissionFilter::Mission("m1".into()))
            .unwrap();
        assert_eq!(m1.len(), 2);
        assert!(!dir.path().join("nested").join("metadata.json.tmp").exists());
    }

    #[test]
    fn test_append_with_sees_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let collection: JsonCollection<TelemetryRecord> =
            JsonCollection::new(dir.path().join("metadata.json"));
        collection.append(capture("a.jpg", "m1")).unwrap();

        let record = collection
            .append_with(|existing| capture(&format!("{}.jpg", existing.len()), "m1"))
            .unwrap();
        assert_eq!(record.file, "1.jpg");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "{not json").unwrap();

        let collection: JsonCollection<TelemetryRecord> = JsonCollection::new(path);
        assert!(matches!(
            collection.list(&MissionFilter::All),
            Err(StorageError::Json(_))
        ));
    }
}
