use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::{self, LoadError};
use crate::models::CollisionRecord;

/// Loaded tables keyed by row limit. Entries live until the cache is dropped;
/// the source file is treated as static.
pub struct DatasetCache {
    source: PathBuf,
    tables: HashMap<usize, Arc<[CollisionRecord]>>,
}

impl DatasetCache {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            tables: HashMap::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&mut self, max_rows: usize) -> Result<Arc<[CollisionRecord]>, LoadError> {
        if let Some(table) = self.tables.get(&max_rows) {
            log::debug!("cache hit for {max_rows} rows");
            return Ok(Arc::clone(table));
        }

        let table: Arc<[CollisionRecord]> = loader::load_collisions(&self.source, max_rows)?.into();
        self.tables.insert(max_rows, Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("collisions.csv");
        fs::write(
            &path,
            "CRASH_DATE,CRASH_TIME,LATITUDE,LONGITUDE\n\
             01/01/2019,0:10,40.7,-73.9\n\
             01/01/2019,0:20,40.8,-73.8\n\
             01/01/2019,0:30,40.9,-73.7\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn reuses_tables_for_the_same_row_limit() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir);
        let mut cache = DatasetCache::new(&path);

        let first = cache.get(2).unwrap();
        fs::remove_file(&path).unwrap();
        let second = cache.get(2).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!cache.is_empty());
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_tables_by_row_limit() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(fixture(&dir));

        assert_eq!(cache.get(1).unwrap().len(), 1);
        assert_eq!(cache.get(3).unwrap().len(), 3);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.csv");
        let mut cache = DatasetCache::new(&path);

        assert!(cache.get(5).is_err());
        assert!(cache.is_empty());

        fs::write(&path, "crash_date,crash_time,latitude,longitude\n01/01/2019,0:10,40.7,-73.9\n").unwrap();
        assert_eq!(cache.get(5).unwrap().len(), 1);
    }
}
