//! CSV file cache store.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use super::error::StoreError;
use super::store::{CacheStore, FIELD_BLOB, FIELD_URL};

/// Positions of the cache fields in the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    url: usize,
    blob: usize,
    width: usize,
}

/// Cache store in a CSV file with a `url,blob` header row.
///
/// Lookups scan the file from the top, so the first entry for a URL wins.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    columns: Option<Columns>,
}

impl CsvStore {
    /// Open an existing CSV file.
    pub fn open_existing(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            columns: None,
        })
    }

    /// Create a new, empty CSV file. Fails if the file already exists.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            columns: None,
        })
    }

    fn columns(&self) -> Result<Columns, StoreError> {
        self.columns
            .ok_or_else(|| StoreError::InvalidSchema(self.path.display().to_string()))
    }
}

impl CacheStore for CsvStore {
    fn ensure_layer(&mut self, create: bool) -> Result<bool, StoreError> {
        if self.columns.is_some() {
            return Ok(true);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        if headers.is_empty() {
            if !create {
                return Ok(false);
            }
            let file = OpenOptions::new().append(true).open(&self.path)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record([FIELD_URL, FIELD_BLOB])?;
            writer.flush()?;
            self.columns = Some(Columns {
                url: 0,
                blob: 1,
                width: 2,
            });
            return Ok(true);
        }

        let url = headers.iter().position(|h| h == FIELD_URL);
        let blob = headers.iter().position(|h| h == FIELD_BLOB);
        match (url, blob) {
            (Some(url), Some(blob)) => {
                self.columns = Some(Columns {
                    url,
                    blob,
                    width: headers.len(),
                });
                Ok(true)
            }
            _ => Err(StoreError::InvalidSchema(self.path.display().to_string())),
        }
    }

    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError> {
        let columns = self.columns()?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        for record in reader.records() {
            let record = record?;
            if record.get(columns.url) == Some(url) {
                return Ok(record.get(columns.blob).map(str::to_string));
            }
        }

        Ok(None)
    }

    fn append(&mut self, url: &str, body: &str) -> Result<(), StoreError> {
        let columns = self.columns()?;
        let mut row = vec![""; columns.width];
        row[columns.url] = url;
        row[columns.blob] = body;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        let mut store = CsvStore::create(&path).unwrap();

        assert!(!store.ensure_layer(false).unwrap());
        assert!(store.ensure_layer(true).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "url,blob\n");
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        std::fs::write(&path, "url,blob\n").unwrap();
        assert!(CsvStore::create(&path).is_err());
    }

    #[test]
    fn multiline_bodies_survive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        let mut store = CsvStore::create(&path).unwrap();
        store.ensure_layer(true).unwrap();

        let body = "<searchresults>\n  <place name=\"a, b\"/>\n</searchresults>";
        store.append("http://q?x=1,2", body).unwrap();
        assert_eq!(store.lookup("http://q?x=1,2").unwrap().as_deref(), Some(body));
    }

    #[test]
    fn first_match_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        let mut store = CsvStore::create(&path).unwrap();
        store.ensure_layer(true).unwrap();
        store.append("http://q", "first").unwrap();
        store.append("http://q", "second").unwrap();
        assert_eq!(store.lookup("http://q").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn reads_fields_in_any_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        std::fs::write(&path, "blob,note,url\n<x/>,hand-written,http://q\n").unwrap();

        let mut store = CsvStore::open_existing(&path).unwrap();
        assert!(store.ensure_layer(false).unwrap());
        assert_eq!(store.lookup("http://q").unwrap().as_deref(), Some("<x/>"));

        store.append("http://r", "<y/>").unwrap();
        assert_eq!(store.lookup("http://r").unwrap().as_deref(), Some("<y/>"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("<y/>,,http://r\n"));
    }

    #[test]
    fn foreign_header_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        std::fs::write(&path, "name,value\n").unwrap();

        let mut store = CsvStore::open_existing(&path).unwrap();
        assert!(matches!(
            store.ensure_layer(true),
            Err(StoreError::InvalidSchema(_))
        ));
    }

    #[test]
    fn lookup_without_layer_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        let mut store = CsvStore::create(&path).unwrap();
        assert!(matches!(
            store.lookup("http://q"),
            Err(StoreError::InvalidSchema(_))
        ));
    }
}
