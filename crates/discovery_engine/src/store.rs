use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use discovery_core::{Item, KnownIdentities};
use engine_logging::engine_debug;

use crate::{AtomicFileWriter, PersistError};

const IDENTITY_COLUMN: &str = "identity";
const QUERY_COLUMN: &str = "discovery_query";

/// The durable row table behind an accumulation store.
pub trait PersistedStore {
    /// Stable key for the underlying resource; stores sharing a target share a lock.
    fn target(&self) -> &str;

    fn exists(&self) -> bool;

    /// An absent or empty table holds no identities.
    fn read_all_identities(&self) -> Result<KnownIdentities, PersistError>;

    /// Appends rows after the existing ones. Existing rows are never rewritten.
    fn append_rows(&self, rows: &[Item]) -> Result<(), PersistError>;
}

impl<T: PersistedStore + ?Sized> PersistedStore for &T {
    fn target(&self) -> &str {
        (**self).target()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn read_all_identities(&self) -> Result<KnownIdentities, PersistError> {
        (**self).read_all_identities()
    }

    fn append_rows(&self, rows: &[Item]) -> Result<(), PersistError> {
        (**self).append_rows(rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub total_rows: usize,
    /// Distinct discovery queries, in order of first appearance.
    pub queries: Vec<String>,
}

/// A CSV file with a header row and one row per [`Item`].
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    target: String,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let target = std::path::absolute(&path)
            .unwrap_or_else(|_| path.clone())
            .display()
            .to_string();
        Self { path, target }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> Result<StoreStats, PersistError> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(StoreStats::default());
        };
        let query_index = reader
            .headers()?
            .iter()
            .position(|header| header == QUERY_COLUMN);

        let mut stats = StoreStats::default();
        for record in reader.records() {
            let record = record?;
            stats.total_rows += 1;
            if let Some(query) = query_index.and_then(|index| record.get(index)) {
                if !stats.queries.iter().any(|known| known == query) {
                    stats.queries.push(query.to_string());
                }
            }
        }
        Ok(stats)
    }

    fn open_reader(&self) -> Result<Option<csv::Reader<File>>, PersistError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }
        Ok(Some(csv::Reader::from_reader(file)))
    }

    fn create_with_header(&self, rows: &[Item]) -> Result<(), PersistError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let content = writer
            .into_inner()
            .map_err(|err| PersistError::Io(err.into_error()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PersistError::OutputDir(format!("{} has no file name", self.path.display()))
            })?;
        AtomicFileWriter::new(dir).create(filename, &content)?;
        Ok(())
    }

    fn append_existing(&self, rows: &[Item]) -> Result<(), PersistError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        let needs_newline = !ends_with_newline(&mut file)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let content = writer
            .into_inner()
            .map_err(|err| PersistError::Io(err.into_error()))?;

        if needs_newline {
            file.write_all(b"\n")?;
        }
        file.write_all(&content)?;
        file.sync_all()?;
        Ok(())
    }
}

impl PersistedStore for CsvStore {
    fn target(&self) -> &str {
        &self.target
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_all_identities(&self) -> Result<KnownIdentities, PersistError> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(KnownIdentities::new());
        };
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(KnownIdentities::new());
        }
        let index = headers
            .iter()
            .position(|header| header == IDENTITY_COLUMN)
            .ok_or_else(|| PersistError::MissingColumn {
                path: self.path.clone(),
                column: IDENTITY_COLUMN,
            })?;

        let mut identities = KnownIdentities::new();
        for record in reader.records() {
            if let Some(identity) = record?.get(index) {
                identities.insert(identity.to_string());
            }
        }
        Ok(identities)
    }

    fn append_rows(&self, rows: &[Item]) -> Result<(), PersistError> {
        if rows.is_empty() {
            return Ok(());
        }
        let is_empty = match self.path.metadata() {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => return Err(err.into()),
        };
        if !is_empty {
            return self.append_existing(rows);
        }
        if self.path.exists() {
            // Zero-length file: replace it with a proper header.
            std::fs::remove_file(&self.path)?;
        }
        match self.create_with_header(rows) {
            Err(PersistError::AlreadyExists(_)) => {
                engine_debug!("store {} appeared concurrently; appending", self.target);
                self.append_existing(rows)
            }
            other => other,
        }
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
