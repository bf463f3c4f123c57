//! Append-only mutation log
//!
//! The log is the durable form of the student table:
//! - Every mutation is appended before it is applied in memory
//! - Appends are fsynced unless `sync_writes` is off
//! - Every read validates the record checksum
//! - Replay applies records in file order

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::record::{Mutation, MIN_RECORD_SIZE};

/// File name of the log under `<data_dir>/data/`
pub const LOG_FILE_NAME: &str = "students.log";

/// Resolve the log path for a data directory
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(LOG_FILE_NAME)
}

/// Writer that appends mutations to the log file.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
    sync_writes: bool,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl LogWriter {
    /// Opens or creates `<data_dir>/data/students.log`.
    ///
    /// Creates parent directories if needed.
    pub fn open(data_dir: &Path, sync_writes: bool) -> StoreResult<Self> {
        let path = log_path(data_dir);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StoreError::write_failed(format!("Failed to open log: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StoreError::io_error("Failed to read log metadata", e))?
            .len();

        Ok(Self {
            path,
            file,
            current_offset,
            sync_writes,
            poisoned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Whether the writer refuses further appends
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Appends a mutation. Returns the byte offset it was written at.
    ///
    /// On failure the file is truncated back to the last good record, so a
    /// rejected mutation never survives a restart. If that truncation fails
    /// too, the writer is poisoned and every later append is FATAL.
    pub fn append(&mut self, mutation: &Mutation) -> StoreResult<u64> {
        if self.poisoned {
            return Err(StoreError::log_poisoned(
                &self.path,
                "Log refuses appends after an unrecoverable write failure",
            ));
        }

        let bytes = mutation.serialize().map_err(|e| {
            StoreError::write_failed("Failed to encode log record", e)
        })?;
        let offset = self.current_offset;

        if let Err(err) = self.write_record(&bytes) {
            return Err(self.abort_append(err));
        }

        self.current_offset += bytes.len() as u64;
        Ok(offset)
    }

    fn write_record(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.file
            .write_all(bytes)
            .map_err(|e| StoreError::write_failed("Failed to append log record", e))?;

        if self.sync_writes {
            self.file
                .sync_all()
                .map_err(|e| StoreError::write_failed("fsync failed after log append", e))?;
        }
        Ok(())
    }

    /// Drop whatever a failed append left past `current_offset`.
    fn abort_append(&mut self, cause: StoreError) -> StoreError {
        let rollback = self
            .file
            .set_len(self.current_offset)
            .and_then(|_| self.file.sync_all());

        match rollback {
            Ok(()) => cause,
            Err(e) => {
                self.poisoned = true;
                StoreError::log_poisoned(
                    &self.path,
                    format!("Rollback failed ({}) after: {}", e, cause.message()),
                )
            }
        }
    }
}

/// Sequential reader over the log file.
///
/// Any checksum or framing failure is reported as corruption.
pub struct LogReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl LogReader {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(|e| {
            StoreError::read_failed(format!("Failed to open log: {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StoreError::read_failed("Failed to read log metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next mutation, or `None` at end of file.
    pub fn read_next(&mut self) -> StoreResult<Option<Mutation>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated log: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 || record_length > remaining {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid record length {} with {} bytes remaining",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (mutation, consumed) = Mutation::deserialize(&record_buf)
            .map_err(|e| StoreError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(mutation))
    }

    /// Reads every remaining mutation.
    pub fn read_all(&mut self) -> StoreResult<Vec<Mutation>> {
        let mut mutations = Vec::new();
        while let Some(mutation) = self.read_next()? {
            mutations.push(mutation);
        }
        Ok(mutations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorCode;
    use std::io;
    use crate::students::{NewStudent, Student};
    use tempfile::TempDir;

    fn put(id: u64, email: &str) -> Mutation {
        Mutation::Put(Student::from_candidate(
            id,
            NewStudent::new("Ana", "Lee", email, 20),
        ))
    }

    #[test]
    fn test_writer_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!temp_dir.path().join("data").exists());

        let writer = LogWriter::open(temp_dir.path(), true).unwrap();

        assert!(writer.path().exists());
        assert_eq!(writer.current_offset(), 0);
    }

    #[test]
    fn test_append_then_read_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = LogWriter::open(temp_dir.path(), false).unwrap();

        let first = writer.append(&put(1, "a@x.com")).unwrap();
        let second = writer.append(&Mutation::Delete(1)).unwrap();
        writer.append(&Mutation::Clear).unwrap();
        assert_eq!(first, 0);
        assert!(second > first);

        let mut reader = LogReader::open(writer.path()).unwrap();
        let mutations = reader.read_all().unwrap();

        assert_eq!(
            mutations,
            vec![put(1, "a@x.com"), Mutation::Delete(1), Mutation::Clear]
        );
    }

    #[test]
    fn test_reopen_continues_at_end() {
        let temp_dir = TempDir::new().unwrap();
        let end = {
            let mut writer = LogWriter::open(temp_dir.path(), true).unwrap();
            writer.append(&put(1, "a@x.com")).unwrap();
            writer.current_offset()
        };

        let mut writer = LogWriter::open(temp_dir.path(), true).unwrap();
        assert_eq!(writer.current_offset(), end);
        assert_eq!(writer.append(&put(2, "b@x.com")).unwrap(), end);
    }

    #[test]
    fn test_trailing_garbage_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = {
            let mut writer = LogWriter::open(temp_dir.path(), true).unwrap();
            writer.append(&put(1, "a@x.com")).unwrap();
            writer.path().to_path_buf()
        };

        let mut contents = fs::read(&path).unwrap();
        contents.extend_from_slice(&[0xAB, 0xCD]);
        fs::write(&path, contents).unwrap();

        let mut reader = LogReader::open(&path).unwrap();
        assert!(reader.read_next().unwrap().is_some());
        let err = reader.read_next().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_failed_append_rolls_back_torn_tail() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = LogWriter::open(temp_dir.path(), true).unwrap();
        writer.append(&put(1, "a@x.com")).unwrap();
        let good_end = writer.current_offset();

        // half a record reaches the file before the write fails
        let bytes = put(2, "b@x.com").serialize().unwrap();
        writer.file.write_all(&bytes[..bytes.len() / 2]).unwrap();
        let err = writer.abort_append(StoreError::write_failed(
            "Failed to append log record",
            io::Error::new(io::ErrorKind::Other, "no space left on device"),
        ));

        assert_eq!(err.code(), StoreErrorCode::WriteFailed);
        assert!(!writer.is_poisoned());
        assert_eq!(fs::metadata(writer.path()).unwrap().len(), good_end);

        assert_eq!(writer.append(&put(3, "c@x.com")).unwrap(), good_end);

        let mut reader = LogReader::open(writer.path()).unwrap();
        assert_eq!(
            reader.read_all().unwrap(),
            vec![put(1, "a@x.com"), put(3, "c@x.com")]
        );
    }

    #[test]
    fn test_failed_fsync_drops_complete_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = LogWriter::open(temp_dir.path(), true).unwrap();
        writer.append(&put(1, "a@x.com")).unwrap();

        // whole record written, then the fsync reports failure
        let bytes = Mutation::Delete(1).serialize().unwrap();
        writer.file.write_all(&bytes).unwrap();
        writer.abort_append(StoreError::write_failed(
            "fsync failed after log append",
            io::Error::new(io::ErrorKind::Other, "eio"),
        ));
        drop(writer);

        let writer = LogWriter::open(temp_dir.path(), true).unwrap();
        let mut reader = LogReader::open(writer.path()).unwrap();
        assert_eq!(reader.read_all().unwrap(), vec![put(1, "a@x.com")]);
    }

    #[test]
    fn test_poisoned_writer_refuses_appends() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = LogWriter::open(temp_dir.path(), false).unwrap();
        writer.poisoned = true;

        let err = writer.append(&put(1, "a@x.com")).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::LogPoisoned);
        assert!(err.is_fatal());
        assert_eq!(fs::metadata(writer.path()).unwrap().len(), 0);
    }
}
