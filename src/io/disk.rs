use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::{DiskSpeedError, Result};

/// The benchmark file, removed from disk when the guard is dropped.
///
/// The guard owns the path for the whole run. The open handle changes
/// from the writer to the reader between phases, but removal happens
/// on every exit path: normal return, `?` propagation, cancellation or
/// panic unwinding.
pub struct TargetFile {
    path: PathBuf,
    file: Option<File>,
}

impl TargetFile {
    /// Create (or truncate) the file at `path` and open it for writing
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| DiskSpeedError::file(path, e))?;

        log::debug!("created benchmark file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole buffer
    pub fn write_chunk(&mut self, buf: &[u8]) -> Result<()> {
        let path = &self.path;
        let file = Self::handle(&mut self.file, path)?;
        file.write_all(buf).map_err(|e| DiskSpeedError::file(path, e))
    }

    /// Flush written data through to the device
    pub fn sync(&mut self) -> Result<()> {
        let path = &self.path;
        let file = Self::handle(&mut self.file, path)?;
        file.sync_all().map_err(|e| DiskSpeedError::file(path, e))
    }

    /// Close the current handle, keeping the file on disk
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Reopen the file for reading from the start
    pub fn open_for_read(&mut self) -> Result<()> {
        self.file = None;
        let file = File::open(&self.path).map_err(|e| DiskSpeedError::file(&self.path, e))?;
        self.file = Some(file);
        Ok(())
    }

    /// Read up to `buf.len()` bytes; 0 means end of file
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let path = &self.path;
        let file = Self::handle(&mut self.file, path)?;
        loop {
            match file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DiskSpeedError::file(path, e)),
            }
        }
    }

    fn handle<'a>(file: &'a mut Option<File>, path: &Path) -> Result<&'a mut File> {
        file.as_mut().ok_or_else(|| {
            DiskSpeedError::file(path, io::Error::new(io::ErrorKind::Other, "file is not open"))
        })
    }
}

impl Drop for TargetFile {
    fn drop(&mut self) {
        // Windows refuses to delete open files
        self.file = None;
        if let Err(e) = clear(&self.path) {
            log::warn!("failed to remove {}: {}", self.path.display(), e);
        }
    }
}

/// Remove the benchmark file. A file that is already gone is not an error.
pub fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DiskSpeedError::file(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_target_file_creation() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("diskspeed.tmp");

        let target = TargetFile::create(&path).unwrap();
        assert!(target.path().exists());

        // File should be cleaned up when dropped
        drop(target);
        assert!(!path.exists());
    }

    #[test]
    fn test_target_file_truncates_existing() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("diskspeed.tmp");
        std::fs::write(&path, vec![7u8; 4096]).unwrap();

        let target = TargetFile::create(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        drop(target);
        assert!(!path.exists());
    }

    #[test]
    fn test_target_file_removed_on_error_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("diskspeed.tmp");

        let failing = || -> crate::Result<()> {
            let mut target = TargetFile::create(&path)?;
            target.write_chunk(&[b'0'; 512])?;
            target.close();
            // Writing after close fails and unwinds through `?`
            target.write_chunk(b"x")?;
            Ok(())
        };

        assert!(failing().is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_then_read_back() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("diskspeed.tmp");

        let mut target = TargetFile::create(&path).unwrap();
        target.write_chunk(&[b'0'; 1000]).unwrap();
        target.sync().unwrap();
        target.close();
        assert!(target.write_chunk(b"x").is_err());

        target.open_for_read().unwrap();
        let mut buf = vec![0u8; 600];
        assert_eq!(target.read_chunk(&mut buf).unwrap(), 600);
        assert_eq!(target.read_chunk(&mut buf).unwrap(), 400);
        assert_eq!(target.read_chunk(&mut buf).unwrap(), 0);
        assert!(buf[..400].iter().all(|&b| b == b'0'));
    }

    #[test]
    fn test_create_in_missing_directory_reports_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing").join("diskspeed.tmp");

        match TargetFile::create(&path) {
            Err(DiskSpeedError::FileError { path: p, .. }) => assert_eq!(p, path),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("creating a file in a missing directory should fail"),
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("diskspeed.tmp");

        assert!(clear(&path).is_ok());

        std::fs::write(&path, b"data").unwrap();
        assert!(clear(&path).is_ok());
        assert!(!path.exists());
        assert!(clear(&path).is_ok());
    }
}
