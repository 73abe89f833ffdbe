//! Fail-safe scene kept in a fixed-size file

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use artnode_core::{FailSafeStore, FAILSAFE_STORE_SIZE};
use tracing::debug;

/// [`FailSafeStore`] backed by one `FAILSAFE_STORE_SIZE` byte file.
///
/// A write transaction creates the file when missing; reading a scene that
/// was never recorded fails with `NotFound`.
pub struct FileFailSafeStore {
    path: PathBuf,
    file: Option<File>,
}

impl FileFailSafeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no fail-safe transaction open"))
    }
}

fn check_range(offset: usize, len: usize) -> io::Result<u64> {
    match offset.checked_add(len) {
        Some(end) if end <= FAILSAFE_STORE_SIZE => Ok(offset as u64),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("fail-safe access out of range: {}+{}", offset, len),
        )),
    }
}

impl FailSafeStore for FileFailSafeStore {
    fn write_start(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        file.set_len(FAILSAFE_STORE_SIZE as u64)?;
        self.file = Some(file);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> io::Result<()> {
        let position = check_range(offset, data.len())?;
        let file = self.open_file()?;
        file.seek(SeekFrom::Start(position))?;
        file.write_all(data)
    }

    fn write_end(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
            debug!("Fail-safe scene written to {}", self.path.display());
        }
        Ok(())
    }

    fn read_start(&mut self) -> io::Result<()> {
        self.file = Some(File::open(&self.path)?);
        Ok(())
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let position = check_range(offset, buf.len())?;
        let file = self.open_file()?;
        file.seek(SeekFrom::Start(position))?;
        file.read_exact(buf)
    }

    fn read_end(&mut self) -> io::Result<()> {
        self.file = None;
        Ok(())
    }
}
