//! Delivery sinks: where generated bytes go once encoding succeeds.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use audex_model::GeneratedFile;

/// Hands a finished file to its destination. The pipeline's contract ends
/// once `deliver` returns.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, file: &GeneratedFile) -> io::Result<()>;
}

/// Writes each file into a directory. Existing files are never overwritten,
/// and a failed write leaves nothing under the export filename.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file: &GeneratedFile) -> PathBuf {
        self.dir.join(&file.filename)
    }

    /// Stage `source` in a hidden `.part` file beside the target, sync it,
    /// then move it into place only if `filename` is still free. The staged
    /// file is removed on every error path.
    fn write_new(&self, filename: &str, source: &mut dyn Read) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{filename}."))
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        io::copy(source, &mut staged)?;
        staged.as_file().sync_all()?;
        staged.persist_noclobber(&path)?;
        Ok(path)
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&self, file: &GeneratedFile) -> io::Result<()> {
        let path = self.write_new(&file.filename, &mut file.bytes.as_slice())?;
        info!(path = %path.display(), bytes = file.len(), "file delivered");
        Ok(())
    }
}

/// Keeps delivered files in memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Arc<Mutex<Vec<GeneratedFile>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<GeneratedFile> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Vec<GeneratedFile> {
        std::mem::take(&mut *self.files.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeliverySink for MemorySink {
    fn deliver(&self, file: &GeneratedFile) -> io::Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(file.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> GeneratedFile {
        GeneratedFile {
            filename: name.to_string(),
            mime_type: "application/pdf",
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[test]
    fn directory_sink_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        sink.deliver(&file("a.pdf")).unwrap();
        assert_eq!(fs::read(sink.path_for(&file("a.pdf"))).unwrap(), b"%PDF-1.4");

        let err = sink.deliver(&file("a.pdf")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    /// Yields a few bytes, then fails the way a full disk would.
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::other("no space left on device"));
            }
            self.sent = true;
            let chunk = b"%PDF";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let err = sink
            .write_new("plans-export.pdf", &mut FailingReader { sent: false })
            .unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert!(!dir.path().join("plans-export.pdf").exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn refused_overwrite_cleans_up_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.deliver(&file("a.pdf")).unwrap();
        assert!(sink.deliver(&file("a.pdf")).is_err());
        assert_eq!(entries(dir.path()), vec!["a.pdf"]);
    }

    #[test]
    fn memory_sink_clones_share_storage() {
        let sink = MemorySink::new();
        let observer = sink.clone();
        sink.deliver(&file("a.pdf")).unwrap();
        assert_eq!(observer.len(), 1);
        assert_eq!(observer.take()[0].filename, "a.pdf");
        assert!(sink.is_empty());
    }
}
