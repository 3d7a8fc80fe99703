use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Write-then-rename wrapper for atomic artifact outputs.
/// The temp file lives beside the target so the final rename stays on one filesystem.
pub struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    /// Create the temp file next to `target`, creating parent directories as needed.
    pub fn open(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        Ok(Self { target: target.to_path_buf(), tmp })
    }

    /// Path of the temp file (for diagnostics).
    pub fn temp_path(&self) -> &Path { self.tmp.path() }

    /// Fsync and rename into place. Dropping a `PendingWrite` without
    /// finalizing deletes the temp file and leaves the target untouched.
    pub fn finalize(self) -> Result<()> {
        let Self { target, mut tmp } = self;
        tmp.flush().map_err(|e| Error::io(tmp.path(), e))?;
        tmp.as_file().sync_all().ok(); // best-effort fsync file
        tmp.persist(&target).map_err(|e| Error::io(&target, e.error))?;
        if let Some(dir) = target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }
    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}

/// Run `write` against a temp file beside `target`, then atomically rename it
/// into place. If `write` fails, the previous contents of `target` are kept.
pub fn write_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut PendingWrite) -> Result<()>,
{
    let mut pending = PendingWrite::open(target)?;
    write(&mut pending)?;
    pending.finalize()
}
