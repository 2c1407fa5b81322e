//! `FileStream`: a file handle that knows what it was opened for.
//!
//! Factories:
//! - `open_or_create`: read/write, created if absent.
//! - `create_new_anyway`: removes whatever occupies the path, then creates.
//! - `create_new`: read/write, fails if anything exists at the path.
//! - `open_existing`: read/write on an existing file the caller may read and write.
//! - `open_read_only`: read-only on an existing readable file.
//!
//! Writes and truncation on a read-only stream fail with `StreamUnsupported`;
//! through `std::io::Write` that error arrives as `ErrorKind::Unsupported`
//! wrapping the `FsError`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::errors::{FsError, FsResult};
use crate::platform;

use super::helpers::os_call;

#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    readable: bool,
    writable: bool,
}

/// Stat through links; a missing path or a directory is rejected.
fn require_existing_file(path: &Path) -> FsResult<()> {
    match fs::metadata(path) {
        Ok(m) if m.is_dir() => Err(FsError::IsADirectory(path.to_path_buf())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FsError::NotFound(path.to_path_buf())),
        Err(e) => Err(os_call("stat", path, e)),
    }
}

fn reject_directory(path: &Path) -> FsResult<()> {
    match fs::metadata(path) {
        Ok(m) if m.is_dir() => Err(FsError::IsADirectory(path.to_path_buf())),
        _ => Ok(()),
    }
}

impl FileStream {
    fn open_with(path: &Path, opts: &OpenOptions, op: &'static str, readable: bool, writable: bool) -> FsResult<Self> {
        let file = opts.open(path).map_err(|e| os_call(op, path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            readable,
            writable,
        })
    }

    pub fn open_or_create(path: &Path) -> FsResult<Self> {
        reject_directory(path)?;
        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create(true);
        Self::open_with(path, &opts, "open or create", true, true)
    }

    /// Remove whatever is at `path` (file, link or directory tree), then create.
    pub fn create_new_anyway(path: &Path) -> FsResult<Self> {
        match fs::symlink_metadata(path) {
            Ok(meta) => {
                let ft = meta.file_type();
                let res = if ft.is_symlink() {
                    let is_dir = platform::is_link_to_directory(path)?;
                    platform::remove_symlink(path, is_dir)
                } else if ft.is_dir() {
                    fs::remove_dir_all(path)
                } else {
                    fs::remove_file(path)
                };
                res.map_err(|e| os_call("remove existing entry", path, e))?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(os_call("lstat", path, e)),
        }
        Self::create_new(path)
    }

    pub fn create_new(path: &Path) -> FsResult<Self> {
        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create_new(true);
        Self::open_with(path, &opts, "create new file", true, true)
    }

    pub fn open_existing(path: &Path) -> FsResult<Self> {
        require_existing_file(path)?;
        if !platform::is_readable(path) || !platform::is_writable(path) {
            return Err(FsError::PermissionDenied {
                path: path.to_path_buf(),
                context: "file is not both readable and writable".into(),
            });
        }
        let mut opts = OpenOptions::new();
        opts.read(true).write(true);
        Self::open_with(path, &opts, "open existing file", true, true)
    }

    pub fn open_read_only(path: &Path) -> FsResult<Self> {
        require_existing_file(path)?;
        if !platform::is_readable(path) {
            return Err(FsError::PermissionDenied {
                path: path.to_path_buf(),
                context: "file is not readable".into(),
            });
        }
        let mut opts = OpenOptions::new();
        opts.read(true);
        Self::open_with(path, &opts, "open file read-only", true, false)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn can_read(&self) -> bool {
        self.readable
    }

    pub fn can_write(&self) -> bool {
        self.writable
    }

    /// Regular files are always seekable.
    pub fn can_seek(&self) -> bool {
        true
    }

    pub fn length(&self) -> FsResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| os_call("stat stream", &self.path, e))
    }

    pub fn set_length(&mut self, len: u64) -> FsResult<()> {
        if !self.writable {
            return Err(self.unsupported("set_length"));
        }
        self.file
            .set_len(len)
            .map_err(|e| os_call("truncate", &self.path, e))
    }

    pub fn position(&mut self) -> FsResult<u64> {
        self.file
            .stream_position()
            .map_err(|e| os_call("query position", &self.path, e))
    }

    /// Flush data and metadata to stable storage.
    pub fn sync_all(&self) -> FsResult<()> {
        self.file.sync_all().map_err(|e| os_call("fsync", &self.path, e))
    }

    pub(crate) fn as_file(&self) -> &File {
        &self.file
    }

    fn unsupported(&self, op: &'static str) -> FsError {
        FsError::StreamUnsupported {
            op,
            path: self.path.clone(),
        }
    }

    fn unsupported_io(&self, op: &'static str) -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, self.unsupported(op))
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.readable {
            return Err(self.unsupported_io("read"));
        }
        self.file.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(self.unsupported_io("write"));
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FsErrorKind;
    use tempfile::tempdir;

    #[test]
    fn read_only_stream_rejects_writes() {
        let td = tempdir().unwrap();
        let p = td.path().join("ro.txt");
        fs::write(&p, b"hello").unwrap();

        let mut s = FileStream::open_read_only(&p).unwrap();
        assert!(s.can_read());
        assert!(!s.can_write());
        assert!(s.can_seek());

        let err = s.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<FsError>()).unwrap();
        assert_eq!(inner.kind(), FsErrorKind::StreamUnsupported);

        let err = s.set_length(0).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::StreamUnsupported);

        let mut out = String::new();
        s.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(s.position().unwrap(), 5);
    }

    #[test]
    fn factory_preconditions() {
        let td = tempdir().unwrap();
        let missing = td.path().join("missing");
        assert_eq!(FileStream::open_existing(&missing).unwrap_err().kind(), FsErrorKind::NotFound);
        assert_eq!(FileStream::open_read_only(&missing).unwrap_err().kind(), FsErrorKind::NotFound);
        assert_eq!(FileStream::open_read_only(td.path()).unwrap_err().kind(), FsErrorKind::IsADirectory);
        assert_eq!(FileStream::open_or_create(td.path()).unwrap_err().kind(), FsErrorKind::IsADirectory);

        let existing = td.path().join("e");
        fs::write(&existing, b"1").unwrap();
        assert_eq!(FileStream::create_new(&existing).unwrap_err().kind(), FsErrorKind::OsCallFailure);
    }

    #[test]
    fn create_new_anyway_replaces_directory_tree() {
        let td = tempdir().unwrap();
        let p = td.path().join("occupied");
        fs::create_dir_all(p.join("deep/er")).unwrap();
        fs::write(p.join("deep/er/f"), b"x").unwrap();

        let mut s = FileStream::create_new_anyway(&p).unwrap();
        s.write_all(b"fresh").unwrap();
        assert_eq!(s.length().unwrap(), 5);
        s.set_length(2).unwrap();
        drop(s);
        assert_eq!(fs::read(&p).unwrap(), b"fr");
    }

    #[test]
    fn open_or_create_then_seek() {
        let td = tempdir().unwrap();
        let p = td.path().join("f");
        let mut s = FileStream::open_or_create(&p).unwrap();
        s.write_all(b"abcdef").unwrap();
        s.seek(SeekFrom::Start(2)).unwrap();
        let mut two = [0u8; 2];
        s.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"cd");

        let mut again = FileStream::open_existing(&p).unwrap();
        assert_eq!(again.length().unwrap(), 6);
        assert_eq!(again.position().unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn open_existing_requires_write_access() {
        use std::os::unix::fs::PermissionsExt;
        // root bypasses permission bits
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let td = tempdir().unwrap();
        let p = td.path().join("locked");
        fs::write(&p, b"x").unwrap();
        fs::set_permissions(&p, fs::Permissions::from_mode(0o400)).unwrap();
        assert_eq!(FileStream::open_existing(&p).unwrap_err().kind(), FsErrorKind::PermissionDenied);
        assert!(FileStream::open_read_only(&p).is_ok());
    }
}
