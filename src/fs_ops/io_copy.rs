//! Streaming file-content copy through `FileStream`.
//!
//! - Destination is opened with `create_new`; callers remove any existing entry first.
//! - Linux tries `copy_file_range` for an in-kernel copy and falls back to
//!   buffered I/O when the filesystem pair does not support it.
//! - The destination is fsynced before returning.
//! - A partially written destination is removed on failure.
//!
//! Snapshot semantics: the source is read once from start to EOF; bytes appended
//! concurrently may or may not be included.

use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::FsResult;

use super::helpers::os_call;
use super::stream::FileStream;

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

/// Copy the bytes of `src` into a new file at `dst`. Returns the byte count.
pub(crate) fn copy_file_contents(src: &Path, dst: &Path) -> FsResult<u64> {
    let src_stream = FileStream::open_read_only(src)?;
    let dst_stream = FileStream::create_new(dst)?;
    match copy_streams(src_stream, dst_stream) {
        Ok(n) => Ok(n),
        Err(e) => {
            let _ = std::fs::remove_file(dst);
            Err(e)
        }
    }
}

fn copy_streams(src: FileStream, dst: FileStream) -> FsResult<u64> {
    #[cfg(target_os = "linux")]
    {
        if let Some(total) = try_copy_file_range(&src, &dst)? {
            dst.sync_all()?;
            return Ok(total);
        }
    }

    let dst_path = dst.path().to_path_buf();
    let mut reader = BufReader::with_capacity(BUF_SIZE, src);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst);
    let bytes = io::copy(&mut reader, &mut writer).map_err(|e| os_call("copy file contents", &dst_path, e))?;
    writer.flush().map_err(|e| os_call("flush", &dst_path, e))?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

/// `Ok(None)` when the kernel cannot do this copy and nothing was written yet.
#[cfg(target_os = "linux")]
fn try_copy_file_range(src: &FileStream, dst: &FileStream) -> FsResult<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    let chunk: usize = 16 * 1024 * 1024; // 16 MiB per call
    let mut total: u64 = 0;
    loop {
        // SAFETY: both descriptors stay open for the duration of the call; null
        // offsets mean the file positions are used and advanced.
        let rc = unsafe {
            libc::copy_file_range(
                src.as_file().as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_file().as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
            continue;
        }
        if rc == 0 {
            return Ok(Some(total));
        }
        let err = io::Error::last_os_error();
        let unsupported = matches!(
            err.raw_os_error(),
            Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EPERM | libc::EOPNOTSUPP)
        );
        if total == 0 && unsupported {
            return Ok(None);
        }
        return Err(os_call("copy_file_range", dst.path(), err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FsErrorKind;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src.txt");
        let dst_path = dir.path().join("dst.txt");
        let data = b"hello world";
        fs::write(&src_path, data).unwrap();

        let n = copy_file_contents(&src_path, &dst_path).unwrap();
        assert_eq!(n, data.len() as u64);
        assert_eq!(fs::read(&dst_path).unwrap(), data);
    }

    #[test]
    fn copy_zero_length_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("empty");
        let dst_path = dir.path().join("out");
        File::create(&src_path).unwrap();

        assert_eq!(copy_file_contents(&src_path, &dst_path).unwrap(), 0);
        assert_eq!(fs::metadata(&dst_path).unwrap().len(), 0);
    }

    #[test]
    fn fails_if_dest_exists() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src");
        let dst_path = dir.path().join("dst");
        fs::write(&src_path, b"data").unwrap();
        fs::write(&dst_path, b"x").unwrap();

        let err = copy_file_contents(&src_path, &dst_path).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::OsCallFailure);
        // the pre-existing destination is not ours to clean up
        assert_eq!(fs::read(&dst_path).unwrap(), b"x");
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempdir().unwrap();
        let err = copy_file_contents(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NotFound);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn large_file_copy_boundary() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.bin");
        let dst = dir.path().join("big.out");

        let size = 2 * BUF_SIZE + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        assert_eq!(copy_file_contents(&src, &dst).unwrap() as usize, size);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
