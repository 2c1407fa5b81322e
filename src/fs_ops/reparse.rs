//! Parser for the symbolic-link flavour of the Windows `REPARSE_DATA_BUFFER`.
//!
//! Layout (little-endian):
//!
//! ```text
//!  0  u32  ReparseTag            (0xA000000C for symlinks)
//!  4  u16  ReparseDataLength
//!  6  u16  Reserved
//!  8  u16  SubstituteNameOffset  (bytes, relative to PathBuffer)
//! 10  u16  SubstituteNameLength  (bytes)
//! 12  u16  PrintNameOffset
//! 14  u16  PrintNameLength
//! 16  u32  Flags                 (1 = target is relative)
//! 20  ...  PathBuffer            (UTF-16LE)
//! ```
//!
//! Pure byte parsing; the Windows platform module feeds it the output of
//! `FSCTL_GET_REPARSE_POINT`.

use crate::errors::{FsError, FsResult};

pub const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;
pub const SYMLINK_FLAG_RELATIVE: u32 = 0x0000_0001;

const TAG_HEADER_LEN: usize = 8;
const PATH_BUFFER_OFFSET: usize = 20;

/// Names recovered from a symlink reparse point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkReparseData {
    /// Target as stored by the filesystem (may carry an NT `\??\` prefix).
    pub substitute_name: String,
    /// Display form of the target.
    pub print_name: String,
    pub flags: u32,
}

impl SymlinkReparseData {
    pub fn is_relative(&self) -> bool {
        self.flags & SYMLINK_FLAG_RELATIVE != 0
    }
}

fn read_u16(buf: &[u8], at: usize) -> FsResult<u16> {
    buf.get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| FsError::InvalidReparseData(format!("truncated buffer reading u16 at {at}")))
}

fn read_u32(buf: &[u8], at: usize) -> FsResult<u32> {
    buf.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| FsError::InvalidReparseData(format!("truncated buffer reading u32 at {at}")))
}

/// Read the reparse tag only.
pub fn reparse_tag(buf: &[u8]) -> FsResult<u32> {
    if buf.len() < TAG_HEADER_LEN {
        return Err(FsError::InvalidReparseData(format!(
            "buffer too short for reparse header: {} bytes",
            buf.len()
        )));
    }
    read_u32(buf, 0)
}

/// Decode a UTF-16LE name located at `offset`/`len` bytes within the path buffer.
fn decode_name(path_buffer: &[u8], offset: usize, len: usize, what: &str) -> FsResult<String> {
    if len % 2 != 0 {
        return Err(FsError::InvalidReparseData(format!("{what} length {len} is not UTF-16 aligned")));
    }
    let bytes = path_buffer.get(offset..offset + len).ok_or_else(|| {
        FsError::InvalidReparseData(format!(
            "{what} (offset {offset}, length {len}) exceeds path buffer of {} bytes",
            path_buffer.len()
        ))
    })?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| FsError::InvalidReparseData(format!("{what} is not valid UTF-16: {e}")))
}

/// Parse a symlink reparse buffer. The tag is verified before any offset or
/// length field is trusted.
pub fn parse_symlink_reparse_buffer(buf: &[u8]) -> FsResult<SymlinkReparseData> {
    let tag = reparse_tag(buf)?;
    if tag != IO_REPARSE_TAG_SYMLINK {
        return Err(FsError::InvalidReparseData(format!(
            "reparse tag {tag:#010x} is not a symbolic link"
        )));
    }
    if buf.len() < PATH_BUFFER_OFFSET {
        return Err(FsError::InvalidReparseData(format!(
            "buffer too short for symlink header: {} bytes",
            buf.len()
        )));
    }

    let data_len = read_u16(buf, 4)? as usize;
    let sub_off = read_u16(buf, 8)? as usize;
    let sub_len = read_u16(buf, 10)? as usize;
    let print_off = read_u16(buf, 12)? as usize;
    let print_len = read_u16(buf, 14)? as usize;
    let flags = read_u32(buf, 16)?;

    // ReparseDataLength counts everything after the 8-byte tag header; clamp to what we got.
    let end = (TAG_HEADER_LEN + data_len).min(buf.len()).max(PATH_BUFFER_OFFSET);
    let path_buffer = &buf[PATH_BUFFER_OFFSET..end];

    let substitute_name = decode_name(path_buffer, sub_off, sub_len, "substitute name")?;
    let print_name = decode_name(path_buffer, print_off, print_len, "print name")?;

    Ok(SymlinkReparseData {
        substitute_name,
        print_name,
        flags,
    })
}

/// Build a symlink reparse buffer: substitute name first, print name after it.
/// Inverse of [`parse_symlink_reparse_buffer`]; used by tests.
#[cfg(test)]
pub(crate) fn encode_symlink_reparse_buffer(substitute: &str, print: &str, flags: u32) -> Vec<u8> {
    let sub: Vec<u8> = substitute.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let prn: Vec<u8> = print.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let data_len = (PATH_BUFFER_OFFSET - TAG_HEADER_LEN) + sub.len() + prn.len();

    let mut buf = Vec::with_capacity(TAG_HEADER_LEN + data_len);
    buf.extend_from_slice(&IO_REPARSE_TAG_SYMLINK.to_le_bytes());
    buf.extend_from_slice(&(data_len as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&(sub.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(sub.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(prn.len() as u16).to_le_bytes());
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&sub);
    buf.extend_from_slice(&prn);
    buf
}
