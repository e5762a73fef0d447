//! Shared big-endian length-prefixed encoding primitives for the
//! `.oriondb` archive and `.idx` sidecar formats.

use crate::error::ArchiveError;
use crate::model::GamePosition;

pub(crate) fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn write_str(buf: &mut Vec<u8>, s: &str) {
    write_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

/// Writes `None` as a bare zero-length prefix and `Some(s)` as a normal
/// length-prefixed string, distinguishing "absent" from "present but
/// empty" by the length field alone — mirrors the archive format's
/// `comment_len = 0` convention for a move with no comment.
pub(crate) fn write_opt_str(buf: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => write_str(buf, s),
        None => write_u32(buf, 0),
    }
}

pub(crate) fn write_game_position(buf: &mut Vec<u8>, gp: &GamePosition) {
    write_u32(buf, gp.game_id);
    write_u32(buf, gp.ply);
    write_str(buf, &gp.fen);
}

pub(crate) fn write_game_positions<'a>(buf: &mut Vec<u8>, positions: impl ExactSizeIterator<Item = &'a GamePosition>) {
    write_u32(buf, positions.len() as u32);
    for gp in positions {
        write_game_position(buf, gp);
    }
}

/// A cursor over an in-memory byte slice, used to decode sidecar
/// sections and archive record bodies without pulling in a dependency
/// for it.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ArchiveError> {
        if self.remaining() < n {
            return Err(ArchiveError::TruncatedRecord(self.pos as u64));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a fixed number of raw bytes. Used by sidecar encoders for
    /// shapes (fixed-width structs, magic bytes) that don't fit the
    /// length-prefixed helpers above.
    pub(crate) fn take_public(&mut self, n: usize) -> Result<&'a [u8], ArchiveError> {
        self.take(n)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, ArchiveError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub(crate) fn read_str(&mut self) -> Result<String, ArchiveError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Inverse of [`write_opt_str`]: a zero-length prefix decodes to
    /// `None`, matching the archive's `comment_len = 0` convention.
    pub(crate) fn read_opt_str(&mut self) -> Result<Option<String>, ArchiveError> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Ok(None);
        }
        let bytes = self.take(len)?;
        Ok(Some(String::from_utf8(bytes.to_vec())?))
    }

    pub(crate) fn read_game_position(&mut self) -> Result<GamePosition, ArchiveError> {
        let game_id = self.read_u32()?;
        let ply = self.read_u32()?;
        let fen = self.read_str()?;
        Ok(GamePosition { game_id, ply, fen })
    }

    pub(crate) fn read_game_positions(&mut self) -> Result<Vec<GamePosition>, ArchiveError> {
        let count = self.read_u32()?;
        (0..count).map(|_| self.read_game_position()).collect()
    }
}
