//! The `.oriondb` binary archive: a flat, append-only sequence of
//! length-prefixed game records behind a small fixed header.
//!
//! ```text
//! magic[4] = "ORDB"
//! version[4] (u32, big-endian) = 1
//! game_count[4] (u32, big-endian, backpatched by `ArchiveWriter::finish`)
//! record*
//! ```
//!
//! Each record is:
//!
//! ```text
//! game_length[4]   length in bytes of everything below, this record only
//! tag_count[4]
//!   ( key_len[4] key_bytes value_len[4] value_bytes ) * tag_count
//! move_count[4]
//!   ( san_len[4] san_bytes comment_len[4] comment_bytes ) * move_count
//! ```
//!
//! `comment_len` is `0` for a move with no comment. A game's id is never
//! stored in its record: it is recovered only through the metadata
//! index's offset-to-id map, so the archive itself is agnostic to how
//! ids are assigned.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use oriondb_pgn::Game;

use crate::codec::{Reader, write_opt_str, write_str, write_u32};
use crate::error::ArchiveError;

pub const MAGIC: [u8; 4] = *b"ORDB";
pub const VERSION: u32 = 1;

fn io_err(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Appends games to a new `.oriondb` file, recording each game's
/// starting byte offset (the position of its `game_length` prefix) as
/// it goes.
pub struct ArchiveWriter {
    path: PathBuf,
    file: BufWriter<File>,
    offset: u64,
    game_count: u32,
    /// Starting offset of each game written so far, in write order.
    pub offsets: Vec<u64>,
}

impl ArchiveWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| io_err(&path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&MAGIC)
            .and_then(|()| writer.write_all(&VERSION.to_be_bytes()))
            .and_then(|()| writer.write_all(&0u32.to_be_bytes()))
            .map_err(|e| io_err(&path, e))?;
        Ok(ArchiveWriter {
            path,
            file: writer,
            offset: 12,
            game_count: 0,
            offsets: Vec::new(),
        })
    }

    /// Appends one game's record and returns its starting offset.
    pub fn write_game(&mut self, game: &Game) -> Result<u64, ArchiveError> {
        let mut body = Vec::new();
        write_u32(&mut body, game.tags.len() as u32);
        for (key, value) in &game.tags {
            write_str(&mut body, key);
            write_str(&mut body, value);
        }
        write_u32(&mut body, game.moves.len() as u32);
        for mv in &game.moves {
            write_str(&mut body, &mv.san);
            write_opt_str(&mut body, mv.comment.as_deref());
        }

        let start = self.offset;
        self.file
            .write_all(&(body.len() as u32).to_be_bytes())
            .and_then(|()| self.file.write_all(&body))
            .map_err(|e| io_err(&self.path, e))?;
        self.offset += 4 + body.len() as u64;
        self.offsets.push(start);
        self.game_count += 1;
        Ok(start)
    }

    /// Flushes buffered writes and backpatches the header's game count.
    pub fn finish(mut self) -> Result<(), ArchiveError> {
        self.file.flush().map_err(|e| io_err(&self.path, e))?;
        let file = self.file.into_inner().map_err(|e| io_err(&self.path, e.into_error()))?;
        file.write_at(&self.game_count.to_be_bytes(), 8)
            .map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

/// A decoded game record, without an assigned id (the caller attaches
/// one from the metadata index's offset map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<(String, Option<String>)>,
}

/// Read-only handle on a `.oriondb` file. All reads are positioned
/// (`pread`-style) so a single handle can be shared across readers
/// without any shared mutable seek cursor.
pub struct ArchiveReader {
    path: PathBuf,
    file: File,
    pub game_count: u32,
}

impl ArchiveReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| io_err(&path, e))?;

        let mut header = [0u8; 12];
        file.read_exact_at(&mut header, 0)
            .map_err(|e| io_err(&path, e))?;

        let magic: [u8; 4] = header[0..4].try_into().unwrap();
        if magic != MAGIC {
            return Err(ArchiveError::BadMagic(magic));
        }
        let version = u32::from_be_bytes(header[4..8].try_into().unwrap());
        if version != VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let game_count = u32::from_be_bytes(header[8..12].try_into().unwrap());

        Ok(ArchiveReader {
            path,
            file,
            game_count,
        })
    }

    /// Reads and decodes the game record starting at `offset` (the
    /// position of its `game_length` prefix, as returned by
    /// [`ArchiveWriter::write_game`]).
    pub fn read_game_at(&self, offset: u64) -> Result<ArchivedGame, ArchiveError> {
        let mut len_bytes = [0u8; 4];
        self.file
            .read_exact_at(&mut len_bytes, offset)
            .map_err(|e| io_err(&self.path, e))?;
        let len = u32::from_be_bytes(len_bytes) as usize;

        let mut body = vec![0u8; len];
        self.file
            .read_exact_at(&mut body, offset + 4)
            .map_err(|e| io_err(&self.path, e))?;

        let mut reader = Reader::new(&body);
        let tag_count = reader.read_u32()?;
        let mut tags = Vec::with_capacity(tag_count as usize);
        for _ in 0..tag_count {
            let key = reader.read_str()?;
            let value = reader.read_str()?;
            tags.push((key, value));
        }

        let move_count = reader.read_u32()?;
        let mut moves = Vec::with_capacity(move_count as usize);
        for _ in 0..move_count {
            let san = reader.read_str()?;
            let comment = reader.read_opt_str()?;
            moves.push((san, comment));
        }

        Ok(ArchivedGame { tags, moves })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oriondb_pgn::parse;

    #[test]
    fn writes_and_reads_back_a_single_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");

        let (games, errors) = parse(
            "[Event \"Test\"]\n[White \"A\"]\n[Black \"B\"]\n1. e4 {best by test} e5 2. Nf3 Nc6 *",
        );
        assert!(errors.is_empty());

        let mut writer = ArchiveWriter::create(&path).unwrap();
        let offset = writer.write_game(&games[0]).unwrap();
        writer.finish().unwrap();

        let reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.game_count, 1);
        let decoded = reader.read_game_at(offset).unwrap();
        assert_eq!(decoded.tags.iter().find(|(k, _)| k == "White").unwrap().1, "A");
        assert_eq!(decoded.moves.len(), 4);
    }

    #[test]
    fn rejects_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.oriondb");
        std::fs::write(&path, b"NOPE\x00\x00\x00\x01\x00\x00\x00\x00").unwrap();
        assert!(matches!(
            ArchiveReader::open(&path),
            Err(ArchiveError::BadMagic(_))
        ));
    }
}
