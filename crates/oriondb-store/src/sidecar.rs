//! The `.idx` sidecar: every in-memory index built during ingest,
//! serialized as an ordered sequence of named, length-prefixed
//! sections so a newer reader can skip sections it doesn't recognize.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use oriondb_core::{MaterialSignature, TacticalMotif};

use crate::codec::{Reader, write_game_positions, write_str, write_u32};
use crate::error::ArchiveError;
use crate::index::{
    CommentIndex, IndexSet, MaterialIndex, MetadataIndex, MotifIndex, MoveIndex, PositionIndex, StructureIndex,
};
use crate::index::{motif_index, structure_index};
use crate::model::GamePosition;

const MAGIC: [u8; 4] = *b"ORIX";
const VERSION: u32 = 1;

/// Writes the sidecar to a temporary file beside `path` and renames it
/// into place, so a reader never observes a partially-written sidecar.
/// `rename` is atomic on every filesystem this is expected to run on; if
/// the temp file and `path` ever end up on different filesystems the
/// rename itself fails with an `Io` error rather than silently falling
/// back to a non-atomic copy.
pub fn save(indexes: &IndexSet, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
    let path = path.as_ref();
    let bytes = serialize(indexes);

    let tmp_path = path.with_extension("idx.tmp");
    let io_err = |source: std::io::Error| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp_path, bytes).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)
}

pub fn load(path: impl AsRef<Path>) -> Result<IndexSet, ArchiveError> {
    let bytes = fs::read(path.as_ref()).map_err(|e| ArchiveError::Io {
        path: path.as_ref().to_path_buf(),
        source: e,
    })?;
    deserialize(&bytes)
}

fn serialize(indexes: &IndexSet) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    write_u32(&mut out, VERSION);

    let sections: [(&str, Vec<u8>); 7] = [
        ("metadata", encode_metadata(&indexes.metadata)),
        ("position", encode_position(&indexes.position)),
        ("material", encode_material(&indexes.material)),
        ("structure", encode_structure(&indexes.structure)),
        ("moves", encode_moves(&indexes.moves)),
        ("motifs", encode_motifs(&indexes.motifs)),
        ("comments", encode_comments(&indexes.comments)),
    ];

    write_u32(&mut out, sections.len() as u32);
    for (name, payload) in &sections {
        write_str(&mut out, name);
        write_u32(&mut out, payload.len() as u32);
        out.extend_from_slice(payload);
    }
    out
}

fn deserialize(bytes: &[u8]) -> Result<IndexSet, ArchiveError> {
    let mut reader = Reader::new(bytes);
    let magic = reader.take_public(4)?;
    if magic != MAGIC {
        return Err(ArchiveError::SidecarMismatch("bad sidecar magic".to_string()));
    }
    let version = reader.read_u32()?;
    if version != VERSION {
        return Err(ArchiveError::SidecarMismatch(format!(
            "unsupported sidecar version {version}"
        )));
    }

    let mut indexes = IndexSet::default();
    let section_count = reader.read_u32()?;
    for _ in 0..section_count {
        let name = reader.read_str()?;
        let len = reader.read_u32()? as usize;
        let payload = reader.take_public(len)?;
        let mut section_reader = Reader::new(payload);
        match name.as_str() {
            "metadata" => indexes.metadata = decode_metadata(&mut section_reader)?,
            "position" => indexes.position = decode_position(&mut section_reader)?,
            "material" => indexes.material = decode_material(&mut section_reader)?,
            "structure" => indexes.structure = decode_structure(&mut section_reader)?,
            "moves" => indexes.moves = decode_moves(&mut section_reader)?,
            "motifs" => indexes.motifs = decode_motifs(&mut section_reader)?,
            "comments" => indexes.comments = decode_comments(&mut section_reader)?,
            other => {
                tracing::warn!(section = other, "ignoring unrecognized sidecar section");
            }
        }
    }
    Ok(indexes)
}

fn encode_metadata(index: &MetadataIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, index.game_offset.len() as u32);
    for (&id, &offset) in &index.game_offset {
        write_u32(&mut buf, id);
        buf.extend_from_slice(&offset.to_be_bytes());
    }
    encode_string_bucket_map(&mut buf, &index.player);
    encode_string_bucket_map(&mut buf, &index.event);
    encode_string_bucket_map(&mut buf, &index.eco);
    encode_string_bucket_map(&mut buf, &index.result);

    write_u32(&mut buf, index.elo.len() as u32);
    for (&elo, ids) in &index.elo {
        write_u32(&mut buf, elo);
        write_ids(&mut buf, ids);
    }

    write_u32(&mut buf, index.date.len() as u32);
    for (date, ids) in &index.date {
        write_str(&mut buf, date);
        write_ids(&mut buf, ids);
    }
    buf
}

fn decode_metadata(reader: &mut Reader) -> Result<MetadataIndex, ArchiveError> {
    let mut index = MetadataIndex::default();
    let offset_count = reader.read_u32()?;
    for _ in 0..offset_count {
        let id = reader.read_u32()?;
        let offset = reader.read_u64()?;
        index.game_offset.insert(id, offset);
    }
    index.player = decode_string_bucket_map(reader)?;
    index.event = decode_string_bucket_map(reader)?;
    index.eco = decode_string_bucket_map(reader)?;
    index.result = decode_string_bucket_map(reader)?;

    let elo_count = reader.read_u32()?;
    for _ in 0..elo_count {
        let elo = reader.read_u32()?;
        index.elo.insert(elo, read_ids(reader)?);
    }

    let date_count = reader.read_u32()?;
    for _ in 0..date_count {
        let date = reader.read_str()?;
        index.date.insert(date, read_ids(reader)?);
    }
    Ok(index)
}

fn write_ids(buf: &mut Vec<u8>, ids: &HashSet<u32>) {
    write_u32(buf, ids.len() as u32);
    for &id in ids {
        write_u32(buf, id);
    }
}

fn read_ids(reader: &mut Reader) -> Result<HashSet<u32>, ArchiveError> {
    let count = reader.read_u32()?;
    (0..count).map(|_| reader.read_u32()).collect()
}

fn encode_string_bucket_map(buf: &mut Vec<u8>, map: &HashMap<String, HashSet<u32>>) {
    write_u32(buf, map.len() as u32);
    for (key, ids) in map {
        write_str(buf, key);
        write_ids(buf, ids);
    }
}

fn decode_string_bucket_map(reader: &mut Reader) -> Result<HashMap<String, HashSet<u32>>, ArchiveError> {
    let count = reader.read_u32()?;
    let mut map = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let key = reader.read_str()?;
        let ids = read_ids(reader)?;
        map.insert(key, ids);
    }
    Ok(map)
}

fn encode_position(index: &PositionIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, index.by_hash.len() as u32);
    for (&hash, positions) in &index.by_hash {
        buf.extend_from_slice(&hash.to_be_bytes());
        write_game_positions(&mut buf, positions.iter());
    }
    buf
}

fn decode_position(reader: &mut Reader) -> Result<PositionIndex, ArchiveError> {
    let mut index = PositionIndex::default();
    let count = reader.read_u32()?;
    for _ in 0..count {
        let hash = reader.read_u64()?;
        let positions = reader.read_game_positions()?;
        index.by_hash.insert(hash, positions);
    }
    Ok(index)
}

fn encode_signature(buf: &mut Vec<u8>, sig: &MaterialSignature) {
    for field in [
        sig.white_queens,
        sig.white_rooks,
        sig.white_bishops,
        sig.white_knights,
        sig.white_pawns,
        sig.black_queens,
        sig.black_rooks,
        sig.black_bishops,
        sig.black_knights,
        sig.black_pawns,
    ] {
        buf.push(field);
    }
}

fn decode_signature(reader: &mut Reader) -> Result<MaterialSignature, ArchiveError> {
    let bytes = reader.take_public(10)?;
    Ok(MaterialSignature {
        white_queens: bytes[0],
        white_rooks: bytes[1],
        white_bishops: bytes[2],
        white_knights: bytes[3],
        white_pawns: bytes[4],
        black_queens: bytes[5],
        black_rooks: bytes[6],
        black_bishops: bytes[7],
        black_knights: bytes[8],
        black_pawns: bytes[9],
    })
}

fn encode_material(index: &MaterialIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, index.by_signature.len() as u32);
    for (sig, positions) in &index.by_signature {
        encode_signature(&mut buf, sig);
        write_game_positions(&mut buf, positions.iter());
    }
    write_u32(&mut buf, index.by_imbalance.len() as u32);
    for (&imbalance, positions) in &index.by_imbalance {
        buf.extend_from_slice(&imbalance.to_be_bytes());
        write_game_positions(&mut buf, positions.iter());
    }
    buf
}

fn decode_material(reader: &mut Reader) -> Result<MaterialIndex, ArchiveError> {
    let mut index = MaterialIndex::default();
    let sig_count = reader.read_u32()?;
    for _ in 0..sig_count {
        let sig = decode_signature(reader)?;
        let positions = reader.read_game_positions()?;
        index.by_signature.insert(sig, positions);
    }
    let imbalance_count = reader.read_u32()?;
    for _ in 0..imbalance_count {
        let imbalance = reader.read_i32()?;
        let positions = reader.read_game_positions()?;
        index.by_imbalance.insert(imbalance, positions);
    }
    Ok(index)
}

fn encode_structure(index: &StructureIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    for bucket in index.buckets() {
        write_game_positions(&mut buf, bucket.iter());
    }
    buf
}

fn decode_structure(reader: &mut Reader) -> Result<StructureIndex, ArchiveError> {
    let mut buckets: [HashSet<GamePosition>; structure_index::VARIANT_COUNT] = Default::default();
    for bucket in &mut buckets {
        *bucket = reader.read_game_positions()?.into_iter().collect();
    }
    Ok(StructureIndex::from_buckets(buckets))
}

fn encode_moves(index: &MoveIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, index.by_san.len() as u32);
    for (san, positions) in &index.by_san {
        write_str(&mut buf, san);
        write_game_positions(&mut buf, positions.iter());
    }
    write_u32(&mut buf, index.by_game.len() as u32);
    for (&game_id, moves) in &index.by_game {
        write_u32(&mut buf, game_id);
        write_u32(&mut buf, moves.len() as u32);
        for (san, ply, fen) in moves {
            write_str(&mut buf, san);
            write_u32(&mut buf, *ply);
            write_str(&mut buf, fen);
        }
    }
    buf
}

fn decode_moves(reader: &mut Reader) -> Result<MoveIndex, ArchiveError> {
    let mut index = MoveIndex::default();
    let san_count = reader.read_u32()?;
    for _ in 0..san_count {
        let san = reader.read_str()?;
        let positions = reader.read_game_positions()?.into_iter().collect();
        index.by_san.insert(san, positions);
    }
    let game_count = reader.read_u32()?;
    for _ in 0..game_count {
        let game_id = reader.read_u32()?;
        let move_count = reader.read_u32()?;
        let mut moves = Vec::with_capacity(move_count as usize);
        for _ in 0..move_count {
            let san = reader.read_str()?;
            let ply = reader.read_u32()?;
            let fen = reader.read_str()?;
            moves.push((san, ply, fen));
        }
        index.by_game.insert(game_id, moves);
    }
    Ok(index)
}

fn encode_motifs(index: &MotifIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    for bucket in index.buckets() {
        write_game_positions(&mut buf, bucket.iter());
    }
    write_u32(&mut buf, index.by_game.len() as u32);
    for (&game_id, plies) in &index.by_game {
        write_u32(&mut buf, game_id);
        write_u32(&mut buf, plies.len() as u32);
        for (&ply, motifs) in plies {
            write_u32(&mut buf, ply);
            write_u32(&mut buf, motifs.len() as u32);
            for &motif in motifs {
                buf.push(motif_variant_index(motif));
            }
        }
    }
    buf
}

fn decode_motifs(reader: &mut Reader) -> Result<MotifIndex, ArchiveError> {
    let mut buckets: [HashSet<GamePosition>; motif_index::VARIANT_COUNT] = Default::default();
    for bucket in &mut buckets {
        *bucket = reader.read_game_positions()?.into_iter().collect();
    }

    let mut by_game: HashMap<u32, BTreeMap<u32, HashSet<TacticalMotif>>> = HashMap::new();
    let game_count = reader.read_u32()?;
    for _ in 0..game_count {
        let game_id = reader.read_u32()?;
        let ply_count = reader.read_u32()?;
        let mut plies = BTreeMap::new();
        for _ in 0..ply_count {
            let ply = reader.read_u32()?;
            let motif_count = reader.read_u32()?;
            let mut motifs = HashSet::with_capacity(motif_count as usize);
            for _ in 0..motif_count {
                let byte = reader.take_public(1)?[0];
                motifs.insert(motif_index::variant_at(byte as usize));
            }
            plies.insert(ply, motifs);
        }
        by_game.insert(game_id, plies);
    }
    Ok(MotifIndex::from_parts(buckets, by_game))
}

fn motif_variant_index(motif: TacticalMotif) -> u8 {
    (0..motif_index::VARIANT_COUNT)
        .find(|&i| motif_index::variant_at(i) == motif)
        .expect("every TacticalMotif variant maps to a bucket index") as u8
}

fn encode_comments(index: &CommentIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, index.by_token.len() as u32);
    for (token, positions) in &index.by_token {
        write_str(&mut buf, token);
        write_game_positions(&mut buf, positions.iter());
    }
    buf
}

fn decode_comments(reader: &mut Reader) -> Result<CommentIndex, ArchiveError> {
    let mut index = CommentIndex::default();
    let count = reader.read_u32()?;
    for _ in 0..count {
        let token = reader.read_str()?;
        let positions = reader.read_game_positions()?.into_iter().collect();
        index.by_token.insert(token, positions);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GamePosition;

    #[test]
    fn roundtrips_a_populated_index_set() {
        let mut indexes = IndexSet::default();
        indexes.metadata.record_offset(0, 12);
        indexes.metadata.record_player(0, "Alice");
        indexes.position.record(
            42,
            GamePosition {
                game_id: 0,
                ply: 0,
                fen: "startpos".to_string(),
            },
        );
        indexes.comments.record(
            "strong attack",
            GamePosition {
                game_id: 0,
                ply: 1,
                fen: "after-e4".to_string(),
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.idx");
        save(&indexes, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.metadata.game_offset[&0], 12);
        assert!(loaded.metadata.player["alice"].contains(&0));
        assert_eq!(loaded.position.by_hash[&42].len(), 1);
        assert!(loaded.comments.by_token.contains_key("strong"));
    }

    #[test]
    fn rejects_wrong_magic() {
        let err = deserialize(b"NOPE0000").unwrap_err();
        assert!(matches!(err, ArchiveError::SidecarMismatch(_)));
    }
}
