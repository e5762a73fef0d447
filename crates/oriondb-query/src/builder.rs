//! Fluent query builder and execution against an open archive + index set.

use std::collections::HashSet;

use oriondb_core::{fen, zobrist, PawnStructure, TacticalMotif};
use oriondb_store::{ArchivedGame, ArchiveReader, IndexSet};

/// A conjunction of filters over the predicate slots oriondb indexes.
/// Built fluently via [`QueryBuilder`], or produced by compiling CQL text
/// (see [`crate::cql`]).
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub player: Option<String>,
    pub event: Option<String>,
    pub eco: Option<String>,
    pub result: Option<String>,
    pub min_elo: Option<u32>,
    pub max_elo: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub fen: Option<String>,
    pub pawn_structure: Option<PawnStructure>,
    pub commentary: Option<String>,
    pub san_move: Option<String>,
    pub motif: Option<TacticalMotif>,
}

/// Full domain defaults for the range predicates, used when their bound
/// is left unset.
const MIN_ELO_DEFAULT: u32 = 0;
const MAX_ELO_DEFAULT: u32 = 3000;
const MIN_DATE_DEFAULT: &str = "0000.00.00";
const MAX_DATE_DEFAULT: &str = "9999.99.99";

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    pub fn player(mut self, name: impl Into<String>) -> Self {
        self.query.player = Some(name.into());
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.query.event = Some(name.into());
        self
    }

    pub fn eco(mut self, code: impl Into<String>) -> Self {
        self.query.eco = Some(code.into());
        self
    }

    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.query.result = Some(result.into());
        self
    }

    pub fn min_elo(mut self, elo: u32) -> Self {
        self.query.min_elo = Some(elo);
        self
    }

    pub fn max_elo(mut self, elo: u32) -> Self {
        self.query.max_elo = Some(elo);
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.query.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.query.end_date = Some(date.into());
        self
    }

    pub fn fen(mut self, fen: impl Into<String>) -> Self {
        self.query.fen = Some(fen.into());
        self
    }

    pub fn pawn_structure(mut self, structure: PawnStructure) -> Self {
        self.query.pawn_structure = Some(structure);
        self
    }

    pub fn commentary(mut self, text: impl Into<String>) -> Self {
        self.query.commentary = Some(text.into());
        self
    }

    pub fn san_move(mut self, san: impl Into<String>) -> Self {
        self.query.san_move = Some(san.into());
        self
    }

    pub fn motif(mut self, motif: TacticalMotif) -> Self {
        self.query.motif = Some(motif);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Accumulates the running intersection of posting sets. `None` means
/// "no filter has contributed yet" (the universal set); `Some(empty)`
/// short-circuits every later intersection to empty.
fn intersect(acc: &mut Option<HashSet<u32>>, ids: HashSet<u32>) {
    *acc = Some(match acc.take() {
        None => ids,
        Some(existing) => existing.intersection(&ids).copied().collect(),
    });
}

fn tokenize_search_text(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
        .filter(|token| token.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Intersects the comment index's per-token posting sets for every token
/// in `text`, returning the game ids whose commentary mentions all of
/// them. An empty token list (e.g. a search string of only stopwords)
/// matches nothing, matching the rest of this module's empty-means-empty
/// convention.
fn commentary_game_ids(indexes: &IndexSet, text: &str) -> HashSet<u32> {
    let tokens = tokenize_search_text(text);
    if tokens.is_empty() {
        return HashSet::new();
    }
    let mut result: Option<HashSet<u32>> = None;
    for token in tokens {
        let ids: HashSet<u32> = indexes
            .comments
            .by_token
            .get(&token)
            .map(|positions| positions.iter().map(|p| p.game_id).collect())
            .unwrap_or_default();
        intersect(&mut result, ids);
    }
    result.unwrap_or_default()
}

/// Resolves `query` against `indexes`, returning the set of matching
/// game ids without reading any game bodies. Every unset predicate slot
/// contributes nothing; a query with no predicates at all matches every
/// ingested game.
pub fn matching_game_ids(query: &Query, indexes: &IndexSet) -> HashSet<u32> {
    let mut acc: Option<HashSet<u32>> = None;

    if let Some(player) = &query.player {
        let key = player.trim().to_lowercase();
        let ids = indexes.metadata.player.get(&key).cloned().unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if let Some(event) = &query.event {
        let key = event.trim().to_lowercase();
        let ids = indexes.metadata.event.get(&key).cloned().unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if let Some(eco) = &query.eco {
        let key = eco.trim().to_uppercase();
        let ids = indexes.metadata.eco.get(&key).cloned().unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if let Some(result) = &query.result {
        let ids = indexes.metadata.result.get(result).cloned().unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if query.min_elo.is_some() || query.max_elo.is_some() {
        let min = query.min_elo.unwrap_or(MIN_ELO_DEFAULT);
        let max = query.max_elo.unwrap_or(MAX_ELO_DEFAULT);
        let mut ids = HashSet::new();
        for (_, bucket) in indexes.metadata.elo.range(min..=max) {
            ids.extend(bucket.iter().copied());
        }
        intersect(&mut acc, ids);
    }
    if query.start_date.is_some() || query.end_date.is_some() {
        let start = query.start_date.clone().unwrap_or_else(|| MIN_DATE_DEFAULT.to_string());
        let end = query.end_date.clone().unwrap_or_else(|| MAX_DATE_DEFAULT.to_string());
        let mut ids = HashSet::new();
        for (_, bucket) in indexes.metadata.date.range(start..=end) {
            ids.extend(bucket.iter().copied());
        }
        intersect(&mut acc, ids);
    }
    if let Some(target_fen) = &query.fen {
        let ids = fen::parse(target_fen)
            .ok()
            .map(|pos| {
                let hash = zobrist::hash(&pos);
                indexes
                    .position
                    .by_hash
                    .get(&hash)
                    .map(|positions| positions.iter().map(|p| p.game_id).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if let Some(structure) = query.pawn_structure {
        let ids = indexes.structure.get(structure).iter().map(|p| p.game_id).collect();
        intersect(&mut acc, ids);
    }
    if let Some(text) = &query.commentary {
        intersect(&mut acc, commentary_game_ids(indexes, text));
    }
    if let Some(san) = &query.san_move {
        let ids = indexes
            .moves
            .by_san
            .get(san)
            .map(|positions| positions.iter().map(|p| p.game_id).collect())
            .unwrap_or_default();
        intersect(&mut acc, ids);
    }
    if let Some(motif) = query.motif {
        let ids = indexes.motifs.get(motif).iter().map(|p| p.game_id).collect();
        intersect(&mut acc, ids);
    }

    match acc {
        Some(ids) => ids,
        None => indexes.metadata.game_offset.keys().copied().collect(),
    }
}

/// Intersects and returns only the candidate count, never reading a
/// single game body.
pub fn count(query: &Query, indexes: &IndexSet) -> usize {
    matching_game_ids(query, indexes).len()
}

/// Intersects, then resolves each candidate game id through the metadata
/// offset map and reads its body from `archive`. A game whose offset is
/// missing or whose body fails to decode is logged and skipped — a
/// single bad record never aborts the whole query.
pub fn execute(query: &Query, archive: &ArchiveReader, indexes: &IndexSet) -> Vec<ArchivedGame> {
    let mut ids: Vec<u32> = matching_game_ids(query, indexes).into_iter().collect();
    ids.sort_unstable();

    let mut games = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(&offset) = indexes.metadata.game_offset.get(&id) else {
            tracing::warn!(game_id = id, "matched game id has no archive offset, skipping");
            continue;
        };
        match archive.read_game_at(offset) {
            Ok(game) => games.push(game),
            Err(err) => {
                tracing::warn!(game_id = id, %err, "failed to read matched game, skipping");
            }
        }
    }
    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use oriondb_store::{GamePosition, IngestConfig, Ingestor};

    fn build_sample(pgn: &str, config: IngestConfig) -> (tempfile::TempDir, ArchiveReader, IndexSet) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        let mut ingestor = Ingestor::new(&path, config).unwrap();
        ingestor.ingest_str(pgn).unwrap();
        let indexes = ingestor.finish().unwrap();
        let reader = ArchiveReader::open(&path).unwrap();
        (dir, reader, indexes)
    }

    const THREE_GAMES: &str = concat!(
        "[Event \"World Cup\"]\n[White \"Carlsen, Magnus\"]\n[Black \"Nepo\"]\n[Result \"1-0\"]\n",
        "1. e4 e5 1-0\n\n",
        "[Event \"World Cup\"]\n[White \"Nepo\"]\n[Black \"Carlsen, Magnus\"]\n[Result \"0-1\"]\n",
        "1. d4 d5 0-1\n\n",
        "[Event \"World Cup\"]\n[White \"Kasparov\"]\n[Black \"Karpov\"]\n[Result \"1/2-1/2\"]\n",
        "1. c4 c5 1/2-1/2\n",
    );

    #[test]
    fn player_and_result_intersection_narrows_to_one_game() {
        let (_dir, archive, indexes) = build_sample(THREE_GAMES, IngestConfig::default());
        let query = QueryBuilder::new()
            .player("carlsen, magnus")
            .result("1-0")
            .build();
        let games = execute(&query, &archive, &indexes);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].tags.iter().find(|(k, _)| k == "Black").unwrap().1, "Nepo");
    }

    #[test]
    fn unmatched_predicate_returns_empty_without_reading_any_game() {
        let (_dir, archive, indexes) = build_sample(THREE_GAMES, IngestConfig::default());
        let query = QueryBuilder::new().player("nobody").build();
        assert_eq!(count(&query, &indexes), 0);
        assert!(execute(&query, &archive, &indexes).is_empty());
    }

    #[test]
    fn no_predicates_matches_every_game() {
        let (_dir, _archive, indexes) = build_sample(THREE_GAMES, IngestConfig::default());
        let query = QueryBuilder::new().build();
        assert_eq!(count(&query, &indexes), 3);
    }

    #[test]
    fn find_move_resolves_to_post_move_ply_and_fen() {
        let (_dir, _archive, indexes) = build_sample(
            "[Event \"Test\"]\n1. e4 c5 2. Nf3 *",
            IngestConfig::default(),
        );
        let positions = indexes.moves.by_san.get("Nf3").unwrap();
        assert_eq!(positions.len(), 1);
        let gp: &GamePosition = positions.iter().next().unwrap();
        assert_eq!(gp.ply, 3);
        assert!(!gp.fen.is_empty());
    }

    #[test]
    fn elo_range_excludes_games_outside_the_bound() {
        let pgn = concat!(
            "[Event \"A\"]\n[WhiteElo \"2750\"]\n1. e4 *\n\n",
            "[Event \"B\"]\n[WhiteElo \"2680\"]\n1. d4 *\n",
        );
        let (_dir, _archive, indexes) = build_sample(pgn, IngestConfig::default());
        let query = QueryBuilder::new().min_elo(2701).max_elo(2799).build();
        assert_eq!(count(&query, &indexes), 1);
    }

    #[test]
    fn commentary_search_requires_all_tokens_to_be_present() {
        let pgn = "[Event \"Test\"]\n1. e4 {a strong central advance} e5 *";
        let (_dir, _archive, indexes) = build_sample(pgn, IngestConfig::default());
        assert_eq!(
            count(&QueryBuilder::new().commentary("strong advance").build(), &indexes),
            1
        );
        assert_eq!(
            count(&QueryBuilder::new().commentary("weak retreat").build(), &indexes),
            0
        );
    }

    #[test]
    fn missing_index_predicate_is_empty_not_an_error() {
        let config = IngestConfig {
            enable_comment_indexing: false,
            ..IngestConfig::default()
        };
        let (_dir, _archive, indexes) = build_sample("[Event \"Test\"]\n1. e4 {note} e5 *", config);
        let query = QueryBuilder::new().commentary("note").build();
        assert_eq!(count(&query, &indexes), 0);
    }
}
