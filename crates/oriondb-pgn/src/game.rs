//! Parsed PGN game records.

/// A single movetext entry: a raw SAN token plus any brace comment that
/// immediately followed it in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub san: String,
    pub comment: Option<String>,
}

/// The Seven Tag Roster, in PGN's canonical order. Any tag missing from
/// the source is filled in with its PGN-conventional default.
pub const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// A parsed game: its tag pairs (first-occurrence order, roster defaults
/// filled in) and its movetext as a sequence of moves.
///
/// `id` is assigned by the parser itself, a monotonic counter over
/// successfully parsed games starting at 0 — a game that fails to parse
/// does not consume an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: u32,
    pub tags: Vec<(String, String)>,
    pub moves: Vec<Move>,
}

impl Game {
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
