//! Streaming PGN parser: splits input into per-game chunks, then extracts
//! tags and movetext from each chunk independently so one malformed game
//! never affects its neighbors.

use crate::error::ParseError;
use crate::game::{Game, Move, SEVEN_TAG_ROSTER};

struct RawGame {
    tag_lines: Vec<String>,
    movetext: String,
}

impl RawGame {
    fn has_content(&self) -> bool {
        !self.tag_lines.is_empty() || !self.movetext.trim().is_empty()
    }
}

/// Parses every game found in `input`, returning the successfully parsed
/// games plus a log of every game that failed. Never panics.
#[must_use]
pub fn parse(input: &str) -> (Vec<Game>, Vec<ParseError>) {
    let mut games = Vec::new();
    let mut errors = Vec::new();
    let mut next_id = 0u32;

    for raw in split_into_raw_games(input) {
        match build_game(&raw, next_id) {
            Ok(game) => {
                games.push(game);
                next_id += 1;
            }
            Err(err) => {
                tracing::warn!(offset = err.offset, message = %err.message, "skipping malformed PGN game");
                errors.push(err);
            }
        }
    }

    (games, errors)
}

/// Splits the input into raw per-game chunks. A game begins at the first
/// `[`-prefixed tag line; it ends when a new tag pair opens after the
/// buffer has moved past its tag block into movetext (the documented
/// blank-line-gap heuristic — inputs with blank lines inside movetext may
/// be over-split).
fn split_into_raw_games(input: &str) -> Vec<RawGame> {
    let mut games = Vec::new();
    let mut current = RawGame {
        tag_lines: Vec::new(),
        movetext: String::new(),
    };
    let mut header_in_progress = false;
    let mut saw_moves = false;

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('[') {
            if !header_in_progress && current.has_content() {
                games.push(current);
                current = RawGame {
                    tag_lines: Vec::new(),
                    movetext: String::new(),
                };
                saw_moves = false;
            }
            header_in_progress = true;
            current.tag_lines.push(trimmed.to_string());
            continue;
        }

        header_in_progress = false;
        saw_moves = true;
        if !current.movetext.is_empty() {
            current.movetext.push(' ');
        }
        current.movetext.push_str(trimmed);
    }

    if saw_moves || current.has_content() {
        games.push(current);
    }

    games
}

fn build_game(raw: &RawGame, id: u32) -> Result<Game, ParseError> {
    let tags = extract_tags(&raw.tag_lines);
    let moves = extract_moves(&raw.movetext)?;
    Ok(Game { id, tags, moves })
}

/// Extracts tag pairs in first-occurrence order, then appends any Seven
/// Tag Roster entry missing from the source with its conventional
/// default. A malformed tag line (no closing bracket, unquoted value) is
/// silently dropped rather than treated as a fatal parse error — only
/// movetext-level corruption halts a whole game.
fn extract_tags(tag_lines: &[String]) -> Vec<(String, String)> {
    let mut tags: Vec<(String, String)> = tag_lines.iter().filter_map(|l| parse_tag_line(l)).collect();
    for (name, default) in SEVEN_TAG_ROSTER {
        if !tags.iter().any(|(key, _)| key.eq_ignore_ascii_case(name)) {
            tags.push((name.to_string(), default.to_string()));
        }
    }
    tags
}

fn parse_tag_line(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[').and_then(|s| s.strip_suffix(']'))?;
    let (key, raw_value) = inner.split_once(' ')?;
    let value = raw_value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((key.to_string(), value.to_string()))
}

/// Single left-to-right scan over the raw movetext that simultaneously:
/// strips move-number glyphs (`\d+\.+`), NAGs (`$\d+`), and
/// balanced-parenthesis variation text; extracts brace comments (with
/// their byte offset in `movetext`) and attaches each to the immediately
/// preceding move token; and collects the remaining move tokens in
/// order. Stops at the first result token (`1-0`/`0-1`/`1/2-1/2`/`*`).
fn extract_moves(movetext: &str) -> Result<Vec<Move>, ParseError> {
    let mut moves: Vec<Move> = Vec::new();
    let mut chars = movetext.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        match c {
            '{' => {
                let start = i;
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, cc) in chars.by_ref() {
                    if cc == '}' {
                        closed = true;
                        break;
                    }
                    text.push(cc);
                }
                if !closed {
                    return Err(ParseError::new(start, "unterminated brace comment"));
                }
                if let Some(last) = moves.last_mut().filter(|m| m.comment.is_none()) {
                    last.comment = Some(text.trim().to_string());
                }
            }
            '(' => {
                let start = i;
                chars.next();
                let mut depth = 1i32;
                loop {
                    match chars.next() {
                        Some((_, '(')) => depth += 1,
                        Some((_, ')')) => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        Some(_) => {}
                        None => return Err(ParseError::new(start, "unterminated variation")),
                    }
                }
            }
            '$' => {
                chars.next();
                while matches!(chars.peek(), Some((_, d)) if d.is_ascii_digit()) {
                    chars.next();
                }
            }
            '*' => {
                chars.next();
                break;
            }
            _ if c.is_ascii_digit() => {
                chars.next();
                while matches!(chars.peek(), Some((_, d)) if d.is_ascii_digit()) {
                    chars.next();
                }
                match chars.peek().copied() {
                    Some((_, '.')) => {
                        while matches!(chars.peek(), Some((_, '.'))) {
                            chars.next();
                        }
                    }
                    Some((_, '-')) | Some((_, '/')) => {
                        while matches!(chars.peek(), Some((_, ch)) if !ch.is_whitespace()) {
                            chars.next();
                        }
                        break;
                    }
                    _ => {}
                }
            }
            _ => {
                let start = i;
                let mut end = i + c.len_utf8();
                chars.next();
                while let Some(&(j, cc)) = chars.peek() {
                    if cc.is_whitespace() || cc == '{' || cc == '(' {
                        break;
                    }
                    end = j + cc.len_utf8();
                    chars.next();
                }
                let token = movetext[start..end].trim_end_matches(['!', '?']);
                if !token.is_empty() {
                    moves.push(Move {
                        san: token.to_string(),
                        comment: None,
                    });
                }
            }
        }
    }

    Ok(moves)
}
