//! Tokenized full-text lookup over move comments.

use std::collections::{HashMap, HashSet};

use crate::model::GamePosition;

#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    pub by_token: HashMap<String, HashSet<GamePosition>>,
}

impl CommentIndex {
    /// Lowercases, splits on whitespace and `[,.!?;:]`, and drops tokens
    /// of length two or shorter before indexing.
    pub fn record(&mut self, comment: &str, position: GamePosition) {
        for token in tokenize(comment) {
            self.by_token
                .entry(token)
                .or_default()
                .insert(position.clone());
        }
    }
}

fn tokenize(comment: &str) -> Vec<String> {
    comment
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
        .filter(|token| token.len() > 2)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_and_drops_short_tokens() {
        let tokens = tokenize("White is, clearly! winning: a rook up.");
        assert!(tokens.contains(&"white".to_string()));
        assert!(tokens.contains(&"clearly".to_string()));
        assert!(tokens.contains(&"winning".to_string()));
        assert!(tokens.contains(&"rook".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
        assert!(!tokens.contains(&"a".to_string()));
    }

    #[test]
    fn records_each_token_for_the_position() {
        let mut index = CommentIndex::default();
        index.record(
            "strong attack",
            GamePosition {
                game_id: 1,
                ply: 5,
                fen: String::new(),
            },
        );
        assert_eq!(index.by_token["strong"].len(), 1);
        assert_eq!(index.by_token["attack"].len(), 1);
    }
}
