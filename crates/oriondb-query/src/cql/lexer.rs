//! Tokenizer for CQL source text.

use crate::error::CqlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(i64),
    Op(CmpOp),
    And,
    Or,
    LParen,
    RParen,
    Eof,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.source[start..end];
        match text.to_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "CONTAINS" => Token::Op(CmpOp::Contains),
            _ => Token::Ident(text.to_string()),
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.source[start..end];
        Token::Num(text.parse().unwrap_or(0))
    }

    fn lex_string(&mut self, quote: char, start: usize) -> Result<Token, CqlError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(Token::Str(value)),
                Some((_, c)) => value.push(c),
                None => return Err(CqlError::UnterminatedString(start)),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, CqlError> {
        self.skip_whitespace();
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '(' => {
                self.chars.next();
                Ok(Token::LParen)
            }
            ')' => {
                self.chars.next();
                Ok(Token::RParen)
            }
            '\'' | '"' => {
                self.chars.next();
                self.lex_string(c, start)
            }
            '=' => {
                self.chars.next();
                Ok(Token::Op(CmpOp::Eq))
            }
            '!' => {
                self.chars.next();
                match self.chars.next() {
                    Some((_, '=')) => Ok(Token::Op(CmpOp::Ne)),
                    Some((i, other)) => Err(CqlError::UnexpectedCharacter(other, i)),
                    None => Err(CqlError::UnexpectedEof("'=' after '!'")),
                }
            }
            '>' => {
                self.chars.next();
                if matches!(self.chars.peek(), Some((_, '='))) {
                    self.chars.next();
                    Ok(Token::Op(CmpOp::Ge))
                } else {
                    Ok(Token::Op(CmpOp::Gt))
                }
            }
            '<' => {
                self.chars.next();
                if matches!(self.chars.peek(), Some((_, '='))) {
                    self.chars.next();
                    Ok(Token::Op(CmpOp::Le))
                } else {
                    Ok(Token::Op(CmpOp::Lt))
                }
            }
            c if c.is_ascii_digit() => {
                self.chars.next();
                Ok(self.lex_number(start))
            }
            c if c.is_alphabetic() || c == '_' => {
                self.chars.next();
                Ok(self.lex_ident_or_keyword(start))
            }
            other => {
                self.chars.next();
                Err(CqlError::UnexpectedCharacter(other, start))
            }
        }
    }

    /// Lexes the entire source into a token list, terminated by a single
    /// trailing [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, CqlError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token == Token::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_a_simple_comparison() {
        let tokens = Lexer::new("player = 'Carlsen, Magnus'").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("player".to_string()),
                Token::Op(CmpOp::Eq),
                Token::Str("Carlsen, Magnus".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let tokens = Lexer::new("a=1 and b=2 OR c contains 'x'").tokenize().unwrap();
        assert!(tokens.contains(&Token::And));
        assert!(tokens.contains(&Token::Or));
        assert!(tokens.contains(&Token::Op(CmpOp::Contains)));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::new("player = 'unterminated").tokenize().is_err());
    }

    #[test]
    fn unknown_character_is_an_error() {
        assert!(Lexer::new("player ~ 'x'").tokenize().is_err());
    }
}
