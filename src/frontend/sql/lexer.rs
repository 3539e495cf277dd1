use std::fmt;

use crate::frontend::sql::errors::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Join,
    On,
    Where,
    And,
    Or,
    Limit,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Keyword> {
        Some(match word.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "JOIN" => Keyword::Join,
            "ON" => Keyword::On,
            "WHERE" => Keyword::Where,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "LIMIT" => Keyword::Limit,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),

    // literals
    Int(i64),
    Float(f64),
    String(String),

    // punctuation
    Dot,
    Comma,
    LParen,
    RParen,
    Semicolon,

    // operators
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,

    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub text: String,
    pub position: Position,
}

impl Lexeme {
    pub fn describe(&self) -> Option<String> {
        match self.token {
            Token::EOF => None,
            Token::String(_) => Some(format!("string {}", self.text)),
            _ => Some(self.text.clone()),
        }
    }
}

pub struct Tokenizer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Lexes the whole input. The last lexeme is always `Token::EOF`.
    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, ParseError> {
        let mut out = Vec::new();
        loop {
            let lexeme = self.next_token()?;
            let done = lexeme.token == Token::EOF;
            out.push(lexeme);
            if done {
                return Ok(out);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Lexeme, ParseError> {
        self.skip_whitespace();

        let start = self.position();
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Ok(Lexeme {
                    token: Token::EOF,
                    text: String::new(),
                    position: start,
                });
            }
        };

        let token = match c {
            // ---------- punctuation ----------
            '.' => Token::Dot,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ';' => Token::Semicolon,

            // ---------- operators ----------
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '=' => Token::Eq,

            '!' => {
                if self.consume('=') {
                    Token::NotEq
                } else {
                    return Err(ParseError::UnexpectedCharacter {
                        ch: '!',
                        position: start,
                    });
                }
            }

            '<' => {
                if self.consume('=') {
                    Token::Le
                } else if self.consume('>') {
                    Token::NotEq
                } else {
                    Token::Lt
                }
            }

            '>' => {
                if self.consume('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }

            // ---------- string literal ----------
            '\'' | '"' => Token::String(self.lex_string(c, start)?),

            // ---------- number ----------
            c if c.is_ascii_digit() => self.lex_number(start)?,

            // ---------- identifier / keyword ----------
            c if is_ident_start(c) => {
                let word = self.take_while(start.offset, is_ident_continue);
                match Keyword::lookup(word) {
                    Some(kw) => Token::Keyword(kw),
                    None => Token::Ident(word.to_lowercase()),
                }
            }

            other => {
                return Err(ParseError::UnexpectedCharacter {
                    ch: other,
                    position: start,
                });
            }
        };

        let end = self.position().offset;
        Ok(Lexeme {
            token,
            text: self.input[start.offset..end].to_string(),
            position: start,
        })
    }

    fn lex_string(&mut self, quote: char, start: Position) -> Result<String, ParseError> {
        let mut s = String::new();
        loop {
            match self.bump() {
                // a doubled quote is an escaped quote
                Some(ch) if ch == quote => {
                    if self.consume(quote) {
                        s.push(quote);
                    } else {
                        return Ok(s);
                    }
                }
                Some(ch) => s.push(ch),
                None => return Err(ParseError::UnterminatedString { position: start }),
            }
        }
    }

    fn lex_number(&mut self, start: Position) -> Result<Token, ParseError> {
        // Swallow everything that could belong to the literal so that `12ab`
        // or `1.2.3` are reported whole.
        let text = self.take_while(start.offset, |ch| {
            ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
        });

        let invalid = || ParseError::InvalidLiteral {
            literal: text.to_string(),
            position: start,
        };

        if text.bytes().all(|b| b.is_ascii_digit()) {
            return text.parse().map(Token::Int).map_err(|_| invalid());
        }

        match text.split_once('.') {
            Some((int, frac))
                if !frac.is_empty()
                    && int.bytes().all(|b| b.is_ascii_digit())
                    && frac.bytes().all(|b| b.is_ascii_digit()) =>
            {
                text.parse().map(Token::Float).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }

    fn take_while(&mut self, from: usize, pred: impl Fn(char) -> bool) -> &'a str {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        let end = self.position().offset;
        let input = self.input;
        &input[from..end]
    }

    fn position(&mut self) -> Position {
        let offset = self
            .chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.input.len());
        Position {
            offset,
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn consume(&mut self, expected: char) -> bool {
        matches!(self.chars.peek(), Some(&(_, c)) if c == expected) && {
            self.bump();
            true
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.chars.peek() {
                Some(&(_, c)) if c.is_whitespace() => {
                    self.bump();
                }
                Some(&(_, '-')) => {
                    // Look ahead for '--'
                    let mut temp = self.chars.clone();
                    temp.next();
                    if matches!(temp.peek(), Some(&(_, '-'))) {
                        while let Some(ch) = self.bump() {
                            if ch == '\n' {
                                break;
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn tokenize(input: &str) -> Result<Vec<Lexeme>, ParseError> {
    Tokenizer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(sql: &str) -> Vec<Token> {
        tokenize(sql)
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect()
    }

    #[test]
    fn lexes_select_with_predicate() {
        assert_eq!(
            tokens("select Name from users where age >= 25"),
            vec![
                Token::Keyword(Keyword::Select),
                Token::Ident("name".into()),
                Token::Keyword(Keyword::From),
                Token::Ident("users".into()),
                Token::Keyword(Keyword::Where),
                Token::Ident("age".into()),
                Token::Ge,
                Token::Int(25),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn lexes_comparison_operators() {
        assert_eq!(
            tokens("< <= > >= = <> !="),
            vec![
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
                Token::Eq,
                Token::NotEq,
                Token::NotEq,
                Token::EOF,
            ]
        );
    }

    #[test]
    fn lexes_literals() {
        assert_eq!(
            tokens("42 4.5 'it''s'"),
            vec![
                Token::Int(42),
                Token::Float(4.5),
                Token::String("it's".into()),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn records_positions_and_text() {
        let lexemes = tokenize("SELECT\n  users.id").unwrap();

        assert_eq!(lexemes[1].text, "users");
        assert_eq!(lexemes[1].position.line, 2);
        assert_eq!(lexemes[1].position.column, 3);
        assert_eq!(lexemes[1].position.offset, 9);
        assert_eq!(lexemes[2].token, Token::Dot);
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(
            tokens("-- header\nLIMIT 1"),
            vec![Token::Keyword(Keyword::Limit), Token::Int(1), Token::EOF]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("SELECT 'abc").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
        assert_eq!(err.position().column, 8);
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert!(matches!(
            tokenize("12ab").unwrap_err(),
            ParseError::InvalidLiteral { .. }
        ));
        assert!(matches!(
            tokenize("1.2.3").unwrap_err(),
            ParseError::InvalidLiteral { .. }
        ));
        assert!(matches!(
            tokenize("99999999999999999999").unwrap_err(),
            ParseError::InvalidLiteral { .. }
        ));
    }

    #[test]
    fn unknown_character_is_an_error() {
        assert!(matches!(
            tokenize("SELECT # FROM t").unwrap_err(),
            ParseError::UnexpectedCharacter { ch: '#', .. }
        ));
    }
}
