use std::fmt;

use crate::frontend::sql::lexer::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Expected {
        expected: String,
        found: Option<String>,
        position: Position,
    },

    InvalidLiteral {
        literal: String,
        position: Position,
    },

    UnterminatedString {
        position: Position,
    },

    UnexpectedCharacter {
        ch: char,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Expected { position, .. }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::UnterminatedString { position }
            | ParseError::UnexpectedCharacter { position, .. } => *position,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParseError::Expected {
                expected,
                found: Some(found),
                ..
            } => format!("expected {expected}, found {found}"),
            ParseError::Expected {
                expected,
                found: None,
                ..
            } => format!("expected {expected}, found end of input"),
            ParseError::InvalidLiteral { literal, .. } => format!("invalid literal '{literal}'"),
            ParseError::UnterminatedString { .. } => "unterminated string literal".to_string(),
            ParseError::UnexpectedCharacter { ch, .. } => format!("unexpected character '{ch}'"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}: {}", self.position(), self.message())
    }
}

impl std::error::Error for ParseError {}
