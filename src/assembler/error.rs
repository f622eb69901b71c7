//! Errors raised by the lexer and the parser.
//!
//! Both stages stop at the first error. Every error names the offending
//! lexeme and where it starts in the source.
use std::error::Error;
use std::fmt;

use super::lexer::{Position, TokenKind};

/// Why a lexeme was rejected by the lexer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LexicalErrorKind {
    /// A character outside the assembler alphabet.
    InvalidCharacter(char),
    UnknownDirective,
    /// A label containing something other than letters after its `_`.
    InvalidLabel,
    /// A register whose index is not a decimal number.
    InvalidRegister,
    /// A register index set aside for the assembler.
    ReservedRegister,
    RegisterOutOfRange,
    UnknownMnemonic,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub lexeme: String,
    pub position: Position,
}

impl LexicalError {
    pub fn new(kind: LexicalErrorKind, lexeme: impl Into<String>, position: Position) -> Self {
        LexicalError { kind, lexeme: lexeme.into(), position }
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LexicalErrorKind::*;
        write!(f, "lexical error on line {}: ", self.position)?;
        match &self.kind {
            InvalidCharacter(c) => write!(f, "invalid character {:?} in `{}`", c, self.lexeme),
            UnknownDirective => write!(f, "unknown directive `{}`", self.lexeme),
            InvalidLabel => write!(f, "invalid label `{}`: labels may only contain letters", self.lexeme),
            InvalidRegister => write!(f, "invalid register `{}`: expected a decimal index", self.lexeme),
            ReservedRegister => write!(f, "register `{}` is reserved for the assembler", self.lexeme),
            RegisterOutOfRange => write!(f, "register `{}` is out of range", self.lexeme),
            UnknownMnemonic => write!(f, "unknown mnemonic `{}`", self.lexeme),
        }
    }
}

impl Error for LexicalError {}

/// A token that does not fit the grammar rule being parsed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SyntacticalError {
    /// Token kinds the active rule would have accepted.
    pub expected: Vec<TokenKind>,
    pub found: TokenKind,
    pub lexeme: String,
    pub position: Position,
    pub message: String,
}

impl fmt::Display for SyntacticalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "syntax error on line {}: {}: expected ", self.position, self.message)?;
        for (idx, kind) in self.expected.iter().enumerate() {
            if idx > 0 {
                write!(f, " or ")?;
            }
            write!(f, "{}", kind)?;
        }
        if self.lexeme.is_empty() {
            write!(f, ", found {}", self.found)
        } else {
            write!(f, ", found {} `{}`", self.found, self.lexeme)
        }
    }
}

impl Error for SyntacticalError {}

/// Any failure of the front end.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AsmError {
    Lexical(LexicalError),
    Syntactical(SyntacticalError),
}

impl AsmError {
    pub fn position(&self) -> Position {
        match self {
            AsmError::Lexical(e) => e.position,
            AsmError::Syntactical(e) => e.position,
        }
    }
}

impl From<LexicalError> for AsmError {
    fn from(err: LexicalError) -> Self {
        AsmError::Lexical(err)
    }
}

impl From<SyntacticalError> for AsmError {
    fn from(err: SyntacticalError) -> Self {
        AsmError::Syntactical(err)
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmError::Lexical(e) => write!(f, "{}", e),
            AsmError::Syntactical(e) => write!(f, "{}", e),
        }
    }
}

impl Error for AsmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AsmError::Lexical(e) => Some(e),
            AsmError::Syntactical(e) => Some(e),
        }
    }
}
