//! This lexer tokenizes tasm source.
//!
//! Lexemes are classified by their first character: `.` starts a
//! directive, `_` a label, `&` an accumulator register and `$` a
//! register-file register. Anything else must be a known mnemonic.
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use super::error::{LexicalError, LexicalErrorKind};
use super::isa::InstructionSet;

/// Where a token starts in the source. Lines and columns count from 1.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Directive {
    Text,
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Text => ".text",
        }
    }
}

/// Directives recognized by the lexer.
pub const DIRECTIVES: &[Directive] = &[Directive::Text];

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum TokenKind {
    Directive(Directive),
    Label,
    Mnemonic,
    AccumulatorRegister,
    RegisterFileRegister,
    Comma,
    Colon,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Directive(d) => write!(f, "`{}`", d.name()),
            TokenKind::Label => write!(f, "label"),
            TokenKind::Mnemonic => write!(f, "mnemonic"),
            TokenKind::AccumulatorRegister => write!(f, "accumulator register"),
            TokenKind::RegisterFileRegister => write!(f, "register-file register"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Colon => write!(f, "`:`"),
            TokenKind::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// A classified lexeme. Register tokens also carry their parsed index.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub index: Option<u8>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token { kind, lexeme: lexeme.into(), index: None, position }
    }

    pub fn register(kind: TokenKind, lexeme: impl Into<String>, index: u8, position: Position) -> Self {
        Token { kind, lexeme: lexeme.into(), index: Some(index), position }
    }
}

/// A family of registers addressed through a common prefix.
#[derive(Copy, Clone, Debug)]
struct RegisterFamily {
    kind: TokenKind,
    first: u8,
    last: u8,
    reserved: Option<u8>,
}

const ACCUMULATOR: RegisterFamily = RegisterFamily {
    kind: TokenKind::AccumulatorRegister,
    first: 1,
    last: 3,
    reserved: Some(0),
};

const REGISTER_FILE: RegisterFamily = RegisterFamily {
    kind: TokenKind::RegisterFileRegister,
    first: 0,
    last: 15,
    reserved: None,
};

#[derive(Copy, Clone, Debug)]
enum Rule {
    Directive,
    Label,
    Register(RegisterFamily),
}

/// Prefix character to classification rule. Lexemes without one of these
/// prefixes are looked up as mnemonics.
const PREFIX_RULES: &[(char, Rule)] = &[
    ('.', Rule::Directive),
    ('_', Rule::Label),
    ('&', Rule::Register(ACCUMULATOR)),
    ('$', Rule::Register(REGISTER_FILE)),
];

/// Characters that form a lexeme on their own.
const SYMBOLS: &[(char, TokenKind)] = &[(',', TokenKind::Comma), (':', TokenKind::Colon)];

const MARKS: &[char] = &['.', '_', '&', '$'];

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn symbol_kind(c: char) -> Option<TokenKind> {
    SYMBOLS.iter().find(|(s, _)| *s == c).map(|(_, kind)| *kind)
}

fn is_terminator(c: char) -> bool {
    is_whitespace(c) || c == ';' || symbol_kind(c).is_some()
}

fn in_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || MARKS.contains(&c)
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    isa: &'a InstructionSet,
    label: Regex,
    index: Regex,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, isa: &'a InstructionSet) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            isa,
            label: Regex::new(r"^_[A-Za-z]*$").expect("label pattern is valid"),
            index: Regex::new(r"^[0-9]+$").expect("index pattern is valid"),
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace and `;` comments up to the next lexeme.
    fn skip_ignored(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if is_whitespace(c) {
                self.advance();
            } else if c == ';' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_ignored();
        let position = self.position();

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::new(TokenKind::EndOfInput, "", position)),
        };

        if let Some(kind) = symbol_kind(c) {
            self.advance();
            return Ok(Token::new(kind, c.to_string(), position));
        }

        let lexeme = self.lexeme(position)?;
        self.classify(lexeme, position)
    }

    /// Reads characters up to the next terminator.
    fn lexeme(&mut self, position: Position) -> Result<String, LexicalError> {
        let mut sb = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_terminator(c) {
                break;
            }
            sb.push(c);
            if !in_alphabet(c) {
                return Err(LexicalError::new(LexicalErrorKind::InvalidCharacter(c), sb, position));
            }
            self.advance();
        }
        Ok(sb)
    }

    fn classify(&self, lexeme: String, position: Position) -> Result<Token, LexicalError> {
        let first = lexeme.chars().next();
        let rule = PREFIX_RULES.iter().find(|(p, _)| Some(*p) == first).map(|(_, rule)| *rule);

        match rule {
            Some(Rule::Directive) => directive(lexeme, position),
            Some(Rule::Label) => {
                if self.label.is_match(&lexeme) {
                    Ok(Token::new(TokenKind::Label, lexeme, position))
                } else {
                    Err(LexicalError::new(LexicalErrorKind::InvalidLabel, lexeme, position))
                }
            }
            Some(Rule::Register(family)) => self.register(family, lexeme, position),
            None => {
                if self.isa.contains(&lexeme) {
                    Ok(Token::new(TokenKind::Mnemonic, lexeme, position))
                } else {
                    Err(LexicalError::new(LexicalErrorKind::UnknownMnemonic, lexeme, position))
                }
            }
        }
    }

    fn register(&self, family: RegisterFamily, lexeme: String, position: Position) -> Result<Token, LexicalError> {
        // Prefixes are ASCII, so the index starts at byte 1.
        let suffix = &lexeme[1..];
        if !self.index.is_match(suffix) {
            return Err(LexicalError::new(LexicalErrorKind::InvalidRegister, lexeme, position));
        }

        // Only digits remain, so a failed parse is an overflow.
        let index = match suffix.parse::<u8>() {
            Ok(index) => index,
            Err(_) => return Err(LexicalError::new(LexicalErrorKind::RegisterOutOfRange, lexeme, position)),
        };

        if family.reserved == Some(index) {
            Err(LexicalError::new(LexicalErrorKind::ReservedRegister, lexeme, position))
        } else if index < family.first || index > family.last {
            Err(LexicalError::new(LexicalErrorKind::RegisterOutOfRange, lexeme, position))
        } else {
            Ok(Token::register(family.kind, lexeme, index, position))
        }
    }
}

fn directive(lexeme: String, position: Position) -> Result<Token, LexicalError> {
    let normalized = lexeme.to_lowercase();
    match DIRECTIVES.iter().find(|d| d.name() == normalized) {
        Some(d) => Ok(Token::new(TokenKind::Directive(*d), lexeme, position)),
        None => Err(LexicalError::new(LexicalErrorKind::UnknownDirective, lexeme, position)),
    }
}

/// Tokenizes a whole source text.
///
/// The returned sequence always ends with a single `EndOfInput` token.
/// Scanning stops at the first invalid lexeme.
pub fn tokenize(source: &str, isa: &InstructionSet) -> Result<Vec<Token>, LexicalError> {
    let mut lexer = Lexer::new(source, isa);
    let mut tokens: Vec<Token> = Vec::with_capacity(source.len() / 4 + 1);

    loop {
        let token = lexer.next_token()?;
        trace!("{} {:?} `{}`", token.position, token.kind, token.lexeme);
        let done = token.kind == TokenKind::EndOfInput;
        tokens.push(token);
        if done {
            break;
        }
    }

    debug!("Lexed {} token(s).", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Result<Vec<Token>, LexicalError> {
        tokenize(source, &InstructionSet::default())
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn error_kind(source: &str) -> LexicalErrorKind {
        lex(source).unwrap_err().kind
    }

    #[test]
    fn test_single_lexemes() {
        use TokenKind::*;
        assert_eq!(kinds(".text"), vec![Directive(super::Directive::Text), EndOfInput]);
        assert_eq!(kinds(".TEXT"), vec![Directive(super::Directive::Text), EndOfInput]);
        assert_eq!(kinds("_loop"), vec![Label, EndOfInput]);
        assert_eq!(kinds("_"), vec![Label, EndOfInput]);
        assert_eq!(kinds("add"), vec![Mnemonic, EndOfInput]);
        assert_eq!(kinds("SUB"), vec![Mnemonic, EndOfInput]);
        assert_eq!(kinds("&2"), vec![AccumulatorRegister, EndOfInput]);
        assert_eq!(kinds("$7"), vec![RegisterFileRegister, EndOfInput]);
        assert_eq!(kinds(","), vec![Comma, EndOfInput]);
        assert_eq!(kinds(":"), vec![Colon, EndOfInput]);
        assert_eq!(kinds(""), vec![EndOfInput]);
        assert_eq!(kinds(" \t\r\n"), vec![EndOfInput]);
    }

    #[test]
    fn test_lexeme_keeps_source_text() {
        let tokens = lex("ADD .Text").unwrap();
        assert_eq!(tokens[0].lexeme, "ADD");
        assert_eq!(tokens[1].lexeme, ".Text");
        assert_eq!(tokens[2].lexeme, "");
    }

    #[test]
    fn test_accumulator_bounds() {
        assert_eq!(error_kind("&0"), LexicalErrorKind::ReservedRegister);
        assert_eq!(error_kind("&00"), LexicalErrorKind::ReservedRegister);

        for i in 1..=3u8 {
            let tokens = lex(&format!("&{}", i)).unwrap();
            assert_eq!(tokens[0], Token::register(TokenKind::AccumulatorRegister, format!("&{}", i), i, Position::new(1, 1)));
        }

        for i in 4..=300u32 {
            assert_eq!(error_kind(&format!("&{}", i)), LexicalErrorKind::RegisterOutOfRange);
        }

        assert_eq!(error_kind("&"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("&a"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("&1a"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("&99999999999999999999"), LexicalErrorKind::RegisterOutOfRange);
    }

    #[test]
    fn test_register_file_bounds() {
        for i in 0..=15u8 {
            let tokens = lex(&format!("${}", i)).unwrap();
            assert_eq!(tokens[0].kind, TokenKind::RegisterFileRegister);
            assert_eq!(tokens[0].index, Some(i));
        }

        for i in 16..=300u32 {
            assert_eq!(error_kind(&format!("${}", i)), LexicalErrorKind::RegisterOutOfRange);
        }

        assert_eq!(lex("$01").unwrap()[0].index, Some(1));
        assert_eq!(error_kind("$"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("$x"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("$$1"), LexicalErrorKind::InvalidRegister);
        assert_eq!(error_kind("$-1"), LexicalErrorKind::InvalidCharacter('-'));
    }

    #[test]
    fn test_invalid_lexemes() {
        assert_eq!(error_kind(".data"), LexicalErrorKind::UnknownDirective);
        assert_eq!(error_kind("."), LexicalErrorKind::UnknownDirective);
        assert_eq!(error_kind("_loop1"), LexicalErrorKind::InvalidLabel);
        assert_eq!(error_kind("_lo_op"), LexicalErrorKind::InvalidLabel);
        assert_eq!(error_kind("mul"), LexicalErrorKind::UnknownMnemonic);
        assert_eq!(error_kind("add1"), LexicalErrorKind::UnknownMnemonic);
        assert_eq!(error_kind("1"), LexicalErrorKind::UnknownMnemonic);
        assert_eq!(error_kind("ad#d"), LexicalErrorKind::InvalidCharacter('#'));
        assert_eq!(error_kind("#"), LexicalErrorKind::InvalidCharacter('#'));
        assert_eq!(error_kind("adé"), LexicalErrorKind::InvalidCharacter('é'));

        let err = lex(".text\n  ad#d").unwrap_err();
        assert_eq!(err.lexeme, "ad#");
        assert_eq!(err.position, Position::new(2, 3));
    }

    #[test]
    fn test_injected_mnemonics() {
        use super::super::isa::InstructionKind;
        let isa = InstructionSet::new(vec![("xor", InstructionKind::RType)]);
        assert_eq!(tokenize("XOR", &isa).unwrap()[0].kind, TokenKind::Mnemonic);
        assert_eq!(tokenize("add", &isa).unwrap_err().kind, LexicalErrorKind::UnknownMnemonic);
    }

    #[test]
    fn test_instruction_line() {
        let tokens = lex(".text\nadd &1, $0, $1").unwrap();
        let expected = vec![
            Token::new(TokenKind::Directive(Directive::Text), ".text", Position::new(1, 1)),
            Token::new(TokenKind::Mnemonic, "add", Position::new(2, 1)),
            Token::register(TokenKind::AccumulatorRegister, "&1", 1, Position::new(2, 5)),
            Token::new(TokenKind::Comma, ",", Position::new(2, 7)),
            Token::register(TokenKind::RegisterFileRegister, "$0", 0, Position::new(2, 9)),
            Token::new(TokenKind::Comma, ",", Position::new(2, 11)),
            Token::register(TokenKind::RegisterFileRegister, "$1", 1, Position::new(2, 13)),
            Token::new(TokenKind::EndOfInput, "", Position::new(2, 15)),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_symbols_split_lexemes() {
        use TokenKind::*;
        assert_eq!(
            kinds("_loop:add &1,$0,$1"),
            vec![Label, Colon, Mnemonic, AccumulatorRegister, Comma, RegisterFileRegister, Comma, RegisterFileRegister, EndOfInput]
        );
        assert_eq!(kinds("$1;comment"), vec![RegisterFileRegister, EndOfInput]);
        // Order is the parser's concern, not the lexer's.
        assert_eq!(kinds(", : $3 &3"), vec![Comma, Colon, RegisterFileRegister, AccumulatorRegister, EndOfInput]);
    }

    #[test]
    fn test_comments_are_transparent() {
        let with_comments = lex(".text\n; comment\nadd &1, $0, $1 ; trailing").unwrap();
        let without = lex(".text\n\nadd &1, $0, $1").unwrap();

        let strip = |tokens: Vec<Token>| -> Vec<(TokenKind, String)> {
            tokens.into_iter().map(|t| (t.kind, t.lexeme)).collect()
        };
        assert_eq!(strip(with_comments), strip(without));

        assert_eq!(kinds("; only a comment"), vec![TokenKind::EndOfInput]);
        assert_eq!(kinds("; one\n; two\n"), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn test_deterministic_and_terminated() {
        let inputs = [
            "",
            ".text",
            ".text\n_start: add &1, $0, $1\nsub &3, $15, $2 ; done\n",
            "_a:_b:,,::",
            "add &1 $0, $1",
        ];
        for input in inputs.iter() {
            let first = lex(input).unwrap();
            let second = lex(input).unwrap();
            assert_eq!(first, second);

            let eoi = first.iter().filter(|t| t.kind == TokenKind::EndOfInput).count();
            assert_eq!(eoi, 1);
            assert_eq!(first.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
        }
    }

    #[test]
    fn test_positions() {
        let tokens = lex("  .text\r\n\t_x :\n").unwrap();
        assert_eq!(tokens[0].position, Position::new(1, 3));
        assert_eq!(tokens[1].position, Position::new(2, 2));
        assert_eq!(tokens[2].position, Position::new(2, 5));
        assert_eq!(tokens[3].position, Position::new(3, 1));
    }
}
