//! The Parser module takes a token stream (Vec<Token>) from the lexer
//! and converts it into an AST.
//!
//! Grammar, one token of lookahead and no backtracking:
//!
//! ```text
//! program          := textSection? EOI
//! textSection      := '.text' (instruction | labelDeclaration)*
//! instruction      := rTypeInstruction
//! rTypeInstruction := mnemonic accumulator ',' registerFile ',' registerFile
//! labelDeclaration := label ':' instruction
//! ```
use super::ast::{Node, NodeKind};
use super::error::SyntacticalError;
use super::isa::{InstructionKind, InstructionSet};
use super::lexer::{Directive, Token, TokenKind};

const TEXT: TokenKind = TokenKind::Directive(Directive::Text);

pub struct Parser<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    isa: &'a InstructionSet,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `tokens`. A missing `EndOfInput` terminator is
    /// appended.
    pub fn new(mut tokens: Vec<Token>, isa: &'a InstructionSet) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfInput) {
            let position = tokens.last().map(|t| t.position).unwrap_or_default();
            tokens.push(Token::new(TokenKind::EndOfInput, "", position));
        }
        Parser { tokens, cursor: 0, isa }
    }

    /// Run the parser, consuming itself and returning the program node.
    pub fn run(mut self) -> Result<Node, SyntacticalError> {
        let program = self.program()?;
        debug!("Parsed {} node(s).", program.walk().count());
        Ok(program)
    }

    fn program(&mut self) -> Result<Node, SyntacticalError> {
        let position = self.current().position;
        let mut children = Vec::with_capacity(1);

        if self.check(TEXT) {
            children.push(self.text_section()?);
        }

        if !self.check(TokenKind::EndOfInput) {
            return Err(if children.is_empty() {
                self.error(vec![TEXT], "instructions must be inside a `.text` section")
            } else {
                self.error(vec![TokenKind::Mnemonic, TokenKind::Label], "unexpected token in `.text` section")
            });
        }

        Ok(Node::new(NodeKind::Program, None, position, children))
    }

    fn text_section(&mut self) -> Result<Node, SyntacticalError> {
        let directive = self.expect(TEXT, "missing section directive")?;
        trace!("{} text section", directive.position);

        let mut children = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::Mnemonic => children.push(self.instruction()?),
                TokenKind::Label => children.push(self.label_declaration()?),
                _ => break,
            }
        }

        debug!("Text section holds {} item(s).", children.len());
        Ok(Node::new(NodeKind::TextSection, None, directive.position, children))
    }

    /// Dispatches on the instruction kind of the current mnemonic.
    fn instruction(&mut self) -> Result<Node, SyntacticalError> {
        if !self.check(TokenKind::Mnemonic) {
            return Err(self.error(vec![TokenKind::Mnemonic], "invalid instruction"));
        }

        match self.isa.kind_of(&self.current().lexeme) {
            Some(InstructionKind::RType) => self.r_type_instruction(),
            None => Err(self.error(vec![TokenKind::Mnemonic], "invalid mnemonic")),
        }
    }

    fn r_type_instruction(&mut self) -> Result<Node, SyntacticalError> {
        let mnemonic = self.expect(TokenKind::Mnemonic, "invalid instruction")?;
        trace!("{} R-type `{}`", mnemonic.position, mnemonic.lexeme);

        let a = self.accumulator_operand()?;
        self.expect(TokenKind::Comma, "malformed operand list")?;
        let b = self.register_file_operand()?;
        self.expect(TokenKind::Comma, "malformed operand list")?;
        let c = self.register_file_operand()?;

        Ok(Node::new(
            NodeKind::Instruction(InstructionKind::RType),
            Some(mnemonic.lexeme.to_lowercase()),
            mnemonic.position,
            vec![a, b, c],
        ))
    }

    fn label_declaration(&mut self) -> Result<Node, SyntacticalError> {
        let label = self.expect(TokenKind::Label, "invalid label declaration")?;
        trace!("{} label `{}`", label.position, label.lexeme);
        self.expect(TokenKind::Colon, "missing colon after label")?;
        let instruction = self.instruction()?;

        Ok(Node::new(NodeKind::LabelDeclaration, Some(label.lexeme), label.position, vec![instruction]))
    }

    fn accumulator_operand(&mut self) -> Result<Node, SyntacticalError> {
        let token = self.expect(TokenKind::AccumulatorRegister, "malformed operand list")?;
        Ok(operand(NodeKind::AccumulatorOperand, token))
    }

    fn register_file_operand(&mut self) -> Result<Node, SyntacticalError> {
        let token = self.expect(TokenKind::RegisterFileRegister, "malformed operand list")?;
        Ok(operand(NodeKind::RegisterFileOperand, token))
    }

    /// Consumes the current token if it has the given kind.
    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, SyntacticalError> {
        if self.check(kind) {
            Ok(self.consume())
        } else {
            Err(self.error(vec![kind], message))
        }
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// The token under the cursor. The cursor never moves past the first
    /// `EndOfInput`, which `new` guarantees exists.
    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Returns the current token and advances the cursor.
    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::EndOfInput {
            self.cursor += 1;
        }
        token
    }

    fn error(&self, expected: Vec<TokenKind>, message: &str) -> SyntacticalError {
        let found = self.current();
        SyntacticalError {
            expected,
            found: found.kind,
            lexeme: found.lexeme.clone(),
            position: found.position,
            message: message.to_owned(),
        }
    }
}

fn operand(kind: NodeKind, token: Token) -> Node {
    let lexeme = match token.index {
        Some(index) => index.to_string(),
        None => token.lexeme.get(1..).unwrap_or_default().to_owned(),
    };
    Node::leaf(kind, lexeme, token.position)
}

/// Parses a complete token sequence into a program node.
pub fn parse(tokens: Vec<Token>, isa: &InstructionSet) -> Result<Node, SyntacticalError> {
    Parser::new(tokens, isa).run()
}
