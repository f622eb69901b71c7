//! The Assembler module is in charge of taking a
//! tasm source text and producing the program AST
//! described in the ast submodule.
//!
//! It does this by implementing a prefix-driven tokenizer
//! and a one-token-lookahead recursive descent parser.

pub mod ast;
pub mod error;
pub mod isa;
pub mod lexer;
pub mod parser;

use self::ast::Node;
use self::error::AsmError;
use self::isa::InstructionSet;

/// Tokenizes and parses `source`, stopping at the first error.
pub fn assemble_source(source: &str, isa: &InstructionSet) -> Result<Node, AsmError> {
    let tokens = lexer::tokenize(source, isa)?;
    let program = parser::parse(tokens, isa)?;
    Ok(program)
}
