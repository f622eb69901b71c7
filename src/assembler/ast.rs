//! This AST describes a parsed tasm file.
//!
//! A program holds at most one `.text` section. The section lists
//! instructions and label declarations in source order; a label declaration
//! owns the single instruction it names.
//!
//! Supported Instructions:
//!
//! ```nasm
//! ADD &A, $B, $C  ; R-type: one accumulator, two register-file registers
//! SUB &A, $B, $C
//! ```
//!
//! Accumulator registers are `&1` to `&3` (`&0` is reserved), register-file
//! registers are `$0` to `$15`. Comments start with `;` and run to the end
//! of the line.
//!
//! Example source file:
//!
//! ```nasm
//! .text
//! _start: add &1, $0, $1 ; labels name the next instruction
//!         sub &2, $3, $4
//! ```
use std::fmt;

use super::isa::InstructionKind;
use super::lexer::Position;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum NodeKind {
    Program,
    TextSection,
    Instruction(InstructionKind),
    LabelDeclaration,
    AccumulatorOperand,
    RegisterFileOperand,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKind::Program => write!(f, "program"),
            NodeKind::TextSection => write!(f, "textSection"),
            NodeKind::Instruction(InstructionKind::RType) => write!(f, "rTypeInstruction"),
            NodeKind::LabelDeclaration => write!(f, "labelDeclaration"),
            NodeKind::AccumulatorOperand => write!(f, "accumulatorOperand"),
            NodeKind::RegisterFileOperand => write!(f, "registerFileOperand"),
        }
    }
}

/// A node of the syntax tree. Nodes own their children and are never
/// modified once the parser returns them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub lexeme: Option<String>,
    pub position: Position,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, lexeme: Option<String>, position: Position, children: Vec<Node>) -> Self {
        Node { kind, lexeme, position, children }
    }

    /// A node without children.
    pub fn leaf(kind: NodeKind, lexeme: impl Into<String>, position: Position) -> Self {
        Node::new(kind, Some(lexeme.into()), position, Vec::new())
    }

    pub fn lexeme(&self) -> Option<&str> {
        self.lexeme.as_deref()
    }

    /// The register index of an operand node.
    pub fn register_index(&self) -> Option<u8> {
        match self.kind {
            NodeKind::AccumulatorOperand | NodeKind::RegisterFileOperand => {
                self.lexeme.as_ref().and_then(|l| l.parse().ok())
            }
            _ => None,
        }
    }

    /// Iterates over this node and its descendants in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        write!(f, "{:width$}{}", "", self.kind, width = depth * 2)?;
        if let Some(lexeme) = &self.lexeme {
            write!(f, "({})", lexeme)?;
        }
        writeln!(f, " @ {}", self.position)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Pre-order traversal returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
