//! Instruction-set metadata consumed by the lexer and the parser.
//!
//! The set is read-only once built. Both stages take it by reference so
//! a new instruction family only needs a new table, never a change to the
//! scanning or parsing code.
use std::collections::BTreeMap;
use std::fmt;

/// The operand shape of an instruction, selected by its mnemonic.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum InstructionKind {
    /// One accumulator operand followed by two register-file operands.
    RType,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstructionKind::RType => write!(f, "R-type"),
        }
    }
}

/// Mnemonics of the R-type family.
pub const R_TYPE_MNEMONICS: &[&str] = &["add", "sub"];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InstructionSet {
    mnemonics: BTreeMap<String, InstructionKind>,
}

impl InstructionSet {
    /// Builds a set from `(mnemonic, kind)` pairs. Mnemonics are stored
    /// lowercase; a repeated mnemonic keeps the last kind given.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, InstructionKind)>,
        S: AsRef<str>,
    {
        let mnemonics = entries
            .into_iter()
            .map(|(m, kind)| (m.as_ref().to_lowercase(), kind))
            .collect();
        InstructionSet { mnemonics }
    }

    /// Looks up a mnemonic, ignoring case.
    pub fn kind_of(&self, mnemonic: &str) -> Option<InstructionKind> {
        self.mnemonics.get(&mnemonic.to_lowercase()).copied()
    }

    pub fn contains(&self, mnemonic: &str) -> bool {
        self.kind_of(mnemonic).is_some()
    }

    /// All mnemonics in sorted order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.mnemonics.keys().map(String::as_str)
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        InstructionSet::new(R_TYPE_MNEMONICS.iter().map(|m| (*m, InstructionKind::RType)))
    }
}
