//! tasm turns assembly source for the toy accumulator/register-file
//! machine into a syntax tree for a later code generation stage.

#[macro_use] extern crate log;
extern crate regex;

pub mod assembler;
