use thiserror::Error;

use crate::bytecode::Opcode;

pub mod lexer;

/// A recognised instruction character and where it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub opcode: Opcode,

    /** Human readable position in the source (1-based) */
    pub line: usize,
    pub column: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("Can't find other symbol ({other:}) for {symbol:} at line {line:}, column {column:}")]
    UnbalancedBrackets {
        symbol: char,
        other: char,
        line: usize,
        column: usize,
    },
}
