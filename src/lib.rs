//! Brainf**k to bytecode compiler and bytecode virtual machine.
//!
//! Source text is compiled into a [`bytecode::Program`] (a magic header, one byte per
//! instruction and a trailing `Halt`), which can be persisted as a `.bfc` container and
//! executed by an [`interpreter::Machine`] over a growable tape of 64-bit cells.

pub mod bytecode;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod repl;

pub use error::Error;
