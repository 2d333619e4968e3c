use std::path::PathBuf;

use thiserror::Error;

use crate::{bytecode::container::FormatError, interpreter::RuntimeError, lexer::LexerError};

/// Any failure the command line or the repl can run into
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lexer(
        #[from]
        LexerError,
    ),

    #[error(transparent)]
    Format(
        #[from]
        FormatError,
    ),

    #[error(transparent)]
    Runtime(
        #[from]
        RuntimeError,
    ),

    #[error("Unknown file type for {} (expected .bf or .bfc)", .0.display())]
    UnknownFileType(PathBuf),

    #[error("{0}")]
    Usage(&'static str),

    #[error("IO Error: {0}")]
    Io(
        #[from]
        std::io::Error,
    ),
}
