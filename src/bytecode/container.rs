//! Persisted form of a [`Program`]: the byte stream as a JSON array, base64 encoded.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::debug;

use super::{Program, MAGIC_HEADER};

pub const SOURCE_EXTENSION: &str = "bf";
pub const BYTECODE_EXTENSION: &str = "bfc";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Not a valid bytecode file (missing {:?} header)", String::from_utf8_lossy(MAGIC_HEADER))]
    InvalidHeader,

    #[error("Bytecode file is not valid base64: {0}")]
    Base64(
        #[from]
        base64::DecodeError,
    ),

    #[error("Bytecode file does not hold a byte array: {0}")]
    Encoding(
        #[from]
        serde_json::Error,
    ),

    #[error("IO Error")]
    Io(
        #[from]
        std::io::Error,
    ),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Bytecode,
    Unknown,
}

impl FileKind {
    pub fn of(path: &Path) -> FileKind {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(SOURCE_EXTENSION) => FileKind::Source,
            Some(BYTECODE_EXTENSION) => FileKind::Bytecode,
            _ => FileKind::Unknown,
        }
    }
}

/// `hello.bf` -> `hello.bfc`
pub fn bytecode_path(source: &Path) -> PathBuf {
    source.with_extension(BYTECODE_EXTENSION)
}

pub fn serialize(program: &Program) -> Result<Vec<u8>, FormatError> {
    let array = serde_json::to_vec(program.as_bytes())?;
    let encoded = STANDARD.encode(array);
    debug!(bytes = program.len(), encoded = encoded.len(), "serialized program");
    Ok(encoded.into_bytes())
}

pub fn deserialize(data: &[u8]) -> Result<Program, FormatError> {
    let array = STANDARD.decode(data.trim_ascii())?;
    let bytes: Vec<u8> = serde_json::from_slice(&array)?;
    if !bytes.starts_with(MAGIC_HEADER) {
        return Err(FormatError::InvalidHeader);
    }
    debug!(bytes = bytes.len(), "deserialized program");
    Ok(Program::from(bytes))
}

pub fn write_program(path: &Path, program: &Program) -> Result<(), FormatError> {
    std::fs::write(path, serialize(program)?)?;
    debug!(path = %path.display(), "wrote bytecode file");
    Ok(())
}

pub fn read_program(path: &Path) -> Result<Program, FormatError> {
    deserialize(&std::fs::read(path)?)
}
