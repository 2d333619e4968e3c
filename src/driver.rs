//! File level operations shared by the command line and the repl.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::{
    bytecode::{
        container::{bytecode_path, read_program, write_program, FileKind},
        Program,
    },
    compiler::compile_checked,
    Error,
};

/// Reads a `.bf` file (bracket checked and compiled) or a `.bfc` file
#[instrument(level = "debug")]
pub fn load_program(path: &Path) -> Result<Program, Error> {
    match FileKind::of(path) {
        FileKind::Source => {
            let source = fs::read_to_string(path)?;
            Ok(compile_checked(&source)?)
        }
        FileKind::Bytecode => Ok(read_program(path)?),
        FileKind::Unknown => Err(Error::UnknownFileType(path.to_path_buf())),
    }
}

/// Compiles a `.bf` file into a `.bfc` file beside it, returns the written path
#[instrument(level = "debug")]
pub fn compile_file(path: &Path) -> Result<PathBuf, Error> {
    if FileKind::of(path) != FileKind::Source {
        return Err(Error::UnknownFileType(path.to_path_buf()));
    }

    let source = fs::read_to_string(path)?;
    let program = compile_checked(&source)?;
    let output = bytecode_path(path);
    write_program(&output, &program)?;
    debug!(output = %output.display(), "compiled file");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, decompile};

    #[test]
    fn compiled_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("add.bf");
        fs::write(&source, "add two cells: [->+<]").unwrap();

        let output = compile_file(&source).unwrap();
        assert_eq!(output, dir.path().join("add.bfc"));
        assert_eq!(load_program(&output).unwrap(), compile("[->+<]"));
        assert_eq!(decompile(&load_program(&source).unwrap()), "[->+<]");
    }

    #[test]
    fn unbalanced_sources_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.bf");
        fs::write(&source, "[[-]").unwrap();

        assert!(matches!(compile_file(&source), Err(Error::Lexer(_))));
        assert!(!dir.path().join("broken.bfc").exists());
        assert!(matches!(load_program(&source), Err(Error::Lexer(_))));
    }

    #[test]
    fn unknown_extensions_are_refused() {
        let path = Path::new("notes.txt");
        assert!(matches!(load_program(path), Err(Error::UnknownFileType(_))));
        assert!(matches!(compile_file(path), Err(Error::UnknownFileType(_))));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_program(&dir.path().join("missing.bf")),
            Err(Error::Io(_))
        ));
        assert!(matches!(
            load_program(&dir.path().join("missing.bfc")),
            Err(Error::Format(_))
        ));
    }
}
