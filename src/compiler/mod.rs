//! Source text <-> [`Program`] translation.
//!
//! [`compile`] never fails and does not look at bracket nesting, callers that intend to run
//! or persist the result must call [`check_brackets_balanced`] first.

use tracing::debug;

use crate::{
    bytecode::{Opcode, Program},
    lexer::{lexer::Lexer, LexerError},
};

pub fn compile(source: &str) -> Program {
    let program: Program = Lexer::new(source).map(|token| token.opcode).collect();
    debug!(source_chars = source.chars().count(), bytes = program.len(), "compiled");
    program
}

/// Inverse of [`compile`]: header, `Halt` and unknown bytes produce no text
pub fn decompile(program: &Program) -> String {
    program
        .body()
        .iter()
        .filter_map(|&byte| Opcode::from_byte(byte)?.source_char())
        .collect()
}

pub fn check_brackets_balanced(source: &str) -> Result<(), LexerError> {
    Lexer::new(source).check_balanced()
}

/// Bracket check followed by [`compile`], what every run/persist path goes through
pub fn compile_checked(source: &str) -> Result<Program, LexerError> {
    check_brackets_balanced(source)?;
    Ok(compile(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::MAGIC_HEADER;

    #[test]
    fn compile_frames_the_opcodes() {
        let program = compile("+[-]");
        assert!(program.as_bytes().starts_with(MAGIC_HEADER));
        assert_eq!(program.body(), &[2, 6, 3, 7, 8]);
    }

    #[test]
    fn empty_source_is_just_halt() {
        assert_eq!(compile("").body(), &[8]);
        assert_eq!(compile("hello world").body(), &[8]);
    }

    #[test]
    fn decompile_recovers_the_instructions() {
        let source = "><+-.,[]";
        assert_eq!(decompile(&compile(source)), source);
        assert_eq!(
            decompile(&compile("Hello [ world ] + - ,.")),
            "[]+-,."
        );
    }

    #[test]
    fn recompiling_is_identity() {
        let program = compile("++[>+<-]>.");
        assert_eq!(compile(&decompile(&program)), program);
    }

    #[test]
    fn decompile_skips_unknown_bytes() {
        let mut bytes = MAGIC_HEADER.to_vec();
        bytes.extend([2, 42, 3, 8]);
        assert_eq!(decompile(&Program::from(bytes)), "+-");
    }

    #[test]
    fn bracket_checking() {
        for source in ["]", "[[", "][", "[]]", "[[]"] {
            assert!(check_brackets_balanced(source).is_err(), "{source}");
        }
        for source in ["", "[]", "[[]]", "[a[b]c]", "no brackets"] {
            assert!(check_brackets_balanced(source).is_ok(), "{source}");
        }
    }

    #[test]
    fn compile_checked_refuses_unbalanced_source() {
        assert!(compile_checked("[").is_err());
        assert_eq!(compile_checked("[-]").unwrap(), compile("[-]"));
    }
}
