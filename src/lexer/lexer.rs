use crate::bytecode::Opcode;

use super::{LexerError, Token};

/// Walks source text yielding instruction tokens, every other character is a comment
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /** Human Readable positions in file */
    pub cur_line: usize,
    pub cur_col: usize,

    /** 'raw' format / offset within the file (in terms of 'codepoints') */
    pub codepoint_offset: usize,

    chars: std::str::Chars<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(chars: &'a str) -> Lexer<'a> {
        Lexer {
            cur_col: 1,
            cur_line: 1,

            codepoint_offset: 0,

            chars: chars.chars(),
        }
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.cur_col += 1;
        if c == '\n' {
            self.cur_line += 1;
            self.cur_col = 1;
        }
        self.codepoint_offset += 1;
        Some(c)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let (line, column) = (self.cur_line, self.cur_col);
            let c = self.consume_char()?;
            if let Some(opcode) = Opcode::from_source_char(c) {
                return Some(Token {
                    opcode,
                    line,
                    column,
                });
            }
        }
    }

    /// Consumes the rest of the input checking every `]` closes an earlier `[`
    pub fn check_balanced(&mut self) -> Result<(), LexerError> {
        // positions of the currently open brackets
        let mut open = vec![];
        while let Some(token) = self.next_token() {
            match token.opcode {
                Opcode::LoopStart => open.push(token),
                Opcode::LoopEnd => {
                    if open.pop().is_none() {
                        return Err(LexerError::UnbalancedBrackets {
                            symbol: ']',
                            other: '[',
                            line: token.line,
                            column: token.column,
                        });
                    }
                }
                _ => {}
            }
        }

        match open.pop() {
            Some(token) => Err(LexerError::UnbalancedBrackets {
                symbol: '[',
                other: ']',
                line: token.line,
                column: token.column,
            }),
            None => Ok(()),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_tracks_positions() {
        let tokens: Vec<Token> = Lexer::new("a+\n  [b]").collect();
        assert_eq!(
            tokens,
            vec![
                Token { opcode: Opcode::Increment, line: 1, column: 2 },
                Token { opcode: Opcode::LoopStart, line: 2, column: 3 },
                Token { opcode: Opcode::LoopEnd, line: 2, column: 5 },
            ]
        );
    }

    #[test]
    fn counts_codepoints_not_bytes() {
        let mut lexer = Lexer::new("é+");
        assert_eq!(lexer.next_token().map(|t| t.column), Some(2));
        assert_eq!(lexer.codepoint_offset, 2);
    }

    #[test]
    fn reports_stray_close() {
        assert_eq!(
            Lexer::new("+\n+]").check_balanced(),
            Err(LexerError::UnbalancedBrackets { symbol: ']', other: '[', line: 2, column: 2 })
        );
    }

    #[test]
    fn reports_innermost_unclosed_open() {
        assert_eq!(
            Lexer::new("[ [[]").check_balanced(),
            Err(LexerError::UnbalancedBrackets { symbol: '[', other: ']', line: 1, column: 3 })
        );
    }
}
