pub mod container;

/// The banner every program starts with, it doubles as the container's magic number
pub const MAGIC_HEADER: &[u8; 16] = b"|--BRAINFUCK!--|";

/// Display glyph for [`Opcode::Halt`], it has no source character
pub const HALT_GLYPH: char = '/';

/// The closed instruction set.
///
/// The discriminants are the on-disk byte values and must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `>`: Move the pointer one cell to the right
    MoveRight = 0,
    /// `<`: Move the pointer one cell to the left
    MoveLeft = 1,

    /// `+`: Increment the cell under the pointer
    Increment = 2,
    /// `-`: Decrement the cell under the pointer
    Decrement = 3,

    /// `.`: Write the cell under the pointer as a character
    Output = 4,
    /// `,`: Read a character into the cell under the pointer
    Input = 5,

    /// `[`: Skip past the matching `]` if the cell is zero
    LoopStart = 6,
    /// `]`: Jump back to the matching `[` if the cell is non-zero
    LoopEnd = 7,

    /// Terminates every program
    Halt = 8,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        Some(match byte {
            0 => Opcode::MoveRight,
            1 => Opcode::MoveLeft,
            2 => Opcode::Increment,
            3 => Opcode::Decrement,
            4 => Opcode::Output,
            5 => Opcode::Input,
            6 => Opcode::LoopStart,
            7 => Opcode::LoopEnd,
            8 => Opcode::Halt,
            _ => return None,
        })
    }

    pub fn from_source_char(c: char) -> Option<Opcode> {
        Some(match c {
            '>' => Opcode::MoveRight,
            '<' => Opcode::MoveLeft,
            '+' => Opcode::Increment,
            '-' => Opcode::Decrement,
            '.' => Opcode::Output,
            ',' => Opcode::Input,
            '[' => Opcode::LoopStart,
            ']' => Opcode::LoopEnd,
            _ => return None,
        })
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    /// The source character for this opcode, `None` for `Halt`
    pub fn source_char(self) -> Option<char> {
        match self {
            Opcode::MoveRight => Some('>'),
            Opcode::MoveLeft => Some('<'),
            Opcode::Increment => Some('+'),
            Opcode::Decrement => Some('-'),
            Opcode::Output => Some('.'),
            Opcode::Input => Some(','),
            Opcode::LoopStart => Some('['),
            Opcode::LoopEnd => Some(']'),
            Opcode::Halt => None,
        }
    }

    pub fn display_char(self) -> char {
        self.source_char().unwrap_or(HALT_GLYPH)
    }
}

/// Display glyph for any raw byte, anything that isn't a source opcode shows as the halt glyph
pub fn display_byte(byte: u8) -> char {
    Opcode::from_byte(byte).map_or(HALT_GLYPH, Opcode::display_char)
}

/// A header-delimited opcode stream.
///
/// Built by the compiler or by decoding a container, never mutated afterwards.
/// Raw bytes are accepted as-is so the interpreter can reject foreign data itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Offset of the first instruction
    pub const ENTRY: usize = MAGIC_HEADER.len();

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_valid_header(&self) -> bool {
        self.bytes.starts_with(MAGIC_HEADER)
    }

    /// The instructions between the header and the end of the stream
    pub fn body(&self) -> &[u8] {
        self.bytes.get(Self::ENTRY..).unwrap_or(&[])
    }

    pub fn get(&self, ip: usize) -> Option<u8> {
        self.bytes.get(ip).copied()
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl FromIterator<Opcode> for Program {
    /// Wraps the opcodes in the header and the trailing `Halt`
    fn from_iter<T: IntoIterator<Item = Opcode>>(iter: T) -> Self {
        let mut bytes = MAGIC_HEADER.to_vec();
        bytes.extend(iter.into_iter().map(Opcode::byte));
        bytes.push(Opcode::Halt.byte());
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_values_are_fixed() {
        let expected = [
            (Opcode::MoveRight, 0),
            (Opcode::MoveLeft, 1),
            (Opcode::Increment, 2),
            (Opcode::Decrement, 3),
            (Opcode::Output, 4),
            (Opcode::Input, 5),
            (Opcode::LoopStart, 6),
            (Opcode::LoopEnd, 7),
            (Opcode::Halt, 8),
        ];
        for (opcode, byte) in expected {
            assert_eq!(opcode.byte(), byte);
            assert_eq!(Opcode::from_byte(byte), Some(opcode));
        }
        assert_eq!(Opcode::from_byte(9), None);
    }

    #[test]
    fn source_chars_map_both_ways() {
        for c in "><+-.,[]".chars() {
            let opcode = Opcode::from_source_char(c).unwrap();
            assert_eq!(opcode.source_char(), Some(c));
            assert_eq!(opcode.display_char(), c);
        }
        assert_eq!(Opcode::from_source_char('a'), None);
    }

    #[test]
    fn halt_has_its_own_glyph() {
        assert_eq!(Opcode::Halt.source_char(), None);
        assert_eq!(Opcode::Halt.display_char(), HALT_GLYPH);
        assert!(Opcode::from_source_char(HALT_GLYPH).is_none());
        assert_eq!(display_byte(200), HALT_GLYPH);
    }

    #[test]
    fn collected_programs_are_framed() {
        let program: Program = [Opcode::Increment].into_iter().collect();
        assert!(program.has_valid_header());
        assert_eq!(program.body(), &[2, 8]);
        assert_eq!(program.len(), MAGIC_HEADER.len() + 2);
    }
}
