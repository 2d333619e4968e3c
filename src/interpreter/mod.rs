pub mod bytecode_interpreter;
pub mod console;
pub mod debugger;
pub mod observer;

use thiserror::Error;
use tracing::debug;

use crate::{
    bytecode::{container::FormatError, Program},
    config::MachineConfig,
};

pub use self::bytecode_interpreter::run;

pub type Cell = i64;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Attempt to go before the first cell on the tape (instruction {ip:})")]
    PointerUnderflow { ip: usize },

    #[error("Cell value {value:} is not a valid unicode scalar value")]
    InvalidCodepoint { value: Cell },

    #[error("Maybe the bytecode is corrupted: {reason:} (instruction {ip:})")]
    CorruptedBytecode { ip: usize, reason: &'static str },

    #[error("Found unknown bytecode {byte:} at run time (instruction {ip:}), maybe the bytecode is corrupted")]
    UnknownOpcode { byte: u8, ip: usize },

    #[error(transparent)]
    Format(
        #[from]
        FormatError,
    ),

    #[error("IO Error")]
    Io(
        #[from]
        std::io::Error,
    ),
}

/// Growable run of zero-initialised cells, index 0 is the hard lower bound
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<Cell>,
    growth: usize,

    /// Highest index the pointer has reached, bounds the displayed window
    highest: usize,
}

impl Tape {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            cells: vec![0; config.tape_size.max(1)],
            growth: config.growth.max(1),
            highest: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells past the end read as zero
    pub fn get(&self, index: usize) -> Cell {
        self.cells.get(index).copied().unwrap_or(0)
    }

    pub fn set(&mut self, index: usize, value: Cell) {
        *self.cell_mut(index) = value;
    }

    pub fn highest(&self) -> usize {
        self.highest
    }

    /// Cells `0..=highest`
    pub fn window(&self) -> &[Cell] {
        &self.cells[..=self.highest.min(self.cells.len() - 1)]
    }

    /// Moves `pointer` one cell right, growing the tape first when it sits on the last cell
    fn advance(&mut self, pointer: usize) -> usize {
        let next = pointer + 1;
        if next >= self.cells.len() {
            // a caller-placed pointer may sit far past the end
            let len = (self.cells.len() + self.growth).max(next + 1);
            debug!(from = self.cells.len(), to = len, "growing tape");
            self.cells.resize(len, 0);
        }
        self.highest = self.highest.max(next);
        next
    }

    /// Writable cell at `index`, the tape is extended with zeroes to reach it
    fn cell_mut(&mut self, index: usize) -> &mut Cell {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, 0);
        }
        self.highest = self.highest.max(index);
        &mut self.cells[index]
    }

    /// Zeroes every touched cell, the allocation is kept
    pub fn reset(&mut self) {
        let end = self.highest.min(self.cells.len() - 1);
        self.cells[..=end].fill(0);
        self.highest = 0;
    }
}

/// Live positions of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Index into the tape
    pub pointer: usize,
    /// Index into the program bytes
    pub ip: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            pointer: 0,
            ip: Program::ENTRY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Running,
    Halted,
}

/// Everything one execution owns: the tape, the cursor and the loop resolution stack.
///
/// Interactive callers keep a machine alive between programs so the tape survives.
#[derive(Debug, Clone)]
pub struct Machine {
    pub tape: Tape,
    pub cursor: Cursor,

    /// Instruction pointers of the currently open `[`
    pub loop_stack: Vec<usize>,

    /// Instructions executed since the last reset
    pub steps: u64,
}

impl Machine {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            tape: Tape::new(config),
            cursor: Cursor::default(),
            loop_stack: vec![],
            steps: 0,
        }
    }

    pub fn reset(&mut self) {
        self.tape.reset();
        self.cursor = Cursor::default();
        self.loop_stack.clear();
        self.steps = 0;
    }

    /// Prepares for a new instruction stream: back to the first instruction with no open loops.
    /// The tape and the pointer are untouched.
    pub fn rewind(&mut self) {
        self.cursor.ip = Program::ENTRY;
        self.loop_stack.clear();
    }

    pub fn current_cell(&self) -> Cell {
        self.tape.get(self.cursor.pointer)
    }
}
