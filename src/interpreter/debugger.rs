use std::io::Write;

use colored::Colorize;
use tracing::debug;

use crate::bytecode::{container::FormatError, Opcode, Program};

use super::{
    console::Console,
    observer::{DebugPrinter, StepObserver},
    Machine, RuntimeError, Step,
};

/// Single-steps a program, waiting for a line on the console before every instruction.
///
/// Pauses read from the same console as `,` so a session only ever has one input stream.
/// Once that input is exhausted the rest of the program runs without pausing.
pub struct Debugger<W: Write> {
    printer: DebugPrinter<W>,
    pause: bool,
}

impl<W: Write> Debugger<W> {
    pub fn new(out: W, pause: bool) -> Self {
        Self {
            printer: DebugPrinter::new(out),
            pause,
        }
    }

    pub fn into_inner(self) -> W {
        self.printer.into_inner()
    }

    /// Same contract as [`Machine::run`], with a listing of every step and a final summary
    pub fn run(
        &mut self,
        machine: &mut Machine,
        program: &Program,
        console: &mut dyn Console,
    ) -> Result<(), RuntimeError> {
        if !program.has_valid_header() {
            return Err(FormatError::InvalidHeader.into());
        }

        machine.rewind();
        let mut pausing = self.pause;
        let result = loop {
            if pausing && !matches!(machine.fetch(program), Ok(Opcode::Halt) | Err(_)) {
                match self.wait(machine, console) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("debug input exhausted, running to the end");
                        pausing = false;
                    }
                    Err(e) => break Err(e),
                }
            }

            match machine.step(program, console, Some(&mut self.printer as &mut dyn StepObserver)) {
                Ok(Step::Running) => continue,
                Ok(Step::Halted) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let flushed = console.flush();
        self.printer.summary(machine);
        result.and(flushed.map_err(RuntimeError::from))
    }

    /// Prompts and blocks for one line, `false` once there is nothing left to read
    fn wait(&mut self, machine: &Machine, console: &mut dyn Console) -> Result<bool, RuntimeError> {
        let prompt = format!("step {} (enter) ", machine.steps + 1);
        let out = self.printer.out_mut();
        write!(out, "{}", prompt.yellow().italic())?;
        out.flush()?;
        Ok(console.read_line()?.is_some())
    }
}
