use tracing::{debug, instrument};

use crate::{
    bytecode::{container::FormatError, Opcode, Program},
    config::MachineConfig,
};

use super::{
    console::Console,
    observer::{StepEvent, StepObserver},
    Machine, RuntimeError, Step,
};

/// Runs `program` to completion on a fresh machine
pub fn run(
    program: &Program,
    console: &mut dyn Console,
    config: &MachineConfig,
) -> Result<Machine, RuntimeError> {
    let mut machine = Machine::new(config);
    machine.run(program, console, None)?;
    Ok(machine)
}

impl Machine {
    /// Runs `program` from its first instruction on this machine's tape until it halts
    #[instrument(skip_all, fields(bytes = program.len()))]
    pub fn run(
        &mut self,
        program: &Program,
        console: &mut dyn Console,
        mut observer: Option<&mut (dyn StepObserver + '_)>,
    ) -> Result<(), RuntimeError> {
        if !program.has_valid_header() {
            return Err(FormatError::InvalidHeader.into());
        }

        self.rewind();
        let start = self.steps;
        let result = loop {
            match self.step(program, console, observer.as_deref_mut()) {
                Ok(Step::Running) => continue,
                Ok(Step::Halted) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        // flushed on failure too, the run's own error takes precedence
        let flushed = console.flush();
        debug!(steps = self.steps - start, ok = result.is_ok(), "run finished");
        result.and(flushed.map_err(RuntimeError::from))
    }

    /// One fetch-execute cycle.
    ///
    /// Returns [`Step::Halted`] without moving once the instruction pointer sits on `Halt`.
    pub fn step(
        &mut self,
        program: &Program,
        console: &mut dyn Console,
        mut observer: Option<&mut (dyn StepObserver + '_)>,
    ) -> Result<Step, RuntimeError> {
        let ip = self.cursor.ip;
        let opcode = self.fetch(program)?;
        if opcode == Opcode::Halt {
            return Ok(Step::Halted);
        }

        self.steps += 1;
        if let Some(observer) = observer.as_deref_mut() {
            observer.on_step(&StepEvent {
                step: self.steps,
                opcode,
                pointer: self.cursor.pointer,
                ip,
                tape: self.tape.window(),
            });
        }

        let pointer = self.cursor.pointer;
        match opcode {
            Opcode::MoveRight => self.cursor.pointer = self.tape.advance(pointer),
            Opcode::MoveLeft => {
                if pointer == 0 {
                    return Err(RuntimeError::PointerUnderflow { ip });
                }
                self.cursor.pointer -= 1;
            }
            Opcode::Increment => {
                let cell = self.tape.cell_mut(pointer);
                *cell = cell.wrapping_add(1);
            }
            Opcode::Decrement => {
                let cell = self.tape.cell_mut(pointer);
                *cell = cell.wrapping_sub(1);
            }
            Opcode::Output => {
                let value = self.tape.get(pointer);
                let c = u32::try_from(value)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(RuntimeError::InvalidCodepoint { value })?;
                console.write_char(c)?;
            }
            Opcode::Input => {
                // an empty line or exhausted input leaves the cell alone
                if let Some(c) = console.read_line()?.and_then(|line| line.chars().next()) {
                    *self.tape.cell_mut(pointer) = i64::from(u32::from(c));
                }
            }
            Opcode::LoopStart => {
                if self.tape.get(pointer) == 0 {
                    self.cursor.ip = self.skip_loop(program, ip)?;
                } else {
                    self.loop_stack.push(ip);
                }
            }
            Opcode::LoopEnd => {
                if self.tape.get(pointer) != 0 {
                    // land on the `[` and fall into the body without pushing again
                    self.cursor.ip = *self.loop_stack.last().ok_or(RuntimeError::CorruptedBytecode {
                        ip,
                        reason: "loop end without a loop start",
                    })?;
                } else if self.loop_stack.pop().is_none() {
                    return Err(RuntimeError::CorruptedBytecode {
                        ip,
                        reason: "loop end without a loop start",
                    });
                }
            }
            Opcode::Halt => return Ok(Step::Halted),
        }

        if let Some(observer) = observer {
            observer.after_step(&StepEvent {
                step: self.steps,
                opcode,
                pointer: self.cursor.pointer,
                ip,
                tape: self.tape.window(),
            });
        }

        self.cursor.ip += 1;
        Ok(Step::Running)
    }

    /// The instruction under the instruction pointer, without executing it
    pub fn fetch(&self, program: &Program) -> Result<Opcode, RuntimeError> {
        if !program.has_valid_header() {
            return Err(FormatError::InvalidHeader.into());
        }

        let ip = self.cursor.ip;
        let byte = program.get(ip).ok_or(RuntimeError::CorruptedBytecode {
            ip,
            reason: "ran past the end of the program without halting",
        })?;
        Opcode::from_byte(byte).ok_or(RuntimeError::UnknownOpcode { byte, ip })
    }

    /// Scans forward from the `[` at `start` to its matching `]` using the loop stack.
    ///
    /// Linear in the skipped body every time, there is no jump table.
    fn skip_loop(&mut self, program: &Program, start: usize) -> Result<usize, RuntimeError> {
        let depth = self.loop_stack.len();
        self.loop_stack.push(start);

        let mut ip = start;
        while self.loop_stack.len() > depth {
            ip += 1;
            match program.get(ip).map(Opcode::from_byte) {
                Some(Some(Opcode::LoopStart)) => self.loop_stack.push(ip),
                Some(Some(Opcode::LoopEnd)) => {
                    self.loop_stack.pop();
                }
                Some(Some(Opcode::Halt)) | None => {
                    self.loop_stack.truncate(depth);
                    return Err(RuntimeError::CorruptedBytecode {
                        ip: start,
                        reason: "loop start without a loop end",
                    });
                }
                Some(_) => {}
            }
        }

        Ok(ip)
    }
}
