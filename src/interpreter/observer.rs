use std::io::Write;

use colored::Colorize;
use tracing::{trace, Level};

use crate::bytecode::Opcode;

use super::{Cell, Machine};

/// State visible to an observer around one instruction
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    /// 1-based count of executed instructions
    pub step: u64,
    pub opcode: Opcode,
    pub pointer: usize,
    pub ip: usize,
    /// Cells `0..=highest` touched so far
    pub tape: &'a [Cell],
}

/// Read-only per-instruction hook.
///
/// `on_step` runs once for every fetched instruction that is executed, `Halt` is fetched
/// but never executed so it is not reported. `after_step` sees the state an instruction
/// left behind; it is skipped when the instruction fails.
pub trait StepObserver {
    fn on_step(&mut self, event: &StepEvent<'_>);

    fn after_step(&mut self, _event: &StepEvent<'_>) {}
}

impl<F: FnMut(&StepEvent<'_>)> StepObserver for F {
    fn on_step(&mut self, event: &StepEvent<'_>) {
        (*self)(event)
    }
}

/// Emits every step as a `trace` event
#[derive(Debug, Default)]
pub struct TraceObserver;

impl TraceObserver {
    /// Only worth attaching when something listens at `TRACE`
    pub fn if_enabled() -> Option<Self> {
        tracing::enabled!(Level::TRACE).then_some(Self)
    }
}

impl StepObserver for TraceObserver {
    fn on_step(&mut self, event: &StepEvent<'_>) {
        trace!(
            step = event.step,
            opcode = %event.opcode.display_char(),
            ip = event.ip,
            pointer = event.pointer,
            cell = event.tape.get(event.pointer).copied().unwrap_or(0),
            "step"
        );
    }
}

/// Step-by-step listing for the debug command and the repl's debug mode
pub struct DebugPrinter<W: Write> {
    out: W,
}

impl<W: Write> DebugPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn out_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Final state once a program finished (or failed)
    pub fn summary(&mut self, machine: &Machine) {
        let pointer = machine.cursor.pointer;
        let lines = [
            format!("Total steps     = {}", machine.steps),
            format!("Index           = {}", pointer),
            format!("MaxKnownIndex   = {}", machine.tape.highest()),
            format!("Cell [{}]       = {}", pointer, machine.current_cell()),
            format!("{:?}", machine.tape.window()),
        ];
        // the listing is diagnostics only, a broken sink shouldn't stop the program
        let _ = writeln!(self.out, "{}", "Final state:".yellow().bold());
        for line in lines {
            let _ = writeln!(self.out, "    {}", line.cyan());
        }
    }
}

impl<W: Write> StepObserver for DebugPrinter<W> {
    fn on_step(&mut self, event: &StepEvent<'_>) {
        let cell = event.tape.get(event.pointer).copied().unwrap_or(0);
        let header = format!("Step {} [{}]", event.step, event.opcode.display_char());
        let state = format!(
            "ip = {}, index = {}, cell = {}, tape = {:?}",
            event.ip, event.pointer, cell, event.tape
        );
        let _ = writeln!(self.out, "{} {}", header.yellow().italic(), state.cyan());
    }

    fn after_step(&mut self, event: &StepEvent<'_>) {
        let cell = event.tape.get(event.pointer).copied().unwrap_or(0);
        let state = format!(
            "=> index = {}, cell = {}, tape = {:?}",
            event.pointer, cell, event.tape
        );
        let _ = writeln!(self.out, "    {}", state.cyan().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;

    #[test]
    fn printer_lists_each_step() {
        let mut printer = DebugPrinter::new(Vec::new());
        printer.on_step(&StepEvent {
            step: 3,
            opcode: Opcode::Increment,
            pointer: 1,
            ip: 18,
            tape: &[4, 5],
        });
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert!(text.contains("Step 3 [+]"));
        assert!(text.contains("ip = 18, index = 1, cell = 5, tape = [4, 5]"));
    }

    #[test]
    fn printer_shows_the_result_of_a_step() {
        let mut printer = DebugPrinter::new(Vec::new());
        printer.after_step(&StepEvent {
            step: 1,
            opcode: Opcode::MoveRight,
            pointer: 1,
            ip: 16,
            tape: &[0, 0],
        });
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert!(text.contains("=> index = 1, cell = 0, tape = [0, 0]"));
    }

    #[test]
    fn tracer_stays_off_without_a_listener() {
        assert!(TraceObserver::if_enabled().is_none());
    }

    #[test]
    fn summary_shows_final_state() {
        let mut machine = Machine::new(&MachineConfig::default());
        machine.tape.set(0, 65);
        machine.steps = 65;
        let mut printer = DebugPrinter::new(Vec::new());
        printer.summary(&machine);
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert!(text.contains("Total steps     = 65"));
        assert!(text.contains("Cell [0]       = 65"));
    }
}
