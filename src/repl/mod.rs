//! Interactive session: every line is either a command or code run against one persistent machine.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use tracing::debug;

use crate::{
    bytecode::container::{read_program, FileKind},
    compiler::compile_checked,
    config::MachineConfig,
    interpreter::{
        console::{Console, StreamConsole},
        debugger::Debugger,
        Machine,
    },
    Error,
};

const HELP: &str = "\
Commands:
    exit, q        leave the repl
    tape           show the touched part of the tape
    cell           show the cell under the pointer
    index          show the pointer and the highest index reached
    info           show the machine state and the repl modes
    reset          zero the tape and forget the loaded file
    feedback       toggle printing the state after every line
    debug          toggle stepping through executed code, enter runs one instruction
    continuous     toggle keeping the tape between lines
    load <file>    run a .bf file in this session or a .bfc file on its own tape
    reload         load the last loaded file again
    clear          clear the screen
    help           show this message
Anything else is run as code.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Tape,
    Cell,
    Index,
    Info,
    Reset,
    Feedback,
    Debug,
    Continuous,
    Load(Option<&'a str>),
    Reload,
    Clear,
    Help,
    Code(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Command<'a> {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("exit") | Some("q") => Command::Exit,
            Some("tape") => Command::Tape,
            Some("cell") => Command::Cell,
            Some("index") => Command::Index,
            Some("info") => Command::Info,
            Some("reset") => Command::Reset,
            Some("feedback") => Command::Feedback,
            Some("debug") => Command::Debug,
            Some("continuous") => Command::Continuous,
            Some("load") => Command::Load(words.next()),
            Some("reload") => Command::Reload,
            Some("clear") => Command::Clear,
            Some("help") => Command::Help,
            _ => Command::Code(line),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub feedback: bool,
    pub debug: bool,
    pub continuous: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            feedback: false,
            debug: false,
            continuous: true,
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub struct Repl<R, W> {
    console: StreamConsole<R, W>,
    machine: Machine,
    config: MachineConfig,
    pub modes: Modes,
    loaded_file: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W, config: MachineConfig) -> Self {
        Self {
            console: StreamConsole::new(input, output),
            machine: Machine::new(&config),
            config,
            modes: Modes::default(),
            loaded_file: None,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn into_output(self) -> W {
        self.console.into_parts().1
    }

    fn say(&mut self, text: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.console.output_mut(), "{}", text)
    }

    /// Reads lines until `exit` or the end of input, errors are reported and the session goes on
    pub fn run(&mut self) -> io::Result<()> {
        self.say(
            format!("Brainf**k REPL {}, type `help` for commands", env!("CARGO_PKG_VERSION"))
                .cyan()
                .italic(),
        )?;

        loop {
            write!(self.console.output_mut(), "\n{} ", ">".green().bold())?;
            let Some(line) = self.console.read_line()? else {
                break;
            };

            match self.handle(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) => {
                    debug!(error = %e, "repl line failed");
                    self.say(format!("Error: {}", e).red().bold())?;
                }
            }
        }

        self.say("Bye!".cyan().italic())?;
        self.console.output_mut().flush()
    }

    pub fn handle(&mut self, line: &str) -> Result<Flow, Error> {
        match Command::parse(line) {
            Command::Exit => return Ok(Flow::Exit),
            Command::Tape => self.print_tape()?,
            Command::Cell => self.print_cell()?,
            Command::Index => self.print_index()?,
            Command::Info => {
                self.print_state()?;
                let modes = format!(
                    "Feedback        = {}\nContinuous      = {}\nDebug           = {}",
                    on_off(self.modes.feedback),
                    on_off(self.modes.continuous),
                    on_off(self.modes.debug),
                );
                self.say(modes.cyan().italic())?;
            }
            Command::Reset => {
                self.machine.reset();
                self.loaded_file = None;
                self.say("The tape has been reset.".yellow().italic())?;
            }
            Command::Feedback => {
                self.modes.feedback = !self.modes.feedback;
                let text = format!("Feedback mode {}.", on_off(self.modes.feedback));
                self.say(text.yellow().italic())?;
            }
            Command::Debug => {
                self.modes.debug = !self.modes.debug;
                let text = format!("Debug mode {}.", on_off(self.modes.debug));
                self.say(text.yellow().italic())?;
            }
            Command::Continuous => {
                self.modes.continuous = !self.modes.continuous;
                let text = format!("Continuous mode {}.", on_off(self.modes.continuous));
                self.say(text.yellow().italic())?;
            }
            Command::Load(Some(name)) => self.load(Path::new(name))?,
            Command::Load(None) => return Err(Error::Usage("Missing file name, usage: load <file>")),
            Command::Reload => match self.loaded_file.clone() {
                Some(path) => self.load(&path)?,
                None => return Err(Error::Usage("No file has been loaded yet")),
            },
            Command::Clear => write!(self.console.output_mut(), "\x1B[2J")?,
            Command::Help => self.say(HELP.italic())?,
            Command::Code(source) => self.execute(source)?,
        }

        Ok(Flow::Continue)
    }

    /// Runs `source` on the session machine
    pub fn execute(&mut self, source: &str) -> Result<(), Error> {
        let program = compile_checked(source)?;
        if self.modes.debug {
            // pauses wait for a line from the session input
            Debugger::new(io::stderr(), true).run(&mut self.machine, &program, &mut self.console)?;
        } else {
            self.machine.run(&program, &mut self.console, None)?;
        }

        if self.modes.feedback {
            self.say("")?;
            self.print_state()?;
        }
        if !self.modes.continuous {
            self.machine.reset();
        }
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), Error> {
        match FileKind::of(path) {
            FileKind::Source => {
                let source = fs::read_to_string(path)?;
                self.machine.reset();
                self.execute(&source)?;
            }
            FileKind::Bytecode => {
                let program = read_program(path)?;
                let mut machine = Machine::new(&self.config);
                machine.run(&program, &mut self.console, None)?;
            }
            FileKind::Unknown => return Err(Error::UnknownFileType(path.to_path_buf())),
        }

        // kept for `reload`
        self.loaded_file = Some(path.to_path_buf());
        Ok(())
    }

    fn print_tape(&mut self) -> io::Result<()> {
        let tape = format!("{:?}", self.machine.tape.window());
        self.say(tape.cyan().italic())
    }

    fn print_cell(&mut self) -> io::Result<()> {
        let cell = format!(
            "Cell [{}]        = {}",
            self.machine.cursor.pointer,
            self.machine.current_cell()
        );
        self.say(cell.cyan().italic())
    }

    fn print_index(&mut self) -> io::Result<()> {
        let index = format!(
            "Index           = {}\nMaxKnownIndex   = {}",
            self.machine.cursor.pointer,
            self.machine.tape.highest()
        );
        self.say(index.cyan().italic())
    }

    fn print_state(&mut self) -> io::Result<()> {
        self.print_index()?;
        self.print_cell()?;
        self.print_tape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        colored::control::set_override(false);
        let mut repl = Repl::new(input.as_bytes(), Vec::new(), MachineConfig::default());
        repl.run().unwrap();
        String::from_utf8(repl.into_output()).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("q"), Command::Exit);
        assert_eq!(Command::parse("  tape "), Command::Tape);
        assert_eq!(Command::parse("load a.bf"), Command::Load(Some("a.bf")));
        assert_eq!(Command::parse("load"), Command::Load(None));
        assert_eq!(Command::parse("+++ cell"), Command::Code("+++ cell"));
    }

    #[test]
    fn tape_survives_between_lines() {
        let output = session("+++\n>++\ncell\nindex\ntape\nq\n");
        assert!(output.contains("Cell [1]        = 2"));
        assert!(output.contains("Index           = 1"));
        assert!(output.contains("[3, 2]"));
        assert!(output.ends_with("Bye!\n"));
    }

    #[test]
    fn input_instruction_reads_the_next_line() {
        let output = session(",.\nA\nexit\n");
        assert!(output.contains("> A\n"));
    }

    #[test]
    fn debug_mode_pauses_on_session_input() {
        // the second `+` line is taken by the pause before the first instruction
        let output = session("debug\n+\n+\ncell\n");
        assert!(output.contains("Debug mode on."));
        assert!(output.contains("Cell [0]        = 1"));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let output = session("<\n[\n+\ncell\n");
        assert!(output.contains("Error: Attempt to go before the first cell"));
        assert!(output.contains("Error: Can't find other symbol (]) for ["));
        assert!(output.contains("Cell [0]        = 1"));
    }

    #[test]
    fn continuous_off_resets_after_each_line() {
        let mut repl = Repl::new(io::empty(), Vec::new(), MachineConfig::default());
        repl.handle("+++").unwrap();
        assert_eq!(repl.machine().current_cell(), 3);
        repl.handle("continuous").unwrap();
        repl.handle("+").unwrap();
        assert_eq!(repl.machine().current_cell(), 0);
        repl.handle("continuous").unwrap();
        assert!(repl.modes.continuous);
    }

    #[test]
    fn feedback_prints_state_after_code() {
        let output = session("feedback\n++\n");
        assert!(output.contains("Feedback mode on."));
        assert!(output.contains("Cell [0]        = 2"));
    }

    #[test]
    fn load_and_reload_source_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.bf");
        fs::write(&path, "+++ three").unwrap();

        let mut repl = Repl::new(io::empty(), Vec::new(), MachineConfig::default());
        assert!(matches!(repl.handle("reload"), Err(Error::Usage(_))));
        assert!(matches!(repl.handle("load"), Err(Error::Usage(_))));

        repl.handle("+++++").unwrap();
        repl.handle(&format!("load {}", path.display())).unwrap();
        // loading a source file starts from a clean tape
        assert_eq!(repl.machine().current_cell(), 3);
        repl.handle("reload").unwrap();
        assert_eq!(repl.machine().current_cell(), 3);

        repl.handle("reset").unwrap();
        assert_eq!(repl.machine().current_cell(), 0);
        assert!(matches!(repl.handle("reload"), Err(Error::Usage(_))));
    }

    #[test]
    fn bytecode_files_run_on_their_own_tape() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bang.bf");
        fs::write(&source, "+++++++++++++++++++++++++++++++++.").unwrap();
        let compiled = crate::driver::compile_file(&source).unwrap();

        let mut repl = Repl::new(io::empty(), Vec::new(), MachineConfig::default());
        repl.handle("+").unwrap();
        repl.handle(&format!("load {}", compiled.display())).unwrap();
        assert_eq!(repl.machine().current_cell(), 1);
        let output = String::from_utf8(repl.into_output()).unwrap();
        assert_eq!(output, "!");
    }

    #[test]
    fn unknown_load_targets_are_refused() {
        let mut repl = Repl::new(io::empty(), Vec::new(), MachineConfig::default());
        assert!(matches!(
            repl.handle("load notes.txt"),
            Err(Error::UnknownFileType(_))
        ));
    }
}
