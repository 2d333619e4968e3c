extern crate clap;

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use bfvm::{
    bytecode::container::{read_program, FileKind},
    compiler::decompile,
    config::{MachineConfig, DEFAULT_GROWTH, DEFAULT_TAPE_SIZE},
    driver::{compile_file, load_program},
    interpreter::{
        console::StreamConsole,
        debugger::Debugger,
        observer::{StepObserver, TraceObserver},
        Machine,
    },
    repl::Repl,
    Error,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Brainf**k bytecode compiler/virtual machine/repl
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Cells allocated when a machine starts
    #[arg(short, long, global = true, default_value_t = DEFAULT_TAPE_SIZE)]
    tape_size: usize,

    /// Cells added whenever the pointer reaches the end of the tape
    #[arg(short, long, global = true, default_value_t = DEFAULT_GROWTH)]
    growth: usize,

    /// Log what the compiler and the machine are doing (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run source (.bf) or bytecode (.bfc) files, one after the other
    Run {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compile source files into bytecode files next to them
    Compile {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the source recovered from a bytecode file
    Decompile { file: PathBuf },
    /// Run a file one instruction at a time, press enter to step
    Debug {
        file: PathBuf,
        /// List every instruction without waiting for enter
        #[arg(long)]
        no_pause: bool,
    },
    /// Start the interactive repl (the default)
    Repl,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,bfvm=debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(args: Args) -> Result<(), Error> {
    let config = MachineConfig::new(args.tape_size, args.growth);

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Run { files } => {
            let mut console = StreamConsole::stdio();
            for file in files {
                let now = Instant::now();
                let program = load_program(&file)?;
                let mut machine = Machine::new(&config);
                let mut tracer = TraceObserver::if_enabled();
                machine.run(
                    &program,
                    &mut console,
                    tracer.as_mut().map(|t| t as &mut dyn StepObserver),
                )?;
                debug!(file = %file.display(), steps = machine.steps, elapsed = ?now.elapsed(), "finished");
            }
        }
        Commands::Compile { files } => {
            for file in files {
                let output = compile_file(&file)?;
                println!(
                    "{} {} -> {}",
                    "Compiled".green(),
                    file.display(),
                    output.display()
                );
            }
        }
        Commands::Decompile { file } => {
            if FileKind::of(&file) != FileKind::Bytecode {
                return Err(Error::UnknownFileType(file));
            }
            println!("{}", decompile(&read_program(&file)?));
        }
        Commands::Debug { file, no_pause } => {
            let program = load_program(&file)?;
            println!("{} {}", "Debugging".blue(), file.display());

            let mut console = StreamConsole::stdio();
            let mut machine = Machine::new(&config);
            Debugger::new(io::stderr(), !no_pause).run(&mut machine, &program, &mut console)?;
        }
        Commands::Repl => {
            let mut repl = Repl::new(io::stdin().lock(), io::stdout(), config);
            repl.run()?;
        }
    }

    io::stdout().flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
