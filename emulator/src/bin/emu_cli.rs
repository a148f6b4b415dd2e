
use emu_lib::{Emulator, HaltReason};
use common::program::parse_program;

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use log::LevelFilter;


/// LS-8 Emulator
#[derive(Parser)]
struct Args {
    /// Program to run: one binary byte per line, '#' starts a comment
    program: PathBuf,

    /// Stop after this many instructions.
    #[arg(long)]
    max_ins: Option<usize>,

    /// Log a trace line (pc, next three bytes, registers) before each instruction.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Ok = 0,
    Usage = 1,
    NotFound = 2,
    Read = 3,
    Malformed = 4,
    Fault = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> ExitCode {
        ExitCode::from(exit as u8)
    }
}


fn main() -> ExitCode {
    let opt = match Args::try_parse() {
        Ok(opt) => opt,
        Err(e) => {
            let _ = e.print();
            return usage_exit(&e).into();
        },
    };

    let mut logger = env_logger::Builder::from_default_env();
    if opt.trace {
        logger.filter_module("emu_lib", LevelFilter::Trace);
    }
    logger.init();

    run(&opt).into()
}

// Clap exits with 2 on a usage error, which belongs to "file not found" here.
fn usage_exit(e: &clap::Error) -> Exit {
    match e.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => Exit::Ok,
        _ => Exit::Usage,
    }
}

fn run(opt: &Args) -> Exit {
    let src = match std::fs::read_to_string(&opt.program) {
        Ok(src) => src,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{}: file not found", opt.program.display());
            return Exit::NotFound;
        },
        Err(e) => {
            eprintln!("{}: {e}", opt.program.display());
            return Exit::Read;
        },
    };

    let bin = match parse_program(&src) {
        Ok(bin) => bin,
        Err(e) => {
            eprintln!("{}: {e}", opt.program.display());
            return Exit::Malformed;
        },
    };

    let mut emu = Emulator::new();
    emu.set_ins_limit(opt.max_ins);
    if let Err(e) = emu.load_image(&bin, 0) {
        eprintln!("{}: {e}", opt.program.display());
        return Exit::Malformed;
    }

    match emu.run() {
        Ok(HaltReason::DivideByZero) => {
            eprintln!("Halted on division by zero");
            Exit::Ok
        },
        Ok(HaltReason::InsLimit) => {
            eprintln!("Stopped after {} instructions", emu.get_state().num_ins());
            Exit::Ok
        },
        Ok(_) => Exit::Ok,
        Err(fault) => {
            eprintln!("Fault at pc {:#04x}: {fault}", emu.get_state().pc());
            Exit::Fault
        },
    }
}
