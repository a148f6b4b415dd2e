pub mod alu;
pub mod emulator;
pub mod emulator_state;
pub mod io;

pub use alu::AluOp;
pub use emulator::{Emulator, ExecRet, HaltReason, RunState};
pub use emulator_state::{EmulatorState, Fault, Flags};
pub use io::{PipePrinter, Printer, StdoutPrinter};
